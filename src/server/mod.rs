//! Accept loop and the state shared by every connection.

pub mod listener;

use crate::config::Config;
use crate::root::DocRoot;

/// Read-only server state shared by all connections.
pub struct ServerState {
    pub config: Config,
    pub root: DocRoot,
}

impl ServerState {
    /// Fails when the document root is missing, not a directory, or unreadable.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let root = DocRoot::open(&config.static_files)?;
        tracing::debug!(document_root = %root.document_root().display(), "document root ready");
        Ok(Self { config, root })
    }
}
