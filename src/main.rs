use std::sync::Arc;

use outflow::config::Config;
use outflow::server::{self, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.log_level()?)
        .init();

    let state = Arc::new(ServerState::new(cfg)?);

    tokio::select! {
        res = server::listener::run(state) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
