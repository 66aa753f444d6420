use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::http::connection::Connection;
use crate::server::ServerState;

pub async fn bind(addr: &str) -> anyhow::Result<TcpListener> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Listening on {}", listener.local_addr()?);
    Ok(listener)
}

pub async fn serve(listener: TcpListener, state: Arc<ServerState>) -> anyhow::Result<()> {
    info!(
        root = %state.root.document_root().display(),
        "Serving static files"
    );

    loop {
        let (socket, peer) = listener.accept().await?;
        tracing::debug!("Accepted connection from {}", peer);

        if let Err(e) = socket.set_nodelay(true) {
            tracing::warn!(peer = %peer, error = %e, "failed to set TCP_NODELAY");
        }

        let state = Arc::clone(&state);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, peer, state);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {}", peer, e);
            }
        });
    }
}

pub async fn run(state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = bind(&state.config.server.listen_addr).await?;
    serve(listener, state).await
}
