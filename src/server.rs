use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::protocol::handle_connection;
use crate::state::AppState;

/// Accepts connections forever, one task per client.
///
/// Accept errors are logged and skipped; a failing client never stops the loop.
pub async fn serve(listener: TcpListener, state: Arc<AppState>, max_line_length: usize) {
    if let Ok(addr) = listener.local_addr() {
        info!("Editing server listening on {}", addr);
    }

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let state = state.clone();
                tokio::spawn(handle_connection(stream, peer, state, max_line_length));
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
