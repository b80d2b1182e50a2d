use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, error, info, warn};

use crate::models::ConnectionError;
use crate::protocol::cmd_doc_handler::{handle_list, handle_new, handle_rename, handle_switch, handle_view};
use crate::protocol::cmd_edit_handler::{handle_delete, handle_insert, handle_replace};
use crate::protocol::cmd_info_handler::{handle_exit, handle_hello, handle_help};
use crate::protocol::cmd_style_handler::{handle_give_style, handle_style};
use crate::protocol::codec::{self, write_reply, LineStream, INVALID_REQUEST};
use crate::protocol::{Command, Reply};
use crate::registry::Session;
use crate::state::AppState;
use crate::utils::scope_guard::ScopeGuard;

/// Serves one client until EOF, `exit`, or a connection-local fatal error.
///
/// The session is registered for the lifetime of this call and deregistered on
/// every way out, panics included. Edits already applied stay applied.
pub async fn handle_connection<T>(io: T, peer: SocketAddr, state: Arc<AppState>, max_line_length: usize)
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let mut session = state.sessions.register(peer);
    let _deregister = {
        let state = state.clone();
        let id = session.id();
        ScopeGuard::new(move || state.sessions.deregister(id))
    };

    let mut lines = codec::framed(io, max_line_length);
    match serve_session(&mut lines, &state, &mut session).await {
        Ok(()) => info!("Session {} ({}) closed the connection", session.display_name(), session.peer()),
        Err(e) => error!("Session {} ({}) terminated: {}", session.display_name(), session.peer(), e),
    }
}

async fn serve_session<T>(
    lines: &mut LineStream<T>,
    state: &AppState,
    session: &mut Session,
) -> Result<(), ConnectionError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    while let Some(line) = lines.next().await {
        let line = line?;
        let reply = match line.parse::<Command>() {
            Ok(command) => {
                debug!("Session {} issued {}", session.display_name(), command.verb());
                dispatch(state, session, command)?
            }
            Err(e) => {
                warn!("Session {} sent an invalid request: {}", session.display_name(), e);
                Reply::text(INVALID_REQUEST)
            }
        };

        write_reply(lines, &reply).await?;
        if reply.close {
            break;
        }
    }
    Ok(())
}

/// Runs one parsed command against the shared state. No I/O happens here.
pub fn dispatch(state: &AppState, session: &mut Session, command: Command) -> Result<Reply, ConnectionError> {
    let reply = match command {
        Command::New(name) => handle_new(state, session, name.as_deref()),
        Command::Switch(name) => handle_switch(state, session, &name),
        Command::Rename(name) => handle_rename(state, session, &name),
        Command::Insert { pos, text } => handle_insert(session, pos, &text)?,
        Command::Delete { begin, end } => handle_delete(session, begin, end)?,
        Command::View => handle_view(session),
        Command::List => handle_list(state),
        Command::ReplaceOne { from, to } => handle_replace(state, session, &from, &to, false)?,
        Command::ReplaceAll { from, to } => handle_replace(state, session, &from, &to, true)?,
        Command::Style(style) => handle_style(session, style),
        Command::GiveStyle => handle_give_style(session),
        Command::Hello => handle_hello(state),
        Command::Help => handle_help(),
        Command::Exit => handle_exit(),
    };
    Ok(reply)
}
