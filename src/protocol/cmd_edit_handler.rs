use tracing::debug;

use crate::models::{ConnectionError, Request};
use crate::protocol::cmd_doc_handler::attached_document;
use crate::protocol::codec::decode;
use crate::protocol::Reply;
use crate::registry::Session;
use crate::state::AppState;

/// Handle `insert pos text`: queue an insert on the attached document and resolve it.
pub fn handle_insert(session: &Session, pos: usize, text: &str) -> Result<Reply, ConnectionError> {
    let text = decode(text)?;
    let doc = match attached_document(session) {
        Ok(doc) => doc,
        Err(e) => return Ok(Reply::text(e.to_string())),
    };

    let content = {
        let mut doc = doc.lock();
        let request = Request::insert(doc.id(), pos, text)?;
        debug!("Session {} submitting {}", session.display_name(), request);
        doc.edit(request)?
    };
    Ok(Reply::encoded(&content))
}

/// Handle `delete begin end`. A start beyond the text ends the connection.
pub fn handle_delete(session: &Session, begin: usize, end: usize) -> Result<Reply, ConnectionError> {
    let doc = match attached_document(session) {
        Ok(doc) => doc,
        Err(e) => return Ok(Reply::text(e.to_string())),
    };

    let content = {
        let mut doc = doc.lock();
        let request = Request::delete(doc.id(), begin, end);
        debug!("Session {} submitting {}", session.display_name(), request);
        doc.edit(request)?
    };
    Ok(Reply::encoded(&content))
}

/// Handle `replaceOne`/`replaceAll`. Applied directly to the text, outside the queue.
pub fn handle_replace(
    state: &AppState,
    session: &Session,
    from: &str,
    to: &str,
    all: bool,
) -> Result<Reply, ConnectionError> {
    let from = decode(from)?;
    let to = decode(to)?;
    let doc = match attached_document(session) {
        Ok(doc) => doc,
        Err(e) => return Ok(Reply::text(e.to_string())),
    };
    let pattern = match state.patterns.get_or_compile(&from) {
        Ok(pattern) => pattern,
        Err(e) => return Ok(Reply::text(e.to_string())),
    };

    let content = {
        let mut doc = doc.lock();
        let replaced = if all {
            doc.replace_all(&pattern, &to)?
        } else {
            usize::from(doc.replace_one(&pattern, &to)?)
        };
        debug!("Session {} replaced {} match(es) in {}", session.display_name(), replaced, doc.name());
        doc.text()
    };
    Ok(Reply::encoded(&content))
}
