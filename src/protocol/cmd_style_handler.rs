use tracing::debug;

use crate::models::Style;
use crate::protocol::cmd_doc_handler::attached_document;
use crate::protocol::Reply;
use crate::registry::Session;

/// Handle `style font weight size color`. Returns the stored style.
pub fn handle_style(session: &Session, style: Style) -> Reply {
    match attached_document(session) {
        Ok(doc) => {
            let mut doc = doc.lock();
            doc.set_style(style);
            debug!("Session {} set style of {} to {}", session.display_name(), doc.name(), style);
            Reply::text(doc.style().to_string())
        }
        Err(e) => Reply::text(e.to_string()),
    }
}

pub fn handle_give_style(session: &Session) -> Reply {
    match attached_document(session) {
        Ok(doc) => Reply::text(doc.lock().style().to_string()),
        Err(e) => Reply::text(e.to_string()),
    }
}
