use tracing::{debug, info};

use crate::models::StoreError;
use crate::protocol::Reply;
use crate::registry::{Session, SharedDocument};
use crate::state::AppState;

/// Payload of `list` when nothing has been created yet.
pub const NO_DOCUMENTS: &str = "There are no existing files on the server.";

/// The document edit and view commands implicitly target.
pub fn attached_document(session: &Session) -> Result<SharedDocument, StoreError> {
    session.attached().cloned().ok_or(StoreError::NotAttached)
}

/// Handle `new [name.txt]`: create a document and attach the session to it.
pub fn handle_new(state: &AppState, session: &mut Session, name: Option<&str>) -> Reply {
    let doc = match state.documents.create(name) {
        Ok(doc) => doc,
        Err(e) => {
            debug!("Session {} could not create document: {}", session.display_name(), e);
            return Reply::text(e.to_string());
        }
    };
    state.sessions.attach(session, doc.clone());
    let name = doc.lock().name().to_string();
    info!("Session {} attached to new document {}", session.display_name(), name);
    Reply::text(name)
}

/// Handle `switch name.txt`: attach to an existing document and return its text.
pub fn handle_switch(state: &AppState, session: &mut Session, name: &str) -> Reply {
    let Some(doc) = state.documents.find(name) else {
        return Reply::text(StoreError::NotFound(name.to_string()).to_string());
    };
    state.sessions.attach(session, doc.clone());
    let snapshot = doc.lock().snapshot();
    info!("Session {} switched to document {}", session.display_name(), snapshot.name);
    Reply::encoded(&snapshot.text)
}

/// Handle `rename name.txt` on the attached document.
pub fn handle_rename(state: &AppState, session: &Session, name: &str) -> Reply {
    let result = attached_document(session).and_then(|doc| state.documents.rename(&doc, name));
    match result {
        Ok(()) => Reply::text(name),
        Err(e) => Reply::text(e.to_string()),
    }
}

pub fn handle_list(state: &AppState) -> Reply {
    let names = state.documents.names();
    if names.is_empty() {
        Reply::text(NO_DOCUMENTS)
    } else {
        Reply::text(names.join(" "))
    }
}

pub fn handle_view(session: &Session) -> Reply {
    match attached_document(session) {
        Ok(doc) => {
            let text = doc.lock().text();
            Reply::encoded(&text)
        }
        Err(e) => Reply::text(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn setup() -> (AppState, Session) {
        let state = AppState::new(&Config::default());
        let session = state.sessions.register("127.0.0.1:9000".parse().unwrap());
        (state, session)
    }

    #[test]
    fn new_creates_and_attaches() {
        let (state, mut session) = setup();
        assert_eq!(handle_new(&state, &mut session, None).payload, "untitled1.txt");
        assert_eq!(handle_new(&state, &mut session, Some("a.txt")).payload, "a.txt");

        let doc = attached_document(&session).unwrap();
        assert_eq!(doc.lock().name(), "a.txt");
        assert_eq!(doc.lock().attached_count(), 1);
        let first = state.documents.find("untitled1.txt").unwrap();
        assert_eq!(first.lock().attached_count(), 0);
    }

    #[test]
    fn new_with_taken_name_keeps_the_current_attachment() {
        let (state, mut session) = setup();
        handle_new(&state, &mut session, Some("a.txt"));
        handle_new(&state, &mut session, Some("b.txt"));
        let reply = handle_new(&state, &mut session, Some("a.txt"));
        assert_eq!(reply.payload, "File already exists.");
        assert_eq!(attached_document(&session).unwrap().lock().name(), "b.txt");
    }

    #[test]
    fn switch_returns_encoded_text_or_not_found() {
        let (state, mut session) = setup();
        let doc = state.documents.create(Some("shared.txt")).unwrap();
        doc.lock().insert(0, "hi there").unwrap();

        assert_eq!(handle_switch(&state, &mut session, "shared.txt").payload, "hi%20there");
        assert_eq!(
            handle_switch(&state, &mut session, "missing.txt").payload,
            "File does not exist, can't switch."
        );
        assert_eq!(attached_document(&session).unwrap().lock().name(), "shared.txt");
    }

    #[test]
    fn rename_keeps_names_unique() {
        let (state, mut session) = setup();
        assert_eq!(
            handle_rename(&state, &session, "x.txt").payload,
            "No document attached. Use new or switch first."
        );
        handle_new(&state, &mut session, Some("a.txt"));
        state.documents.create(Some("b.txt")).unwrap();

        assert_eq!(handle_rename(&state, &session, "b.txt").payload, "File already exists.");
        assert_eq!(handle_rename(&state, &session, "c.txt").payload, "c.txt");
        assert_eq!(state.documents.names(), vec!["c.txt".to_string(), "b.txt".to_string()]);
    }

    #[test]
    fn list_and_view() {
        let (state, mut session) = setup();
        assert_eq!(handle_list(&state).payload, NO_DOCUMENTS);
        assert_eq!(
            handle_view(&session).payload,
            "No document attached. Use new or switch first."
        );

        handle_new(&state, &mut session, Some("one.txt"));
        handle_new(&state, &mut session, None);
        assert_eq!(handle_list(&state).payload, "one.txt untitled1.txt");
        assert_eq!(handle_view(&session).payload, "");
    }
}
