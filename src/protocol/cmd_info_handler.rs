use crate::protocol::Reply;
use crate::state::AppState;

pub const HELP_TEXT: &str = "\
Welcome to Colabri RTCE. Please use one of the following commands:
new [name.txt] - create a document and switch to it, named by the server if no name is given
switch name.txt - switch to an existing document
rename name.txt - rename the current document
insert pos text - insert percent-encoded text at a position
delete begin end - delete the text between two positions
view - show the current document
list - list every document on the server
replaceOne from to - replace the first match of a pattern
replaceAll from to - replace every match of a pattern
style font weight size color - set the style of the current document
giveStyle - show the style of the current document
hello - show a greeting and the number of connected people
help - show this message
exit - close the connection";

pub fn handle_hello(state: &AppState) -> Reply {
    Reply::text(format!(
        "Welcome to Colabri RTCE. {} people are currently connected. Type help for help.",
        state.sessions.connected_count()
    ))
}

pub fn handle_help() -> Reply {
    Reply::text(HELP_TEXT)
}

/// Tells the client to hang up; the connection closes once this is written.
pub fn handle_exit() -> Reply {
    Reply::closing("exit")
}
