pub mod cmd_doc_handler;
pub mod cmd_edit_handler;
pub mod cmd_info_handler;
pub mod cmd_style_handler;
pub mod codec;
pub mod command;
pub mod handler;

pub use codec::Reply;
pub use command::Command;
pub use handler::handle_connection;
