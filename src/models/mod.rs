pub mod diagnostics;
pub mod document;
pub mod error;
pub mod health;
pub mod queue;
pub mod ready;
pub mod request;
pub mod style;

pub use diagnostics::*;
pub use document::*;
pub use error::*;
pub use health::*;
pub use queue::*;
pub use ready::*;
pub use request::*;
pub use style::*;
