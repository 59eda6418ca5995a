pub mod calendar;
pub mod compose;
pub mod error;
pub mod io;
pub mod layout;
pub mod lint;
pub mod logging;
pub mod model;
pub mod partition;

pub use error::{Result, ToolError};
