//! IRC message parsing and line assembly.

mod builder;
mod parse;

pub use self::builder::{LineBuilder, MAX_LINE_LEN};
pub use self::parse::MessageRef;
