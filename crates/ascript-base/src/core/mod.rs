pub mod constants;
pub mod file_io;
pub mod span;
pub mod text_utils;

pub use span::{TextLocation, TextPosition, TextRange};
