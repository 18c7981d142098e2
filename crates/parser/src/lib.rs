//! A compact line-oriented text format for [`register_check_core::Event`]
//! histories, for driving the checker from files.

pub mod parser;

pub use parser::{parse_history, ParseError};
