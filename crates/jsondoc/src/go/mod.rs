//! Go source front end
//!
//! [`lexer`] turns source text into tokens and [`parser`] extracts the
//! package-level declarations the renderer needs.

pub mod lexer;
pub mod parser;

pub use parser::{parse_file, ImportSpec, ParsedFile};

/// Whether a file name is a Go source file that belongs in the index
pub fn is_source_file(name: &str) -> bool {
    name.ends_with(".go") && !name.ends_with("_test.go")
}
