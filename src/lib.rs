//! Streaming lexer for the Luna source language.
//!
//! Turns UTF-8 source text into positioned [`Token`]s over the [`Symbol`]
//! alphabet. The scanner is stateful and re-entrant: a stack of
//! [`lexer::Entry`] modes tracks variable-length string delimiters and
//! arbitrarily nested backtick interpolation, so lexing can be suspended at
//! any token boundary and resumed later — the basis of the incremental and
//! streaming entry points.
//!
//! ```
//! use luna_lexer::{tokenize, Symbol};
//!
//! let tokens = tokenize("a = 1");
//! let names: Vec<_> = tokens.iter().map(|t| &t.element).collect();
//! assert!(matches!(names[1], Symbol::Var(v) if v == "a"));
//! ```

pub mod error;
pub mod lexer;
pub mod stream;
pub mod symbol;

// Re-exports for convenience
pub use error::ParseError;
pub use lexer::{
    tokenize, tokenize_continuation, tokenize_with, Continuations, Entry, EntryStack, Lexemes,
};
pub use stream::{
    tokenize_file, try_tokenize_file, try_tokenize_reader, ChunkSource, Pipeline, ReaderSource,
};
pub use symbol::{Base, Bound, EscSeq, Number, StrType, Symbol, Token};
