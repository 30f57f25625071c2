use std::io;

use thiserror::Error;

/// Failure of a streaming tokenization operation.
///
/// Only the transport can fail: malformed *source text* never errors, it
/// degrades to `Incorrect` / `StrWrongEsc` / `Unknown` symbols instead. The
/// `try_*` entry points surface these; the plain variants terminate.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read source: {0}")]
    Io(#[from] io::Error),

    /// The byte stream is not valid UTF-8. `offset` is the absolute byte
    /// position of the offending sequence.
    #[error("source is not valid utf-8 at byte {offset}")]
    Decode { offset: usize },
}
