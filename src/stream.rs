//! Streaming tokenization: chunked sources, incremental UTF-8 decoding, and
//! the pull-driven pipeline that turns a byte stream into positioned tokens.
//!
//! The pipeline owns nothing but the in-flight chunk buffer and the
//! entry-stack; it suspends only at chunk boundaries, and a token is
//! committed only once it provably cannot extend into the next chunk.

use std::fs::File;
use std::io::Read;
use std::mem;
use std::path::Path;

use crate::error::ParseError;
use crate::lexer::{lex_one, split_leading_spacing, Entry, EntryStack};
use crate::symbol::{Symbol, Token};

// =============================================================================
// Chunk sources
// =============================================================================

/// A cooperative producer of decoded text chunks.
pub trait ChunkSource {
    /// Pull the next chunk. `Ok(None)` signals end of stream; a returned
    /// chunk must be non-empty for the pipeline to make progress.
    fn read_next_chunk(&mut self) -> Result<Option<String>, ParseError>;
}

/// Adapts any [`Read`] into a [`ChunkSource`], decoding UTF-8 incrementally.
///
/// A multibyte sequence split across two reads is carried over to the next
/// chunk instead of being reported as an error; truly invalid bytes (and an
/// incomplete sequence at end of stream) surface as [`ParseError::Decode`]
/// with their absolute byte offset.
pub struct ReaderSource<R> {
    reader: R,
    chunk_bytes: usize,
    /// Undecoded tail of the last read, at most one partial scalar.
    carry: Vec<u8>,
    /// Absolute byte offset of the next chunk's first byte.
    consumed: usize,
    done: bool,
}

impl<R: Read> ReaderSource<R> {
    pub const DEFAULT_CHUNK_BYTES: usize = 64 * 1024;

    pub fn new(reader: R) -> Self {
        Self::with_chunk_bytes(reader, Self::DEFAULT_CHUNK_BYTES)
    }

    /// A smaller chunk size is mainly useful in tests; anything below the
    /// longest UTF-8 sequence is rounded up so decoding always progresses.
    pub fn with_chunk_bytes(reader: R, chunk_bytes: usize) -> Self {
        Self {
            reader,
            chunk_bytes: chunk_bytes.max(4),
            carry: Vec::new(),
            consumed: 0,
            done: false,
        }
    }
}

impl<R: Read> ChunkSource for ReaderSource<R> {
    fn read_next_chunk(&mut self) -> Result<Option<String>, ParseError> {
        loop {
            if self.done && self.carry.is_empty() {
                return Ok(None);
            }

            let mut buf = mem::take(&mut self.carry);
            if !self.done {
                let start = buf.len();
                buf.resize(start + self.chunk_bytes, 0);
                let n = self.reader.read(&mut buf[start..])?;
                buf.truncate(start + n);
                if n == 0 {
                    self.done = true;
                }
            }
            if buf.is_empty() {
                return Ok(None);
            }

            let split = match std::str::from_utf8(&buf) {
                Ok(_) => buf.len(),
                // An incomplete trailing sequence is fine while more bytes
                // may arrive; at end of stream it is a decode failure.
                Err(e) if e.error_len().is_none() && !self.done => e.valid_up_to(),
                Err(e) => {
                    return Err(ParseError::Decode {
                        offset: self.consumed + e.valid_up_to(),
                    })
                }
            };
            if split == 0 {
                // Less than one whole scalar so far; keep reading.
                self.carry = buf;
                continue;
            }

            self.carry = buf.split_off(split);
            self.consumed += split;
            return match String::from_utf8(buf) {
                Ok(text) => Ok(Some(text)),
                // Not reachable: the prefix was validated above.
                Err(e) => Err(ParseError::Decode {
                    offset: self.consumed + e.utf8_error().valid_up_to(),
                }),
            };
        }
    }
}

// =============================================================================
// Pipeline
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// STX not yet emitted.
    Start,
    Body,
    /// ETX emitted.
    Finished,
}

/// Pull-driven streaming tokenizer over a [`ChunkSource`].
///
/// Emits the same framed stream as [`crate::tokenize`]: a [`Symbol::STX`]
/// carrying the leading spacing, the tokens, then a zero-width
/// [`Symbol::ETX`]. The entry-stack is observable at any point for
/// continuation-style resumption.
pub struct Pipeline<S> {
    source: S,
    buf: String,
    stack: EntryStack,
    state: State,
    exhausted: bool,
    /// Weighted character position of the next unconsumed input.
    position: usize,
}

impl<S: ChunkSource> Pipeline<S> {
    pub fn new(stack: EntryStack, source: S) -> Self {
        Self {
            source,
            buf: String::new(),
            stack,
            state: State::Start,
            exhausted: false,
            position: 0,
        }
    }

    /// The entry-stack as observed after the last emitted token.
    pub fn stack(&self) -> &EntryStack {
        &self.stack
    }

    /// Give up the pipeline, keeping the residual entry-stack.
    pub fn into_stack(self) -> EntryStack {
        self.stack
    }

    /// Weighted character position of the next unconsumed input; equals the
    /// sum of `span + offset` over everything emitted so far.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Terminate the stream on a transport failure: nothing after the error
    /// is emitted, not even the ETX sentinel.
    fn fail(&mut self, err: ParseError) -> Result<Token<Symbol>, ParseError> {
        self.state = State::Finished;
        Err(err)
    }

    /// Pull one chunk into the buffer; `false` once the source is exhausted.
    fn refill(&mut self) -> Result<bool, ParseError> {
        match self.source.read_next_chunk()? {
            Some(chunk) => {
                self.buf.push_str(&chunk);
                Ok(true)
            }
            None => {
                self.exhausted = true;
                Ok(false)
            }
        }
    }
}

impl<S: ChunkSource> Iterator for Pipeline<S> {
    type Item = Result<Token<Symbol>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                State::Start => {
                    self.state = State::Body;
                    // When resuming inside a string body, leading spaces are
                    // string text, not stream spacing.
                    if matches!(self.stack.last(), Some(Entry::Str(..))) {
                        return Some(Ok(Token::new(0, 0, Symbol::STX)));
                    }
                    // Leading spacing may span chunk boundaries; keep pulling
                    // while the whole buffer is still spacing.
                    while !self.exhausted
                        && self.buf.chars().all(|c| matches!(c, ' ' | '\t'))
                    {
                        match self.refill() {
                            Ok(true) => {}
                            Ok(false) => break,
                            Err(e) => return Some(self.fail(e)),
                        }
                    }
                    let (leading, drain) = {
                        let (width, rest) = split_leading_spacing(&self.buf);
                        (width, self.buf.len() - rest.len())
                    };
                    self.buf.drain(..drain);
                    self.position += leading;
                    return Some(Ok(Token::new(0, leading, Symbol::STX)));
                }

                State::Body => {
                    if self.buf.is_empty() {
                        if self.exhausted {
                            self.state = State::Finished;
                            return Some(Ok(Token::new(0, 0, Symbol::ETX)));
                        }
                        if let Err(e) = self.refill() {
                            return Some(self.fail(e));
                        }
                        continue;
                    }

                    // Lex against a trial stack; commit only below.
                    let mut trial = self.stack.clone();
                    let Some((token, consumed)) = lex_one(&self.buf, &mut trial) else {
                        // Not reachable: the buffer is non-empty.
                        continue;
                    };
                    if consumed == self.buf.len() && !self.exhausted {
                        // The token (or its trailing spacing) may continue in
                        // the next chunk; pull more and lex again.
                        if let Err(e) = self.refill() {
                            return Some(self.fail(e));
                        }
                        continue;
                    }
                    self.buf.drain(..consumed);
                    self.stack = trial;
                    self.position += token.span + token.offset;
                    return Some(Ok(token));
                }

                State::Finished => return None,
            }
        }
    }
}

// =============================================================================
// File and reader entry points
// =============================================================================

/// Stream-tokenize from any reader, resuming from `stack`.
pub fn try_tokenize_reader<R: Read>(
    stack: EntryStack,
    reader: R,
) -> Result<Vec<Token<Symbol>>, ParseError> {
    Pipeline::new(stack, ReaderSource::new(reader)).collect()
}

/// Stream-tokenize a UTF-8 file, resuming from `stack`.
pub fn try_tokenize_file(
    stack: EntryStack,
    path: impl AsRef<Path>,
) -> Result<Vec<Token<Symbol>>, ParseError> {
    let file = File::open(path)?;
    try_tokenize_reader(stack, file)
}

/// Like [`try_tokenize_file`], but terminates on transport failure.
///
/// # Panics
///
/// Panics on I/O or UTF-8 decode errors.
pub fn tokenize_file(stack: EntryStack, path: impl AsRef<Path>) -> Vec<Token<Symbol>> {
    match try_tokenize_file(stack, path) {
        Ok(tokens) => tokens,
        Err(err) => panic!("tokenize_file: {err}"),
    }
}
