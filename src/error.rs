use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::Code;

/// Everything that can abort a compress or decompress pass.
///
/// Every error ends the current pass. There is no partial recovery; output written so far must be
/// treated as corrupt.
#[derive(Debug, Error)]
pub enum LzwError {
    /// The input stream contained no bytes at all.
    #[error("the input is empty")]
    EmptyInput,
    /// An empty byte sequence was handed to the dictionary.
    #[error("the byte sequence cannot be empty")]
    EmptySequence,
    /// A sequence was looked up that the dictionary does not know.
    #[error("the sequence is not present in the dictionary")]
    UnknownSequence,
    /// A code was packed with a width too small to represent it.
    #[error("code {code} does not fit in {width} bits")]
    CodeTooWide { code: Code, width: u8 },
    /// The stream referenced a code the decoder cannot reconstruct.
    #[error("code {code} is invalid for a table of {table_len} entries")]
    InvalidCode { code: Code, table_len: usize },
    /// The stream ended in the middle of a code.
    #[error("the stream ends inside a code, {bits} bits left over")]
    Truncated { bits: u8 },
    /// The dictionary outgrew the widest supported code.
    #[error("the dictionary outgrew {0} bit codes")]
    CodeSpaceExhausted(u8),
    /// The coder already completed its one stream.
    #[error("the stream is already finished")]
    Finished,
    /// A compressed file name lacks the expected suffix.
    #[error("{} does not end in {}", .0.display(), crate::file::SUFFIX)]
    MissingSuffix(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The broad class of an [`LzwError`].
///
/// [`LzwError`]: enum.LzwError.html
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller handed in something unusable, detected before any output.
    InvalidInput,
    /// The code stream or the dictionary state is inconsistent.
    Format,
    /// The underlying reader or writer failed.
    Io,
}

impl LzwError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LzwError::EmptyInput
            | LzwError::EmptySequence
            | LzwError::Finished
            | LzwError::MissingSuffix(_) => ErrorKind::InvalidInput,
            LzwError::UnknownSequence
            | LzwError::CodeTooWide { .. }
            | LzwError::InvalidCode { .. }
            | LzwError::Truncated { .. }
            | LzwError::CodeSpaceExhausted(_) => ErrorKind::Format,
            LzwError::Io(_) => ErrorKind::Io,
        }
    }
}
