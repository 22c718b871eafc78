//! # LZW file compression with a prefix-tree dictionary
//!
//! This crate provides an [`Encoder`] and a [`Decoder`] for the classic single-dictionary LZW
//! algorithm. Both sides start from the 256 single-byte sequences and learn one new sequence per
//! code, so the dictionary never has to be transmitted. Codes are packed most significant bit
//! first, starting at 9 bits and growing by one bit whenever the dictionary fills the current
//! code space. The stream has no header, no clear code and no end code; the last byte is padded
//! with zero bits.
//!
//! Exemplary use of the encoder and decoder:
//!
//! ```
//! use trie_lzw::{decode::Decoder, encode::Encoder};
//! let data = b"TOBEORNOTTOBEORTOBEORNOT";
//!
//! let compressed = Encoder::new().encode(&data[..]).unwrap();
//! let decompressed = Decoder::new().decode(&compressed).unwrap();
//! assert_eq!(&decompressed[..], &data[..]);
//! ```
//!
//! The [`file`] module wraps both directions for whole files, appending or stripping the
//! [`SUFFIX`].
//!
//! [`Encoder`]: encode/struct.Encoder.html
//! [`Decoder`]: decode/struct.Decoder.html
//! [`file`]: file/index.html
//! [`SUFFIX`]: file/constant.SUFFIX.html
#![forbid(unsafe_code)]

/// Number of single-byte sequences every dictionary is seeded with.
pub const ALPHABET_SIZE: usize = 256;
/// The code width every stream starts with.
pub const MIN_CODESIZE: u8 = 9;
/// Codes never grow wider than this.
pub const MAX_CODESIZE: u8 = 32;
/// Size of the chunks read from the underlying stream.
pub const DEFAULT_BUFFER_SIZE: usize = 13;

/// Alias for a LZW code point
pub type Code = u32;

mod bits;
mod error;

pub mod decode;
pub mod encode;
pub mod file;
pub mod table;
pub mod trie;

pub use crate::error::{ErrorKind, LzwError};

/// The result of coding a whole stream from a reader into a writer.
#[derive(Debug)]
pub struct AllResult {
    /// The total number of bytes consumed from the reader.
    pub bytes_read: usize,
    /// The total number of bytes written into the writer.
    pub bytes_written: usize,
    /// The status after returning from the coding loop.
    pub status: Result<(), LzwError>,
}

/// One code as seen by either side of the codec.
///
/// Recording these is opt-in, see [`Encoder::record_codes`] and [`Decoder::record_codes`].
///
/// [`Encoder::record_codes`]: encode/struct.Encoder.html#method.record_codes
/// [`Decoder::record_codes`]: decode/struct.Decoder.html#method.record_codes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodeEvent {
    /// The code that was written or read.
    pub code: Code,
    /// The width in bits the code was packed with.
    pub code_size: u8,
    /// The dictionary or table size right after the code was handled.
    pub dictionary_len: usize,
}

/// Whether a dictionary of `len` entries has filled the space of `code_size` bit codes.
pub(crate) fn fills_code_space(len: usize, code_size: u8) -> bool {
    len as u64 == 1u64 << code_size
}

/// Clamp a configured read-buffer size to something that makes progress.
pub(crate) fn buffer_size(requested: usize) -> usize {
    requested.max(1)
}
