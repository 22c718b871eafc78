//! The decoder side dictionary, mapping codes back to byte sequences.
//!
//! All entries share one byte arena. An entry is only ever appended, never removed, and receives
//! the next sequential code, which mirrors the order in which the encoder assigns codes.
use std::convert::TryFrom;

use crate::{Code, LzwError, ALPHABET_SIZE, MAX_CODESIZE};

/// A growable table from code to byte sequence.
#[derive(Default)]
pub struct Table {
    bytes: Vec<u8>,
    /// Start and end of each entry in `bytes`, indexed by code.
    spans: Vec<(usize, usize)>,
}

impl Table {
    /// Create a table without any entries.
    pub fn new() -> Self {
        Table::default()
    }

    /// Create a table holding the 256 single-byte entries under codes `0..256`.
    pub fn with_alphabet() -> Self {
        let mut table = Table::new();
        table.seed();
        table
    }

    /// Install the single-byte entries, replacing anything present.
    pub fn seed(&mut self) {
        self.bytes.clear();
        self.spans.clear();
        for byte in 0..ALPHABET_SIZE {
            self.bytes.push(byte as u8);
            self.spans.push((byte, byte + 1));
        }
    }

    /// The number of entries, which is also the code the next entry receives.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Append a new entry and return its code.
    pub fn append(&mut self, sequence: &[u8]) -> Result<Code, LzwError> {
        let code = self.next_code()?;
        let start = self.bytes.len();
        self.bytes.extend_from_slice(sequence);
        self.spans.push((start, self.bytes.len()));
        Ok(code)
    }

    /// Append the entry of `prefix` followed by `byte`.
    ///
    /// Copies within the arena instead of going through an owned sequence.
    pub(crate) fn append_extension(&mut self, prefix: Code, byte: u8) -> Result<Code, LzwError> {
        let (from, to) = self.span(prefix)?;
        let code = self.next_code()?;
        let start = self.bytes.len();
        self.bytes.extend_from_within(from..to);
        self.bytes.push(byte);
        self.spans.push((start, self.bytes.len()));
        Ok(code)
    }

    /// The sequence of a code, if the table has an entry for it.
    pub fn lookup(&self, code: Code) -> Option<&[u8]> {
        let &(start, end) = self.spans.get(usize::try_from(code).ok()?)?;
        Some(&self.bytes[start..end])
    }

    pub(crate) fn first_byte(&self, code: Code) -> Result<u8, LzwError> {
        self.lookup(code)
            .and_then(|sequence| sequence.first().copied())
            .ok_or_else(|| self.invalid(code))
    }

    pub(crate) fn invalid(&self, code: Code) -> LzwError {
        LzwError::InvalidCode {
            code,
            table_len: self.len(),
        }
    }

    fn span(&self, code: Code) -> Result<(usize, usize), LzwError> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.spans.get(idx).copied())
            .ok_or_else(|| self.invalid(code))
    }

    fn next_code(&self) -> Result<Code, LzwError> {
        Code::try_from(self.len()).map_err(|_| LzwError::CodeSpaceExhausted(MAX_CODESIZE))
    }
}
