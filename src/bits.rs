//! Packing of variable width codes into bytes, most significant bit first.
use std::io::{self, Read};

use crate::{Code, LzwError, MAX_CODESIZE, MIN_CODESIZE};

/// Collects codes and hands out whole bytes.
pub(crate) struct BitWriter {
    /// The current code length.
    code_size: u8,
    /// The buffer bits, aligned to the most significant end.
    buffer: u64,
    /// The number of valid buffer bits.
    bits_in_buffer: u8,
}

/// Pulls codes of a requested width out of a byte stream.
pub(crate) struct BitReader<R> {
    reader: R,
    /// Fixed size chunk refilled from `reader` once consumed.
    chunk: Box<[u8]>,
    read_mark: usize,
    write_mark: usize,
    /// The buffer bits, aligned to the most significant end.
    buffer: u64,
    /// The number of valid buffer bits.
    bits: u8,
    bytes_read: usize,
}

impl BitWriter {
    pub(crate) fn new() -> Self {
        BitWriter {
            code_size: MIN_CODESIZE,
            buffer: 0,
            bits_in_buffer: 0,
        }
    }

    /// Return the current code size in bits.
    pub(crate) fn code_size(&self) -> u8 {
        self.code_size
    }

    /// Increase the code size by one bit.
    pub(crate) fn bump_code_size(&mut self) -> Result<(), LzwError> {
        if self.code_size >= MAX_CODESIZE {
            return Err(LzwError::CodeSpaceExhausted(self.code_size));
        }
        self.code_size += 1;
        Ok(())
    }

    /// Insert a code with the current width and move all full bytes to `out`.
    pub(crate) fn write_code(&mut self, code: Code, out: &mut Vec<u8>) -> Result<(), LzwError> {
        if u64::from(code) >> self.code_size != 0 {
            return Err(LzwError::CodeTooWide {
                code,
                width: self.code_size,
            });
        }

        // At most 7 bits are left over from the last flush, so the code always fits.
        let shift = 64 - self.bits_in_buffer - self.code_size;
        self.buffer |= u64::from(code) << shift;
        self.bits_in_buffer += self.code_size;
        self.flush_out(out);
        Ok(())
    }

    /// Pad the buffer to a full byte and move it to `out`.
    pub(crate) fn finish(&mut self, out: &mut Vec<u8>) {
        let to_byte = self.bits_in_buffer.wrapping_neg() & 0x7;
        self.bits_in_buffer += to_byte;
        self.flush_out(out);
    }

    fn flush_out(&mut self, out: &mut Vec<u8>) {
        while self.bits_in_buffer >= 8 {
            out.push((self.buffer >> 56) as u8);
            self.buffer <<= 8;
            self.bits_in_buffer -= 8;
        }
    }
}

impl<R: Read> BitReader<R> {
    pub(crate) fn new(reader: R, buffer_size: usize) -> Self {
        BitReader {
            reader,
            chunk: vec![0; crate::buffer_size(buffer_size)].into_boxed_slice(),
            read_mark: 0,
            write_mark: 0,
            buffer: 0,
            bits: 0,
            bytes_read: 0,
        }
    }

    /// The number of bytes pulled from the underlying reader so far.
    pub(crate) fn bytes_read(&self) -> usize {
        self.bytes_read
    }

    /// Read the next code of `width` bits.
    ///
    /// Returns `None` once the input is exhausted and only padding remains. A remainder of a
    /// whole byte or more can not be padding and is reported as a truncated stream.
    pub(crate) fn read_code(&mut self, width: u8) -> Result<Option<Code>, LzwError> {
        debug_assert!(width <= MAX_CODESIZE);
        while self.bits < width {
            if self.read_mark == self.write_mark && !self.refill()? {
                break;
            }

            let byte = self.chunk[self.read_mark];
            self.read_mark += 1;
            self.buffer |= u64::from(byte) << (56 - self.bits);
            self.bits += 8;
        }

        if self.bits < width {
            if self.bits >= 8 {
                return Err(LzwError::Truncated { bits: self.bits });
            }
            return Ok(None);
        }

        let code = (self.buffer >> (64 - width)) as Code;
        self.buffer <<= width;
        self.bits -= width;
        Ok(Some(code))
    }

    /// Refill the chunk from the reader, returning whether any bytes were available.
    fn refill(&mut self) -> io::Result<bool> {
        let count = read_chunk(&mut self.reader, &mut self.chunk)?;
        self.read_mark = 0;
        self.write_mark = count;
        self.bytes_read += count;
        Ok(count != 0)
    }
}

/// Read once into `chunk`, retrying interrupted reads. Zero means end of input.
pub(crate) fn read_chunk(reader: &mut impl Read, chunk: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(chunk) {
            Ok(count) => return Ok(count),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}
