//! A module for all decoding needs.
use std::io::{Read, Write};

use tracing::debug;

use crate::bits::BitReader;
use crate::table::Table;
use crate::{
    AllResult, Code, CodeEvent, LzwError, DEFAULT_BUFFER_SIZE, MAX_CODESIZE, MIN_CODESIZE,
};

/// Decoded bytes are handed to the writer once this many have accumulated.
const WRITE_CHUNK: usize = 1 << 16;

/// Turns a stream of packed codes back into the original bytes.
///
/// The code table is rebuilt entry by entry with the same growth rule the encoder uses, so one
/// decoder handles exactly one stream. After [`decode`] or [`decode_all`] returned, successful or
/// not, every further call fails with [`LzwError::Finished`].
///
/// [`decode`]: #method.decode
/// [`decode_all`]: struct.IntoStream.html#method.decode_all
/// [`LzwError::Finished`]: ../enum.LzwError.html#variant.Finished
pub struct Decoder {
    /// The table of decoded codes.
    table: Table,
    /// The code decoded last, prefix of the next table entry.
    last: Option<Code>,
    /// The current code size.
    code_size: u8,
    /// Size of the chunks read from the input.
    buffer_size: usize,
    /// If a whole stream went through this decoder.
    has_ended: bool,
    events: Option<Vec<CodeEvent>>,
}

/// A decoding stream sink.
///
/// See [`Decoder::into_stream`] on how to create this type and more information.
///
/// [`Decoder::into_stream`]: struct.Decoder.html#method.into_stream
pub struct IntoStream<'d, W> {
    decoder: &'d mut Decoder,
    writer: W,
}

impl Decoder {
    pub fn new() -> Self {
        Decoder::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    /// Create a decoder reading its input in chunks of `size` bytes.
    pub fn with_buffer_size(size: usize) -> Self {
        Decoder {
            table: Table::with_alphabet(),
            last: None,
            code_size: MIN_CODESIZE,
            buffer_size: crate::buffer_size(size),
            has_ended: false,
            events: None,
        }
    }

    /// Keep a log of every code read from now on, see [`events`].
    ///
    /// [`events`]: #method.events
    pub fn record_codes(&mut self) {
        self.events.get_or_insert_with(Vec::new);
    }

    /// The codes read so far, if recording was enabled.
    pub fn events(&self) -> &[CodeEvent] {
        self.events.as_deref().unwrap_or(&[])
    }

    /// The width the next code will be read with.
    pub fn code_size(&self) -> u8 {
        self.code_size
    }

    /// The number of entries in the code table.
    pub fn table_len(&self) -> usize {
        self.table.len()
    }

    /// Decode a single code, appending its sequence to `out`.
    ///
    /// Codes continue the stream decoded so far; there is no way to start over.
    pub fn decode_code(&mut self, code: Code, out: &mut Vec<u8>) -> Result<(), LzwError> {
        if self.has_ended {
            return Err(LzwError::Finished);
        }

        let emitted = if self.table.lookup(code).is_some() {
            if let Some(last) = self.last {
                let first = self.table.first_byte(code)?;
                self.table.append_extension(last, first)?;
            }
            code
        } else {
            match self.last {
                // The code names the entry this very step creates.
                Some(last) if code as usize == self.table.len() => {
                    let first = self.table.first_byte(last)?;
                    self.table.append_extension(last, first)?
                }
                _ => return Err(self.table.invalid(code)),
            }
        };

        let sequence = self
            .table
            .lookup(emitted)
            .ok_or_else(|| self.table.invalid(emitted))?;
        out.extend_from_slice(sequence);
        self.last = Some(emitted);

        if let Some(events) = &mut self.events {
            events.push(CodeEvent {
                code,
                code_size: self.code_size,
                dictionary_len: self.table.len(),
            });
        }

        // The table lags one entry behind the encoder's dictionary at this point.
        if self.table.len() as u64 == (1u64 << self.code_size) - 1 {
            if self.code_size >= MAX_CODESIZE {
                return Err(LzwError::CodeSpaceExhausted(self.code_size));
            }
            self.code_size += 1;
            debug!(
                code_size = self.code_size,
                entries = self.table.len(),
                "decoder widened codes"
            );
        }

        Ok(())
    }

    /// Decode a complete stream held in memory.
    ///
    /// This consumes the decoder's one stream; see the type level docs.
    pub fn decode(&mut self, data: &[u8]) -> Result<Vec<u8>, LzwError> {
        let mut reader = BitReader::new(data, self.buffer_size);
        let mut out = Vec::with_capacity(data.len() * 2);
        let mut written = 0;
        self.decode_from(&mut reader, &mut out, &mut written)?;
        Ok(out)
    }

    /// Construct a decoder into a writer.
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            decoder: self,
            writer,
        }
    }

    fn decode_from<R: Read, W: Write>(
        &mut self,
        reader: &mut BitReader<R>,
        writer: &mut W,
        bytes_written: &mut usize,
    ) -> Result<(), LzwError> {
        if self.has_ended {
            return Err(LzwError::Finished);
        }
        let result = self.decode_stream(reader, writer, bytes_written);
        self.has_ended = true;
        result
    }

    fn decode_stream<R: Read, W: Write>(
        &mut self,
        reader: &mut BitReader<R>,
        writer: &mut W,
        bytes_written: &mut usize,
    ) -> Result<(), LzwError> {
        let mut out = Vec::new();
        while let Some(code) = reader.read_code(self.code_size)? {
            self.decode_code(code, &mut out)?;
            if out.len() >= WRITE_CHUNK {
                writer.write_all(&out)?;
                *bytes_written += out.len();
                out.clear();
            }
        }

        if reader.bytes_read() == 0 {
            return Err(LzwError::EmptyInput);
        }

        writer.write_all(&out)?;
        *bytes_written += out.len();
        writer.flush()?;
        Ok(())
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Decode all data from a reader.
    ///
    /// The stream ends when the reader is exhausted and fewer bits than one code remain.
    pub fn decode_all(self, read: impl Read) -> AllResult {
        let IntoStream {
            decoder,
            mut writer,
        } = self;

        let mut reader = BitReader::new(read, decoder.buffer_size);
        let mut bytes_written = 0;
        let status = decoder.decode_from(&mut reader, &mut writer, &mut bytes_written);

        AllResult {
            bytes_read: reader.bytes_read(),
            bytes_written,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Decoder;
    use crate::encode::Encoder;
    use crate::{ErrorKind, LzwError};
    use std::io::{self, Read};

    /// Hands out its data, then fails instead of reporting the end.
    struct BrokenPipe<'a> {
        data: &'a [u8],
    }

    impl Read for BrokenPipe<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.data.is_empty() {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
            }
            let len = buf.len().min(self.data.len());
            buf[..len].copy_from_slice(&self.data[..len]);
            self.data = &self.data[len..];
            Ok(len)
        }
    }

    fn decode_codes(codes: &[u32]) -> Result<Vec<u8>, LzwError> {
        let mut decoder = Decoder::new();
        let mut out = vec![];
        for &code in codes {
            decoder.decode_code(code, &mut out)?;
        }
        Ok(out)
    }

    #[test]
    fn classic_codes() {
        let codes = [
            84, 79, 66, 69, 79, 82, 78, 79, 84, 256, 258, 260, 265, 259, 261, 263,
        ];
        assert_eq!(decode_codes(&codes).unwrap(), b"TOBEORNOTTOBEORTOBEORNOT");
    }

    #[test]
    fn code_of_entry_being_created() {
        let data = b"xyxyxyxyxyx";
        let compressed = Encoder::new().encode(data).unwrap();

        let mut decoder = Decoder::new();
        decoder.record_codes();
        assert_eq!(decoder.decode(&compressed).unwrap(), data);

        // Only a code naming the entry created in its own step ends up as the newest entry.
        let events = decoder.events();
        assert!(events
            .iter()
            .skip(1)
            .any(|event| event.code as usize + 1 == event.dictionary_len));
    }

    #[test]
    fn run_of_one_byte() {
        // Every code after the first refers to the entry it creates.
        let codes = [b'a' as u32, 256, 257, 258];
        assert_eq!(decode_codes(&codes).unwrap(), vec![b'a'; 1 + 2 + 3 + 4]);
    }

    #[test]
    fn invalid_codes_rejected() {
        assert!(matches!(
            decode_codes(&[256]),
            Err(LzwError::InvalidCode {
                code: 256,
                table_len: 256
            })
        ));
        assert!(matches!(
            decode_codes(&[97, 300]),
            Err(LzwError::InvalidCode {
                code: 300,
                table_len: 256
            })
        ));
    }

    #[test]
    fn one_stream_per_decoder() {
        let first = Encoder::new().encode(b"first stream").unwrap();
        let second = Encoder::new().encode(b"second stream").unwrap();

        let mut decoder = Decoder::new();
        assert_eq!(decoder.decode(&first).unwrap(), b"first stream");
        assert!(matches!(decoder.decode(&second), Err(LzwError::Finished)));

        let mut out = vec![];
        assert!(matches!(
            decoder.decode_code(97, &mut out),
            Err(LzwError::Finished)
        ));
        let result = decoder.into_stream(&mut out).decode_all(&second[..]);
        assert!(matches!(result.status, Err(LzwError::Finished)));
        assert!(out.is_empty());

        // A failed stream uses up the decoder just the same.
        let mut decoder = Decoder::new();
        assert!(decoder.decode(&[]).is_err());
        assert!(matches!(decoder.decode(&second), Err(LzwError::Finished)));
        assert!(matches!(decoder.decode(&[]), Err(LzwError::Finished)));

        assert_eq!(Decoder::new().decode(&second).unwrap(), b"second stream");
    }

    #[test]
    fn stream_reports_reader_failure() {
        let compressed = Encoder::new().encode(&[7; 500]).unwrap();
        let mut written = vec![];
        let result = Decoder::new()
            .into_stream(&mut written)
            .decode_all(BrokenPipe { data: &compressed });
        let err = result.status.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(result.bytes_read, compressed.len());
    }

    #[test]
    fn empty_input_rejected() {
        assert!(matches!(Decoder::new().decode(&[]), Err(LzwError::EmptyInput)));

        let mut written = vec![];
        let result = Decoder::new().into_stream(&mut written).decode_all(&b""[..]);
        assert!(matches!(result.status, Err(LzwError::EmptyInput)));
        assert!(written.is_empty());
    }

    #[test]
    fn width_grows_one_entry_early() {
        let mut state = 7u32;
        let data: Vec<u8> = (0..3000)
            .map(|_| {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12345);
                (state >> 16) as u8
            })
            .collect();
        let compressed = Encoder::new().encode(&data).unwrap();

        let mut decoder = Decoder::new();
        decoder.record_codes();
        assert_eq!(decoder.decode(&compressed).unwrap(), data);

        let events = decoder.events();
        let fill = events.iter().position(|e| e.dictionary_len == 511).unwrap();
        assert_eq!(events[fill].code_size, 9);
        assert_eq!(events[fill + 1].code_size, 10);
        assert!(events[..fill].iter().all(|e| e.code_size == 9));
    }

    #[test]
    fn stream_matches_in_memory() {
        let data = b"a stream with a few repeats, a stream with a few repeats".to_vec();
        let compressed = Encoder::new().encode(&data).unwrap();

        let mut written = vec![];
        let result = Decoder::with_buffer_size(1)
            .into_stream(&mut written)
            .decode_all(&compressed[..]);
        assert!(result.status.is_ok());
        assert_eq!(result.bytes_read, compressed.len());
        assert_eq!(result.bytes_written, data.len());
        assert_eq!(written, data);
    }
}
