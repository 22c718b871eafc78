//! A module for all encoding needs.
use std::io::{Read, Write};

use tracing::debug;

use crate::bits::{read_chunk, BitWriter};
use crate::trie::{NodeId, Trie, ROOT};
use crate::{fills_code_space, AllResult, Code, CodeEvent, LzwError, DEFAULT_BUFFER_SIZE};

/// Turns a byte stream into a stream of packed codes.
///
/// One encoder handles exactly one stream. Feed it with [`encode_bytes`] and call [`finish`] once
/// all input has been seen, or let [`into_stream`] drive both. Once finished, every further call
/// fails with [`LzwError::Finished`]; start the next stream with a new encoder.
///
/// [`LzwError::Finished`]: ../enum.LzwError.html#variant.Finished
/// [`encode_bytes`]: #method.encode_bytes
/// [`finish`]: #method.finish
/// [`into_stream`]: #method.into_stream
pub struct Encoder {
    /// The current encoding symbol tree.
    tree: Trie,
    /// The node of the bytes read but not yet encoded.
    current: Option<NodeId>,
    /// The bit buffer for encoding.
    buffer: BitWriter,
    /// The number of input bytes seen.
    bytes_in: usize,
    /// If we have flushed the final code.
    has_ended: bool,
    /// Size of the chunks read by `into_stream`.
    buffer_size: usize,
    events: Option<Vec<CodeEvent>>,
}

/// A encoding stream sink.
///
/// See [`Encoder::into_stream`] on how to create this type and more information.
///
/// [`Encoder::into_stream`]: struct.Encoder.html#method.into_stream
pub struct IntoStream<'d, W> {
    encoder: &'d mut Encoder,
    writer: W,
}

impl Encoder {
    pub fn new() -> Self {
        Encoder::with_buffer_size(DEFAULT_BUFFER_SIZE)
    }

    /// Create an encoder reading its input in chunks of `size` bytes.
    pub fn with_buffer_size(size: usize) -> Self {
        Encoder {
            tree: Trie::with_alphabet(),
            current: None,
            buffer: BitWriter::new(),
            bytes_in: 0,
            has_ended: false,
            buffer_size: crate::buffer_size(size),
            events: None,
        }
    }

    /// Keep a log of every code written from now on, see [`events`].
    ///
    /// [`events`]: #method.events
    pub fn record_codes(&mut self) {
        self.events.get_or_insert_with(Vec::new);
    }

    /// The codes written so far, if recording was enabled.
    pub fn events(&self) -> &[CodeEvent] {
        self.events.as_deref().unwrap_or(&[])
    }

    /// The width the next code will be written with.
    pub fn code_size(&self) -> u8 {
        self.buffer.code_size()
    }

    /// The number of sequences the dictionary knows.
    pub fn dictionary_len(&self) -> usize {
        self.tree.len()
    }

    /// Encode some bytes from `inp`, appending all completed output bytes to `out`.
    ///
    /// Fails with [`LzwError::Finished`] after [`finish`] succeeded.
    ///
    /// [`finish`]: #method.finish
    /// [`LzwError::Finished`]: ../enum.LzwError.html#variant.Finished
    pub fn encode_bytes(&mut self, inp: &[u8], out: &mut Vec<u8>) -> Result<(), LzwError> {
        if self.has_ended {
            return Err(LzwError::Finished);
        }
        for &byte in inp {
            self.bytes_in += 1;
            let current = match self.current {
                Some(node) => node,
                None => {
                    self.current = Some(self.single(byte)?);
                    continue;
                }
            };

            if let Some(next) = self.tree.step(current, byte) {
                self.current = Some(next);
                continue;
            }

            // The extended sequence is new: learn it, then emit its known prefix.
            self.tree.extend(current, byte)?;
            let code = self.tree.code(current).ok_or(LzwError::UnknownSequence)?;
            self.emit(code, out)?;

            // The code that filled the space was still written with the old width.
            if fills_code_space(self.tree.len(), self.buffer.code_size()) {
                self.buffer.bump_code_size()?;
                debug!(
                    code_size = self.buffer.code_size(),
                    entries = self.tree.len(),
                    "encoder widened codes"
                );
            }

            self.current = Some(self.single(byte)?);
        }

        Ok(())
    }

    /// Mark the encoding as finished.
    ///
    /// Writes the code of the pending sequence and the final, padded byte into `out`. Fails with
    /// [`LzwError::EmptyInput`] if no byte was ever encoded, in which case nothing is written.
    /// Calling this again after it succeeded fails with [`LzwError::Finished`].
    ///
    /// [`LzwError::EmptyInput`]: ../enum.LzwError.html#variant.EmptyInput
    /// [`LzwError::Finished`]: ../enum.LzwError.html#variant.Finished
    pub fn finish(&mut self, out: &mut Vec<u8>) -> Result<(), LzwError> {
        if self.has_ended {
            return Err(LzwError::Finished);
        }
        if self.bytes_in == 0 {
            return Err(LzwError::EmptyInput);
        }

        if let Some(node) = self.current.take() {
            let code = self.tree.code(node).ok_or(LzwError::UnknownSequence)?;
            self.emit(code, out)?;
        }

        self.buffer.finish(out);
        self.has_ended = true;
        Ok(())
    }

    /// Encode a complete input held in memory.
    pub fn encode(&mut self, data: &[u8]) -> Result<Vec<u8>, LzwError> {
        let mut out = Vec::with_capacity(data.len() / 2 + 2);
        self.encode_bytes(data, &mut out)?;
        self.finish(&mut out)?;
        Ok(out)
    }

    /// Construct a encoder into a writer.
    pub fn into_stream<W: Write>(&mut self, writer: W) -> IntoStream<'_, W> {
        IntoStream {
            encoder: self,
            writer,
        }
    }

    fn single(&self, byte: u8) -> Result<NodeId, LzwError> {
        self.tree.step(ROOT, byte).ok_or(LzwError::UnknownSequence)
    }

    fn emit(&mut self, code: Code, out: &mut Vec<u8>) -> Result<(), LzwError> {
        let code_size = self.buffer.code_size();
        self.buffer.write_code(code, out)?;
        if let Some(events) = &mut self.events {
            events.push(CodeEvent {
                code,
                code_size,
                dictionary_len: self.tree.len(),
            });
        }
        Ok(())
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder::new()
    }
}

impl<W: Write> IntoStream<'_, W> {
    /// Encode all data from a reader and finish the stream.
    ///
    /// The reader is drained in chunks of the configured buffer size. Output is written after
    /// every chunk.
    pub fn encode_all(self, mut read: impl Read) -> AllResult {
        let IntoStream { encoder, mut writer } = self;
        enum Progress {
            Ok,
            Done,
        }

        let mut bytes_read = 0;
        let mut bytes_written = 0;

        let read_bytes = &mut bytes_read;
        let write_bytes = &mut bytes_written;

        let mut inbuf = vec![0; encoder.buffer_size];
        let mut outbuf = Vec::new();
        let once = move || -> Result<Progress, LzwError> {
            let count = read_chunk(&mut read, &mut inbuf)?;
            *read_bytes += count;

            if count == 0 {
                encoder.finish(&mut outbuf)?;
            } else {
                encoder.encode_bytes(&inbuf[..count], &mut outbuf)?;
            }

            writer.write_all(&outbuf)?;
            *write_bytes += outbuf.len();
            outbuf.clear();

            if count == 0 {
                writer.flush()?;
                return Ok(Progress::Done);
            }

            Ok(Progress::Ok)
        };

        let status = core::iter::repeat_with(once)
            // scan+fuse can be replaced with map_while
            .scan((), |(), result| match result {
                Ok(Progress::Ok) => Some(Ok(())),
                Err(err) => Some(Err(err)),
                Ok(Progress::Done) => None,
            })
            .fuse()
            .collect();

        AllResult {
            bytes_read,
            bytes_written,
            status,
        }
    }
}
