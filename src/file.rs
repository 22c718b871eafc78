//! Whole-file compression, as used by the command line tool.
//!
//! [`compress`] writes `<input>.zipped` next to the input, [`decompress`] strips the suffix again.
//! An empty input fails before the output file is created. Any later failure removes the
//! partially written output, whose contents would be meaningless.
//!
//! [`compress`]: fn.compress.html
//! [`decompress`]: fn.decompress.html
use std::ffi::{OsStr, OsString};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::{AllResult, LzwError, DEFAULT_BUFFER_SIZE};

/// Appended to the name of every compressed file.
pub const SUFFIX: &str = ".zipped";

/// Tunables of the file-level operations.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// Size of the chunks read from the input file.
    pub buffer_size: usize,
}

/// What a finished file operation did.
#[derive(Clone, Debug)]
pub struct Summary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub bytes_read: usize,
    pub bytes_written: usize,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl Summary {
    /// Input size divided by output size.
    pub fn ratio(&self) -> f64 {
        if self.bytes_written == 0 {
            return 0.0;
        }
        self.bytes_read as f64 / self.bytes_written as f64
    }
}

/// The name a compressed copy of `path` gets.
pub fn compressed_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(SUFFIX);
    PathBuf::from(name)
}

/// The name `path` had before compression, if it carries the suffix.
///
/// Works on the raw file name, so names that are not valid UTF-8 are handled too. A bare
/// `.zipped` names no original and yields `None`.
pub fn decompressed_path(path: &Path) -> Option<PathBuf> {
    let extension = OsStr::new(SUFFIX.trim_start_matches('.'));
    if path.extension()? != extension || path.file_stem()?.is_empty() {
        return None;
    }
    Some(path.with_extension(""))
}

/// Compress `path` into `path` + [`SUFFIX`] with default options.
///
/// [`SUFFIX`]: constant.SUFFIX.html
pub fn compress(path: impl AsRef<Path>) -> Result<Summary, LzwError> {
    compress_with(path, Options::default())
}

pub fn compress_with(path: impl AsRef<Path>, options: Options) -> Result<Summary, LzwError> {
    let input = path.as_ref();
    let output = compressed_path(input);
    run(input, output, options, |read, write| {
        Encoder::with_buffer_size(options.buffer_size)
            .into_stream(write)
            .encode_all(read)
    })
}

/// Decompress `path`, which must end in [`SUFFIX`], into the path without it.
///
/// [`SUFFIX`]: constant.SUFFIX.html
pub fn decompress(path: impl AsRef<Path>) -> Result<Summary, LzwError> {
    decompress_with(path, Options::default())
}

pub fn decompress_with(path: impl AsRef<Path>, options: Options) -> Result<Summary, LzwError> {
    let input = path.as_ref();
    let output =
        decompressed_path(input).ok_or_else(|| LzwError::MissingSuffix(input.to_path_buf()))?;
    run(input, output, options, |read, write| {
        Decoder::with_buffer_size(options.buffer_size)
            .into_stream(write)
            .decode_all(read)
    })
}

fn run(
    input: &Path,
    output: PathBuf,
    options: Options,
    code: impl FnOnce(&mut BufReader<File>, &mut BufWriter<File>) -> AllResult,
) -> Result<Summary, LzwError> {
    let file = File::open(input)?;
    let mut read = BufReader::with_capacity(crate::buffer_size(options.buffer_size), file);
    if read.fill_buf()?.is_empty() {
        return Err(LzwError::EmptyInput);
    }

    let result = {
        let mut write = BufWriter::new(File::create(&output)?);
        code(&mut read, &mut write)
    };

    if let Err(err) = result.status {
        warn!(output = %output.display(), error = %err, "removing partial output");
        if let Err(cleanup) = fs::remove_file(&output) {
            warn!(output = %output.display(), error = %cleanup, "partial output left behind");
        }
        return Err(err);
    }

    let summary = Summary {
        input: input.to_path_buf(),
        output,
        bytes_read: result.bytes_read,
        bytes_written: result.bytes_written,
    };
    info!(
        input = %summary.input.display(),
        output = %summary.output.display(),
        bytes_read = summary.bytes_read,
        bytes_written = summary.bytes_written,
        "finished"
    );
    Ok(summary)
}
