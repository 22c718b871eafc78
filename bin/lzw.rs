#![forbid(unsafe_code)]
use std::path::PathBuf;
use std::{env, ffi};

use tracing_subscriber::EnvFilter;
use trie_lzw::file::{self, Options};
use trie_lzw::{LzwError, DEFAULT_BUFFER_SIZE};

fn main() -> CodingResult {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    CodingResult::catch_panic(|| match Flags::from_args(env::args_os()) {
        Ok(flags) => run_coding(flags),
        Err(ParamError) => {
            explain();
            Ok(())
        }
    })
}

fn run_coding(flags: Flags) -> Result<(), LzwError> {
    let options = Options {
        buffer_size: flags.buffer_size,
    };

    match flags.operation {
        Operation::Compress(path) => {
            println!("Compressing file: {}", path.display());
            let summary = file::compress_with(&path, options)?;
            println!("Compression ratio: {:.3}", summary.ratio());
        }
        Operation::Decompress(path) => {
            println!("Decompressing file: {}", path.display());
            file::decompress_with(&path, options)?;
        }
    }

    Ok(())
}

struct Flags {
    operation: Operation,
    buffer_size: usize,
}

struct ParamError;

#[derive(Debug)]
enum Operation {
    Compress(PathBuf),
    Decompress(PathBuf),
}

fn explain() {
    println!(
        "Usage: lzw -c|-u <file>\n\
        Arguments:\n\
        -c <file>\t compress into <file>.zipped\n\
        -u <file>\t decompress a .zipped file\n\
        -b <bytes>\t read buffer size (default {})",
        DEFAULT_BUFFER_SIZE
    );
}

fn command() -> clap::Command<'static> {
    clap::Command::new("lzw")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compress and decompress files with LZW")
        .arg(
            clap::Arg::new("compress")
                .short('c')
                .takes_value(true)
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
        .arg(
            clap::Arg::new("uncompress")
                .short('u')
                .takes_value(true)
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
        .group(
            clap::ArgGroup::new("operation")
                .args(&["compress", "uncompress"])
                .multiple(false)
                .required(true),
        )
        .arg(
            clap::Arg::new("buffer_size")
                .short('b')
                .long("buffer-size")
                .takes_value(true)
                .value_parser(clap::value_parser!(usize)),
        )
}

impl Flags {
    fn from_args(args: impl Iterator<Item = ffi::OsString>) -> Result<Self, ParamError> {
        // Anything unexpected only earns the usage text, never an error status.
        let matches = command().try_get_matches_from(args).map_err(|_| ParamError)?;

        let operation = if let Some(path) = matches.get_one::<PathBuf>("compress") {
            Operation::Compress(path.clone())
        } else if let Some(path) = matches.get_one::<PathBuf>("uncompress") {
            Operation::Decompress(path.clone())
        } else {
            return Err(ParamError);
        };

        let buffer_size = matches
            .get_one::<usize>("buffer_size")
            .copied()
            .unwrap_or(DEFAULT_BUFFER_SIZE);

        Ok(Flags {
            operation,
            buffer_size,
        })
    }
}

enum CodingResult {
    Ok,
    Err(LzwError),
    Panic,
}

impl CodingResult {
    fn catch_panic(op: impl FnOnce() -> Result<(), LzwError> + std::panic::UnwindSafe) -> Self {
        std::panic::catch_unwind(|| match op() {
            Ok(()) => CodingResult::Ok,
            Err(err) => CodingResult::Err(err),
        })
        .unwrap_or(CodingResult::Panic)
    }
}

impl std::process::Termination for CodingResult {
    fn report(self) -> std::process::ExitCode {
        match self {
            CodingResult::Ok => std::process::ExitCode::SUCCESS,
            CodingResult::Err(err) => {
                eprintln!("{}", err);
                std::process::ExitCode::FAILURE
            }
            CodingResult::Panic => {
                eprintln!(
                    "The process failed irrecoverably! This should never happen and is a bug."
                );
                std::process::ExitCode::from(128)
            }
        }
    }
}
