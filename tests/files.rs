use std::fs;

use trie_lzw::file::{self, Options};
use trie_lzw::{ErrorKind, LzwError};

#[test]
fn compress_then_decompress() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("page.html");
    let contents = b"<p>lzw lzw lzw</p>\n".repeat(500);
    fs::write(&original, &contents).unwrap();

    let summary = file::compress(&original).unwrap();
    assert_eq!(summary.output, dir.path().join("page.html.zipped"));
    assert_eq!(summary.bytes_read, contents.len());
    assert!(summary.bytes_written < contents.len());
    assert!(summary.ratio() > 1.0);

    fs::remove_file(&original).unwrap();
    let summary = file::decompress(dir.path().join("page.html.zipped")).unwrap();
    assert_eq!(summary.output, original);
    assert_eq!(fs::read(&original).unwrap(), contents);
}

#[test]
fn small_buffer_option() {
    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join("data.bin");
    let contents: Vec<u8> = (0..10_000u32).map(|i| (i * i % 251) as u8).collect();
    fs::write(&original, &contents).unwrap();

    let options = Options { buffer_size: 1 };
    let zipped = file::compress_with(&original, options).unwrap().output;
    fs::remove_file(&original).unwrap();
    file::decompress_with(&zipped, options).unwrap();
    assert_eq!(fs::read(&original).unwrap(), contents);
}

#[test]
fn empty_file_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let empty = dir.path().join("empty");
    fs::write(&empty, b"").unwrap();

    let err = file::compress(&empty).unwrap_err();
    assert!(matches!(err, LzwError::EmptyInput));
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert!(!dir.path().join("empty.zipped").exists());

    let zipped = dir.path().join("other.zipped");
    fs::write(&zipped, b"").unwrap();
    assert!(matches!(file::decompress(&zipped), Err(LzwError::EmptyInput)));
    assert!(!dir.path().join("other").exists());
}

#[test]
fn missing_input_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = file::compress(dir.path().join("absent")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn decompress_requires_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let plain = dir.path().join("plain.txt");
    fs::write(&plain, b"abc").unwrap();
    assert!(matches!(
        file::decompress(&plain),
        Err(LzwError::MissingSuffix(_))
    ));
}

#[test]
fn corrupt_stream_removes_output() {
    let dir = tempfile::tempdir().unwrap();
    let zipped = dir.path().join("bad.zipped");
    // The first code is 511, which no fresh table can resolve.
    fs::write(&zipped, [0xff, 0x80]).unwrap();

    let err = file::decompress(&zipped).unwrap_err();
    assert!(matches!(err, LzwError::InvalidCode { code: 511, .. }));
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(!dir.path().join("bad").exists());
}

#[cfg(unix)]
#[test]
fn non_utf8_file_name() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let original = dir.path().join(OsStr::from_bytes(b"r\xe9sum\xe9.txt"));
    let contents = b"latin-1 names are still names\n".repeat(40);
    fs::write(&original, &contents).unwrap();

    let zipped = file::compress(&original).unwrap().output;
    assert_eq!(
        zipped,
        dir.path().join(OsStr::from_bytes(b"r\xe9sum\xe9.txt.zipped"))
    );

    fs::remove_file(&original).unwrap();
    let summary = file::decompress(&zipped).unwrap();
    assert_eq!(summary.output, original);
    assert_eq!(fs::read(&original).unwrap(), contents);
}
