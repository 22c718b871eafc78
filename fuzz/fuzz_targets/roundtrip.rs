#![no_main]
use libfuzzer_sys::fuzz_target;
use trie_lzw::{decode::Decoder, encode::Encoder};

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let mut encoder = Encoder::with_buffer_size(13);
    let mut buffer = Vec::with_capacity(2 * data.len() + 4);
    let result = encoder.into_stream(&mut buffer).encode_all(data);
    assert!(result.status.is_ok(), "{:?}", result.status);

    let mut decoder = Decoder::new();
    let mut compare = vec![];
    let result = decoder.into_stream(&mut compare).decode_all(buffer.as_slice());
    assert!(result.status.is_ok(), "{:?}", result.status);
    assert_eq!(data, compare.as_slice());
});
