#![no_main]

use arbitrary::Arbitrary;
use bytes::BytesMut;
use eagle_codec::LineCodec;
use libfuzzer_sys::fuzz_target;
use tokio_util::codec::Decoder;

/// Body bytes delivered in arbitrary chunks.
#[derive(Debug, Arbitrary)]
struct FuzzInput {
    max_line_length: u16,
    chunks: Vec<Vec<u8>>,
}

fuzz_target!(|input: FuzzInput| {
    let max = usize::from(input.max_line_length).max(1);
    let mut codec = LineCodec::new().with_max_line_length(max);
    let mut buf = BytesMut::new();

    for chunk in input.chunks {
        buf.extend_from_slice(&chunk);
        loop {
            match codec.decode(&mut buf) {
                // Each raw byte decodes to at most one replacement character
                Ok(Some(line)) => assert!(line.len() <= max * 3),
                Ok(None) => break,
                Err(_) => return,
            }
        }
    }

    while let Ok(Some(_)) = codec.decode_eof(&mut buf) {
        // Drain the final line
    }
});
