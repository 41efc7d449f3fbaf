#![no_main]

use eagle_protocol::ResponseParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let mut parser = ResponseParser::new();
        for line in s.lines() {
            if parser.feed_line(line).is_err() {
                return;
            }
        }
        if let Ok(result) = parser.finish() {
            // Every row must match the header width
            for row in result.rows() {
                assert_eq!(row.values().len(), result.columns().len());
            }
        }
    }
});
