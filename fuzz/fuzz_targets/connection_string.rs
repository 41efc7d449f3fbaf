#![no_main]

use eagle_client::Config;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Fuzz connection string parsing
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = Config::from_connection_string(s) {
            let _ = config.service_url();
        }
    }
});
