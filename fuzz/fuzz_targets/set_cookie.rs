#![no_main]

use eagle_client::CookieStore;
use libfuzzer_sys::fuzz_target;
use url::Url;

fuzz_target!(|data: &[u8]| {
    // Fuzz Set-Cookie handling against a fixed origin
    if let Ok(s) = std::str::from_utf8(data) {
        let Ok(url) = Url::parse("http://galaxy-catalogue.dur.ac.uk:8080/Eagle") else {
            return;
        };
        let store = CookieStore::in_memory();
        store.update(&url, s.split('\n'));
        let _ = store.apply(&url);
    }
});
