#![no_main]

use keyward::protect;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Should reject malformed keys with an error, never panic
    let _ = protect(data, b"fuzz");
});
