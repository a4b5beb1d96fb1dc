#![no_main]

use keyward::unprotect;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Should reject malformed or unauthenticated input, never panic
    let _ = unprotect(data, b"fuzz");
});
