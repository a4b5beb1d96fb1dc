#![no_main]

use keyward::canon_len;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Must never panic, and a nonzero result never exceeds the buffer
    let len = canon_len(data);
    assert!(len <= data.len());
});
