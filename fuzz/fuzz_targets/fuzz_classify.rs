#![no_main]

use keyward::KeyKind;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Classification is total: never panics, always one of the four kinds
    let _ = KeyKind::classify(data);
});
