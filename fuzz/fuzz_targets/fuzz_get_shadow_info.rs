#![no_main]

use keyward::get_shadow_info;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // The returned locator, if any, must lie within the input
    if let Ok(info) = get_shadow_info(data) {
        assert!(info.len() <= data.len());
    }
});
