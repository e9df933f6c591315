#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Errors are fine -- panics are not.
        let _ = sales_dashboard::dashboard::SelectionEvent::from_json(s);
    }
});
