#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Any document that deserializes must validate and render without panicking.
    if let Ok(mut document) = serde_json::from_slice::<ubldoc::core::Document>(data) {
        let _ = ubldoc::core::validate(&document);
        let _ = ubldoc::ubl::generate(&document);
        let _ = ubldoc::ubl::generate_checked(&document);
        if ubldoc::core::apply_tax_totals(&mut document).is_ok() {
            let _ = ubldoc::core::validate(&document);
        }
    }
});
