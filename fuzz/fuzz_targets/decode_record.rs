#![no_main]

use libfuzzer_sys::fuzz_target;
use sami2marc::iso2709;

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must encode again and decode to the same fields.
    if let Ok(record) = iso2709::decode(data) {
        if let Ok(bytes) = iso2709::encode(&record) {
            let again = iso2709::decode(&bytes).expect("re-encoded record decodes");
            assert_eq!(again.fields().len(), record.fields().len());
        }
    }
});
