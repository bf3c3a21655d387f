#![no_main]

use libfuzzer_sys::fuzz_target;
use sami2marc::{Dialect, ReaderConfig, SamiReader};

fuzz_target!(|data: &[u8]| {
    for dialect in Dialect::ALL {
        let config = ReaderConfig::default().with_dialect(dialect).with_tidy(true);
        for sami in SamiReader::new(data, config) {
            let Ok(sami) = sami else { return };
            let _ = sami2marc::marcxml::record_to_xml(sami.record(), sami2marc::XmlStyle::Plain);
        }
    }
});
