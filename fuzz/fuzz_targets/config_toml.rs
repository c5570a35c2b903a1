#![no_main]

use libfuzzer_sys::fuzz_target;
use logdroid_core::config::LogdroidConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data)
        && let Ok(config) = LogdroidConfig::parse(text)
    {
        let _ = config.validate();
    }
});
