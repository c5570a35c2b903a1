#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use logdroid_core::parser::Parser;
use logdroid_core::text::LineReader;
use logdroid_logcat::{LogcatClassifier, LogcatEntry};

fuzz_target!(|data: &[u8]| {
    let Ok(classifier) = LogcatClassifier::with_year(2024) else {
        return;
    };
    let parser = Parser::new(classifier);
    let mut entries: Vec<LogcatEntry> = Vec::new();

    // 알 수 없는 레벨은 Err, 그 외 입력은 패닉 없이 처리되어야 한다
    let _ = parser.parse(LineReader::new("fuzz", Cursor::new(data)), &mut entries);
});
