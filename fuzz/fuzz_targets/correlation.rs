#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use logdroid_core::parser::Parser;
use logdroid_core::text::LineReader;
use logdroid_logcat::{CorrelationContext, LogcatClassifier};

fuzz_target!(|data: &[u8]| {
    let Ok(classifier) = LogcatClassifier::with_year(2024) else {
        return;
    };
    let packages = vec!["com.example.app".to_owned(), "system_process".to_owned()];
    let Ok(mut ctx) = CorrelationContext::new(packages, Vec::new()) else {
        return;
    };

    if Parser::new(classifier)
        .parse(LineReader::new("fuzz", Cursor::new(data)), &mut ctx)
        .is_ok()
    {
        // 성공한 실행은 항상 완결된 문서를 남긴다
        let html = ctx.into_inner();
        assert!(html.ends_with(b"</html>\n"));
    }
});
