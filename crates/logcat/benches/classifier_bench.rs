//! logcat 분류기 벤치마크
//!
//! 라인 단위 분류와 전체 파싱(분류 + 상태 전이 + 싱크)의 처리량을 측정합니다.

use std::hint::black_box;
use std::io::Cursor;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use logdroid_core::parser::{Classifier, ParseContext, Parser};
use logdroid_core::text::{Line, LineReader};
use logdroid_logcat::{CorrelationContext, LogcatClassifier, LogcatEntry};

/// long 형식 한 줄
const LONG_LINE: &str = "06-01 12:00:00.000 1234-1250/com.example.app I/Tag: hello from the app\n";

/// short 형식 한 줄
const SHORT_LINE: &str = "06-01 12:00:00.000 W/PackageManager(  596): slow operation took 120ms\n";

/// 프로세스 시작 라인
const START_LINE: &str = "06-01 12:00:00.000 596-610/system_process I/ActivityManager: Start proc 5678:com.example.app/u0a123 for activity com.example.app/.MainActivity\n";

/// 스택 트레이스 연속 라인
const CONTINUATION_LINE: &str = "\tat com.example.app.MainActivity.onCreate(MainActivity.java:42)\n";

fn bench_read_next(c: &mut Criterion) {
    let classifier = LogcatClassifier::with_year(2024).unwrap();

    let mut group = c.benchmark_group("read_next");
    group.throughput(Throughput::Elements(1));

    for (name, text) in [
        ("long", LONG_LINE),
        ("short", SHORT_LINE),
        ("start_proc", START_LINE),
        ("continuation", CONTINUATION_LINE),
    ] {
        group.bench_with_input(BenchmarkId::new("format", name), &text, |b, &text| {
            let mut context = ParseContext::<LogcatEntry>::new();
            b.iter(|| {
                let line = Line::new("bench", 1, text);
                classifier.read_next(&mut context, black_box(line)).unwrap()
            })
        });
    }

    group.finish();
}

fn sample_log(lines: usize) -> String {
    let mut log = String::from("--------- beginning of main\n");
    log.push_str(START_LINE);
    for i in 0..lines {
        match i % 4 {
            0 => log.push_str(LONG_LINE),
            1 => log.push_str(SHORT_LINE),
            2 => log.push_str(CONTINUATION_LINE),
            _ => log.push_str("06-01 12:00:01.000 700-700/com.android.pm D/Pm: touching com.example.app data\n"),
        }
    }
    log
}

fn bench_parse_to_sinks(c: &mut Criterion) {
    let log = sample_log(1000);

    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Elements(1000));

    group.bench_function("collect_1000", |b| {
        let parser = Parser::new(LogcatClassifier::with_year(2024).unwrap());
        b.iter(|| {
            let source = LineReader::new("bench", Cursor::new(log.as_bytes()));
            let mut out: Vec<LogcatEntry> = Vec::new();
            parser.parse(source, &mut out).unwrap();
            black_box(out.len())
        })
    });

    group.bench_function("correlate_1000", |b| {
        let parser = Parser::new(LogcatClassifier::with_year(2024).unwrap());
        b.iter(|| {
            let source = LineReader::new("bench", Cursor::new(log.as_bytes()));
            let mut ctx =
                CorrelationContext::new(vec!["com.example.app".to_owned()], Vec::new()).unwrap();
            parser.parse(source, &mut ctx).unwrap();
            black_box(ctx.into_inner().len())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_read_next, bench_parse_to_sinks);
criterion_main!(benches);
