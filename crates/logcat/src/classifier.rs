//! logcat 라인 분류기
//!
//! `adb logcat` 출력 라인 하나를 [`Classified`] 결과 하나로 분류합니다.
//!
//! # 우선순위
//!
//! 먼저 일치하는 규칙이 이깁니다.
//!
//! 1. 빈 줄 -> `Nothing`
//! 2. `*...*` 배너 -> `Nothing`
//! 3. `--------- beginning of <name>` -> 보유 엔트리 폐기 후 `Marker`
//! 4. short 형식 `MM-DD HH:MM:SS.mmm L/TAG(  PID): message`
//! 5. long 형식 `MM-DD HH:MM:SS.mmm PID-TID/PACKAGE L/TAG: message`
//! 6. 그 외 -> `Continuation` (에러가 아님)
//!
//! # 사용 예시
//! ```ignore
//! use logdroid_core::parser::Parser;
//! use logdroid_logcat::LogcatClassifier;
//!
//! let parser = Parser::new(LogcatClassifier::new()?);
//! let mut entries = Vec::new();
//! parser.parse(LineReader::stdin(), &mut entries)?;
//! ```

use chrono::{Datelike, Local, NaiveDateTime};
use regex::{Captures, Regex};
use tracing::{debug, warn};

use logdroid_core::error::{LogdroidError, ParseError};
use logdroid_core::parser::{Classified, Classifier, ParseContext};
use logdroid_core::text::Line;
use logdroid_core::types::{BlockMark, Level};

use crate::entry::{Entity, EntityKind, EntryKind, LogcatEntry};
use crate::error::LogcatError;

/// short 형식: `06-01 12:00:00.000 I/Tag(  1234): message`
const SHORT_FORMAT: &str = r"^(\d+-\d+ \d+:\d+:\d+\.\d+) (\S)/(.+?)\(\s*(\d+)\):(?: (.*))?$";

/// long 형식: `06-01 12:00:00.000 1234-1250/com.example.app I/Tag: message`
const LONG_FORMAT: &str = r"^(\d+-\d+ \d+:\d+:\d+\.\d+) +(\d+)-(\d+)/(\S+) (\S)/([^:]+):(?: (.*))?$";

const BLOCK_START: &str = r"^--------- beginning of (.+)$";

const START_PROC: &str = r"^Start proc (\d+):(.*)$";

/// `pkg/uid for activity pkg/.Class`
const START_ABBREVIATED: &str =
    r"^([^/\s]+)/\S+ for (?:[a-z]+-)*(activity|service|broadcast) \{?([^/\s]+)/\.([^/\s}]+)";

/// `pkg/uid for activity pkg/a.b.Class`
const START_QUALIFIED: &str =
    r"^([^/\s]+)/\S+ for (?:[a-z]+-)*(activity|service|broadcast) \{?([^/\s]+)/([^/\s}]+)";

/// `pkg/uid for ...`
const START_PACKAGE_ONLY: &str = r"^([^/\s]+)/\S+ for\b";

/// 타임스탬프 파싱 형식 (연도를 앞에 붙여서 사용)
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// 정규식 매칭으로 추출한 필드
struct Decoded {
    stamp: String,
    level: Level,
    tag: String,
    pid: u32,
    package_name: Option<String>,
    message: String,
}

/// logcat 분류기
///
/// 모든 정규식은 생성 시 한 번만 컴파일합니다.
pub struct LogcatClassifier {
    short_format: Regex,
    long_format: Regex,
    block_start: Regex,
    start_proc: Regex,
    start_abbreviated: Regex,
    start_qualified: Regex,
    start_package_only: Regex,
    /// 연도 없는 타임스탬프에 적용할 연도
    year: i32,
}

impl LogcatClassifier {
    /// 현재 로컬 연도를 가정하는 분류기를 생성합니다.
    pub fn new() -> Result<Self, LogcatError> {
        Self::with_year(Local::now().year())
    }

    /// 지정한 연도를 가정하는 분류기를 생성합니다.
    pub fn with_year(year: i32) -> Result<Self, LogcatError> {
        Ok(Self {
            short_format: Regex::new(SHORT_FORMAT)?,
            long_format: Regex::new(LONG_FORMAT)?,
            block_start: Regex::new(BLOCK_START)?,
            start_proc: Regex::new(START_PROC)?,
            start_abbreviated: Regex::new(START_ABBREVIATED)?,
            start_qualified: Regex::new(START_QUALIFIED)?,
            start_package_only: Regex::new(START_PACKAGE_ONLY)?,
            year,
        })
    }

    /// 설정의 연도가 있으면 사용하고, 없으면 현재 연도를 사용합니다.
    pub fn from_year(year: Option<i32>) -> Result<Self, LogcatError> {
        match year {
            Some(year) => Self::with_year(year),
            None => Self::new(),
        }
    }

    /// 가정하는 연도
    pub fn year(&self) -> i32 {
        self.year
    }

    /// short/long 형식을 순서대로 시도합니다.
    ///
    /// 형식이 맞지 않으면 `Ok(None)`, 레벨 코드를 알 수 없으면 에러입니다.
    fn decode(&self, text: &str, line_number: usize) -> Result<Option<Decoded>, LogdroidError> {
        if let Some(caps) = self.short_format.captures(text) {
            let Ok(pid) = caps[4].parse::<u32>() else {
                return Ok(None);
            };
            return Ok(Some(Decoded {
                stamp: caps[1].to_owned(),
                level: decode_level(&caps[2], line_number)?,
                tag: caps[3].to_owned(),
                pid,
                package_name: None,
                message: optional_group(&caps, 5),
            }));
        }

        if let Some(caps) = self.long_format.captures(text) {
            let Ok(pid) = caps[2].parse::<u32>() else {
                return Ok(None);
            };
            return Ok(Some(Decoded {
                stamp: caps[1].to_owned(),
                level: decode_level(&caps[5], line_number)?,
                tag: caps[6].to_owned(),
                pid,
                package_name: Some(caps[4].to_owned()),
                message: optional_group(&caps, 7),
            }));
        }

        Ok(None)
    }

    /// `MM-DD HH:MM:SS.mmm`에 연도를 붙여 파싱합니다.
    ///
    /// 달력에 없는 날짜(예: 평년의 02-29)는 경고 후 `None`을 반환합니다.
    fn timestamp(&self, stamp: &str, line_number: usize) -> Option<NaiveDateTime> {
        let full = format!("{}-{stamp}", self.year);
        match NaiveDateTime::parse_from_str(&full, TIMESTAMP_FORMAT) {
            Ok(ts) => Some(ts),
            Err(e) => {
                warn!(line = line_number, stamp, year = self.year, error = %e, "invalid timestamp");
                None
            }
        }
    }

    /// `Start proc <PID>:<detail>` 메시지에서 시작 대상 엔티티를 추출합니다.
    fn start_target(&self, message: &str) -> Option<Entity> {
        let caps = self.start_proc.captures(message)?;
        let pid = caps[1].parse::<u32>().ok()?;
        Some(self.target_entity(pid, &caps[2]))
    }

    /// 구체적인 패턴부터 순서대로 시도합니다. 모두 실패해도 PID만 가진 엔티티를 만듭니다.
    fn target_entity(&self, pid: u32, detail: &str) -> Entity {
        let component = self
            .start_abbreviated
            .captures(detail)
            .or_else(|| self.start_qualified.captures(detail));

        if let Some(caps) = component {
            return Entity {
                pid,
                package_name: Some(caps[1].to_owned()),
                name: Some(caps[4].to_owned()),
                kind: EntityKind::parse(&caps[2]),
            };
        }

        match self.start_package_only.captures(detail) {
            Some(caps) => Entity::with_package(pid, &caps[1]),
            None => Entity::from_pid(pid),
        }
    }

    fn build(&self, decoded: Decoded, line: Line, mark: Option<BlockMark>) -> LogcatEntry {
        let timestamp = self.timestamp(&decoded.stamp, line.number());
        let kind = match self.start_target(&decoded.message) {
            Some(target) => {
                debug!(line = line.number(), started = %target, "process start");
                EntryKind::EntityStart { target }
            }
            None => EntryKind::Plain,
        };

        LogcatEntry {
            timestamp,
            level: Some(decoded.level),
            tag: Some(decoded.tag),
            message: Some(decoded.message),
            line,
            entity: Some(Entity {
                pid: decoded.pid,
                package_name: decoded.package_name,
                name: None,
                kind: None,
            }),
            mark,
            kind,
        }
    }
}

impl Classifier for LogcatClassifier {
    type Entry = LogcatEntry;

    fn read_next(
        &self,
        context: &mut ParseContext<LogcatEntry>,
        line: Line,
    ) -> Result<Classified<LogcatEntry>, LogdroidError> {
        let text = line.trimmed();

        if text.is_empty() || is_banner(text) {
            return Ok(Classified::Nothing);
        }

        if let Some(caps) = self.block_start.captures(text) {
            let mark = BlockMark::new(&caps[1]);
            if context.discard() {
                debug!(line = line.number(), mark = %mark, "held entry dropped at block boundary");
            }
            context.set_mark(mark.clone());
            return Ok(Classified::Marker(mark));
        }

        match self.decode(text, line.number())? {
            Some(decoded) => {
                let mark = context.mark().cloned();
                Ok(Classified::Entry(self.build(decoded, line, mark)))
            }
            None => Ok(Classified::Continuation(line)),
        }
    }
}

/// `*...*`로 둘러싸인 배너 라인
fn is_banner(text: &str) -> bool {
    text.strip_prefix('*').is_some_and(|rest| rest.contains('*'))
}

fn decode_level(code: &str, line: usize) -> Result<Level, ParseError> {
    let mut chars = code.chars();
    match (chars.next().and_then(Level::from_code), chars.next()) {
        (Some(level), None) => Ok(level),
        _ => Err(ParseError::UnknownLevel {
            code: code.to_owned(),
            line,
        }),
    }
}

fn optional_group(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index).map_or_else(String::new, |m| m.as_str().to_owned())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chrono::{NaiveDate, Timelike};
    use logdroid_core::parser::Parser;
    use logdroid_core::text::LineReader;

    use super::*;

    fn classifier() -> LogcatClassifier {
        LogcatClassifier::with_year(2024).unwrap()
    }

    fn classify(text: &str) -> Classified<LogcatEntry> {
        let mut context = ParseContext::new();
        classifier()
            .read_next(&mut context, Line::new("test", 1, text))
            .unwrap()
    }

    fn expect_entry(text: &str) -> LogcatEntry {
        match classify(text) {
            Classified::Entry(entry) => entry,
            other => panic!("expected entry for {text:?}, got {other:?}"),
        }
    }

    #[test]
    fn long_format_line() {
        let entry = expect_entry("06-01 12:00:00.000 1234-1234/com.example.app I/Tag: hello\n");
        let entity = entry.entity.as_ref().unwrap();
        assert_eq!(entity.pid, 1234);
        assert_eq!(entity.package_name.as_deref(), Some("com.example.app"));
        assert_eq!(entry.level, Some(Level::Info));
        assert_eq!(entry.tag.as_deref(), Some("Tag"));
        assert_eq!(entry.message.as_deref(), Some("hello"));
        assert!(!entry.is_entity_start());
    }

    #[test]
    fn short_format_line() {
        let entry = expect_entry("06-01 12:00:01.250 W/PackageManager(  596): slow op\r\n");
        let entity = entry.entity.as_ref().unwrap();
        assert_eq!(entity.pid, 596);
        assert!(entity.package_name.is_none());
        assert_eq!(entry.level, Some(Level::Warning));
        assert_eq!(entry.tag.as_deref(), Some("PackageManager"));
        assert_eq!(entry.message.as_deref(), Some("slow op"));
    }

    #[test]
    fn short_format_tag_with_parentheses() {
        let entry = expect_entry("06-01 12:00:00.000 D/Foo(bar)( 77): x");
        assert_eq!(entry.tag.as_deref(), Some("Foo(bar)"));
        assert_eq!(entry.pid(), Some(77));
    }

    #[test]
    fn short_format_pid_comes_from_first_pid_group() {
        let entry = expect_entry("06-01 12:00:00.000 W/Sync(  5678): retry(3): failed");
        assert_eq!(entry.tag.as_deref(), Some("Sync"));
        assert_eq!(entry.pid(), Some(5678));
        assert_eq!(entry.message.as_deref(), Some("retry(3): failed"));
    }

    #[test]
    fn empty_message_is_allowed() {
        let entry = expect_entry("06-01 12:00:00.000 I/Tag(  1):");
        assert_eq!(entry.message.as_deref(), Some(""));
    }

    #[test]
    fn timestamp_uses_configured_year() {
        let entry = expect_entry("06-01 12:34:56.789 1-1/p I/T: m");
        let ts = entry.timestamp.unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(ts.hour(), 12);
        assert_eq!(ts.second(), 56);
        assert_eq!(ts.nanosecond(), 789_000_000);
    }

    #[test]
    fn invalid_calendar_date_keeps_entry_without_timestamp() {
        let classifier = LogcatClassifier::with_year(2023).unwrap();
        let mut context = ParseContext::new();
        let outcome = classifier
            .read_next(&mut context, Line::new("t", 1, "02-29 00:00:00.000 1-1/p I/T: leap"))
            .unwrap();
        match outcome {
            Classified::Entry(entry) => assert!(entry.timestamp.is_none()),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn every_level_code_decodes() {
        let cases = [
            ('V', Level::Verbose),
            ('D', Level::Debug),
            ('I', Level::Info),
            ('W', Level::Warning),
            ('E', Level::Error),
            ('F', Level::Fatal),
        ];
        for (code, level) in cases {
            let entry = expect_entry(&format!("06-01 12:00:00.000 1-1/p {code}/T: m"));
            assert_eq!(entry.level, Some(level));
        }
    }

    #[test]
    fn unknown_level_is_fatal() {
        let mut context = ParseContext::new();
        let err = classifier()
            .read_next(&mut context, Line::new("t", 9, "06-01 12:00:00.000 1-1/p X/T: m"))
            .unwrap_err();
        match err {
            LogdroidError::Parse(ParseError::UnknownLevel { code, line }) => {
                assert_eq!(code, "X");
                assert_eq!(line, 9);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn blank_and_banner_lines_are_nothing() {
        assert!(matches!(classify("\n"), Classified::Nothing));
        assert!(matches!(classify("\r\n"), Classified::Nothing));
        assert!(matches!(
            classify("*** daemon started successfully *\n"),
            Classified::Nothing
        ));
    }

    #[test]
    fn single_star_is_not_banner() {
        assert!(matches!(classify("* lone star\n"), Classified::Continuation(_)));
    }

    #[test]
    fn unrecognized_line_is_continuation() {
        match classify("\tat com.example.Foo.bar(Foo.java:42)\n") {
            Classified::Continuation(line) => {
                assert_eq!(line.text(), "\tat com.example.Foo.bar(Foo.java:42)\n");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn block_start_sets_mark_for_following_entries() {
        let classifier = classifier();
        let mut context = ParseContext::new();

        let outcome = classifier
            .read_next(&mut context, Line::new("t", 1, "--------- beginning of main\n"))
            .unwrap();
        match outcome {
            Classified::Marker(mark) => assert_eq!(mark.name(), "main"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(context.mark().map(BlockMark::name), Some("main"));

        let next = classifier
            .read_next(&mut context, Line::new("t", 2, "06-01 12:00:00.000 1-1/p I/T: after\n"))
            .unwrap();
        let Classified::Entry(after) = next else {
            panic!("expected entry");
        };
        assert_eq!(after.mark.as_ref().map(BlockMark::name), Some("main"));
    }

    #[test]
    fn block_start_discards_unflushed_entry() {
        let input = "06-01 12:00:00.000 1-1/p I/T: dropped\n\
                     \tat Foo.bar(Foo.java:1)\n\
                     --------- beginning of main\n\
                     06-01 12:00:01.000 1-1/p I/T: kept\n";
        let source = LineReader::new("t", Cursor::new(input.as_bytes().to_vec()));
        let mut out: Vec<LogcatEntry> = Vec::new();
        let stats = Parser::new(classifier()).parse(source, &mut out).unwrap();

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].message.as_deref(), Some("kept"));
        assert_eq!(stats.discarded, 1);
        assert_eq!(stats.marks, 1);
    }

    #[test]
    fn start_proc_with_abbreviated_component() {
        let entry = expect_entry(
            "06-01 12:00:00.000 596-610/system_process I/ActivityManager: \
             Start proc 5678:com.example.app/u0a123 for activity com.example.app/.MainActivity",
        );
        let target = entry.target_entity().unwrap();
        assert_eq!(target.pid, 5678);
        assert_eq!(target.package_name.as_deref(), Some("com.example.app"));
        assert_eq!(target.name.as_deref(), Some("MainActivity"));
        assert_eq!(target.kind, Some(EntityKind::Activity));
        assert_eq!(entry.pid(), Some(596), "reporter stays distinct from target");
    }

    #[test]
    fn start_proc_with_qualified_component() {
        let entry = expect_entry(
            "06-01 12:00:00.000 I/ActivityManager(  596): \
             Start proc 4321:com.example.sync/u0a77 for service com.example.sync/com.example.sync.SyncService",
        );
        let target = entry.target_entity().unwrap();
        assert_eq!(target.pid, 4321);
        assert_eq!(target.package_name.as_deref(), Some("com.example.sync"));
        assert_eq!(target.name.as_deref(), Some("com.example.sync.SyncService"));
        assert_eq!(target.kind, Some(EntityKind::Service));
    }

    #[test]
    fn start_proc_with_braced_component_and_prefixed_kind() {
        let entry = expect_entry(
            "06-01 12:00:00.000 596-610/system_process I/ActivityManager: \
             Start proc 900:com.example.app/u0a12 for pre-top-activity {com.example.app/com.example.app.MainActivity}",
        );
        let target = entry.target_entity().unwrap();
        assert_eq!(target.name.as_deref(), Some("com.example.app.MainActivity"));
        assert_eq!(target.kind, Some(EntityKind::Activity));
    }

    #[test]
    fn start_proc_with_package_only() {
        let entry = expect_entry(
            "06-01 12:00:00.000 596-610/system_process I/ActivityManager: \
             Start proc 1111:com.example.provider/u0a5 for content provider com.example.provider/.Data",
        );
        let target = entry.target_entity().unwrap();
        assert_eq!(target.pid, 1111);
        assert_eq!(target.package_name.as_deref(), Some("com.example.provider"));
        assert!(target.name.is_none());
        assert!(target.kind.is_none());
    }

    #[test]
    fn start_proc_with_unknown_detail() {
        let entry = expect_entry(
            "06-01 12:00:00.000 596-610/system_process I/ActivityManager: Start proc 2222:???",
        );
        assert_eq!(entry.target_entity(), Some(&Entity::from_pid(2222)));
    }

    #[test]
    fn year_from_config_or_current() {
        assert_eq!(LogcatClassifier::from_year(Some(2019)).unwrap().year(), 2019);
        assert_eq!(
            LogcatClassifier::from_year(None).unwrap().year(),
            Local::now().year()
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn read_next_arbitrary_text_does_not_panic(text in "\\PC{0,300}") {
                let mut context = ParseContext::new();
                let _ = classifier().read_next(&mut context, Line::new("p", 1, text));
            }

            #[test]
            fn unstructured_lines_are_continuations(text in "[a-zA-Z\t][^\r\n]{0,200}") {
                let mut context = ParseContext::new();
                let outcome = classifier()
                    .read_next(&mut context, Line::new("p", 1, format!("{text}\n")))
                    .unwrap();
                prop_assert!(matches!(outcome, Classified::Continuation(_)));
            }

            #[test]
            fn long_format_keeps_pid_and_message(pid in 0u32..100_000, msg in "[ -~]{0,120}") {
                let text = format!("06-01 12:00:00.000 {pid}-{pid}/com.example.app I/Tag: {msg}\n");
                let entry = expect_entry(&text);
                prop_assert_eq!(entry.pid(), Some(pid));
                prop_assert_eq!(entry.message.as_deref(), Some(msg.as_str()));
                prop_assert_eq!(entry.line.text(), text.as_str());
            }
        }
    }
}
