//! 엔티티 상관 분석 -- 흩어진 로그 라인을 프로세스별 타임라인으로 묶기
//!
//! [`CorrelationContext`]는 파서가 push한 엔트리를 받아 추적 중인 패키지의
//! 현재 프로세스(엔티티)에 귀속시키고, PID가 바뀔 때마다 누적된 출력을
//! 한 행으로 flush합니다. commit 시 HTML 타임라인을 출력합니다.
//!
//! # 처리 규칙
//!
//! - 프로세스 시작 엔트리: 추적 패키지면 상관 테이블을 갱신하고,
//!   시작 전에 모아 둔 메시지를 재생한 뒤 시작 엔트리를 누적합니다.
//! - 일반 엔트리: PID 또는 패키지 이름이 같은 살아있는 엔티티를 찾아 누적하고,
//!   없으면 메시지에 추적 패키지 이름이 나오는지 검사해 시작 전 버퍼에 보관합니다.
//! - 어디에도 귀속되지 않는 엔트리는 출력에서 조용히 빠집니다.

use std::collections::HashMap;
use std::io::Write;

use regex::Regex;
use tracing::{debug, info};

use logdroid_core::config::SYSTEM_PROCESS;
use logdroid_core::error::LogdroidError;
use logdroid_core::pipeline::EntrySink;

use crate::entry::{Entity, EntryKind, LogcatEntry};
use crate::error::LogcatError;
use crate::html::{HeaderColumn, HtmlTimeline, TimelineRow};

/// 패키지별 경계 정규식 테이블
///
/// 패키지마다 세 가지 패턴을 컨텍스트 생성 시 한 번만 컴파일합니다.
/// - 양쪽이 식별자 문자가 아닌 경계
/// - 메시지 시작에 고정
/// - 메시지 끝에 고정
#[derive(Debug)]
pub struct PackageMatchers {
    patterns: HashMap<String, [Regex; 3]>,
}

impl PackageMatchers {
    /// 패키지 목록으로 테이블을 만듭니다.
    pub fn new(packages: &[String]) -> Result<Self, LogcatError> {
        let mut patterns = HashMap::with_capacity(packages.len());
        for package in packages {
            let quoted = regex::escape(package);
            let compiled = [
                Regex::new(&format!("[^a-zA-Z_0-9]+{quoted}[^a-zA-Z_0-9]+"))?,
                Regex::new(&format!("^{quoted}[^a-zA-Z_0-9]+"))?,
                Regex::new(&format!("[^a-zA-Z_0-9]+{quoted}$"))?,
            ];
            patterns.insert(package.clone(), compiled);
        }
        Ok(Self { patterns })
    }

    /// 메시지가 패키지 이름을 언급하는지 확인합니다.
    pub fn mentions(&self, package: &str, message: &str) -> bool {
        self.patterns
            .get(package)
            .is_some_and(|set| set.iter().any(|re| re.is_match(message)))
    }
}

/// 엔티티 상관 분석 컨텍스트
///
/// [`EntrySink`]로 동작하며 commit 시 `out`에 HTML 문서를 씁니다.
pub struct CorrelationContext<W> {
    /// 추적 패키지 (열 순서)
    packages: Vec<String>,
    matchers: PackageMatchers,
    /// 패키지 이름 -> 가장 최근의 살아있는 엔티티
    entities: HashMap<String, Entity>,
    /// 패키지 이름 -> 시작 전에 도착한 엔트리 (도착 순서)
    pending: HashMap<String, Vec<LogcatEntry>>,
    system_process: Option<Entity>,
    system_process_name: String,
    last_pid: Option<u32>,
    temp: Vec<LogcatEntry>,
    next_block: u32,
    rows: Vec<TimelineRow>,
    renderer: HtmlTimeline,
    out: W,
}

impl<W: Write> CorrelationContext<W> {
    /// 추적 패키지 목록과 출력 대상으로 컨텍스트를 생성합니다.
    pub fn new(packages: Vec<String>, out: W) -> Result<Self, LogcatError> {
        let matchers = PackageMatchers::new(&packages)?;
        Ok(Self {
            packages,
            matchers,
            entities: HashMap::new(),
            pending: HashMap::new(),
            system_process: None,
            system_process_name: SYSTEM_PROCESS.to_owned(),
            last_pid: None,
            temp: Vec::new(),
            next_block: 1,
            rows: Vec::new(),
            renderer: HtmlTimeline::default(),
            out,
        })
    }

    /// 문서 제목을 설정합니다.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.renderer = HtmlTimeline::new(title);
        self
    }

    /// 보고 프로세스에 패키지 이름이 없을 때 쓰는 시스템 프로세스 이름을 설정합니다.
    pub fn with_system_process_name(mut self, name: impl Into<String>) -> Self {
        self.system_process_name = name.into();
        self
    }

    /// 추적 패키지 목록
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// 패키지의 살아있는 엔티티
    pub fn live_entity(&self, package: &str) -> Option<&Entity> {
        self.entities.get(package)
    }

    /// 패키지의 시작 전 버퍼에 쌓인 엔트리 수
    pub fn pending_len(&self, package: &str) -> usize {
        self.pending.get(package).map_or(0, Vec::len)
    }

    /// 마지막으로 출력이 귀속된 PID
    pub fn last_pid(&self) -> Option<u32> {
        self.last_pid
    }

    /// 첫 프로세스 시작 이벤트를 보고한 시스템 프로세스
    pub fn system_process(&self) -> Option<&Entity> {
        self.system_process.as_ref()
    }

    /// 지금까지 flush된 행
    pub fn rows(&self) -> &[TimelineRow] {
        &self.rows
    }

    /// 다음 flush에 쓰일 블록 번호
    pub fn next_block(&self) -> u32 {
        self.next_block
    }

    /// 출력 대상을 돌려받습니다.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// 헤더 열: 살아있는 엔티티의 PID, 시스템 프로세스 열이면 그 PID, 아니면 `None`
    pub fn header(&self) -> Vec<HeaderColumn> {
        self.packages
            .iter()
            .map(|package| {
                let pid = self.entities.get(package).map(|e| e.pid).or_else(|| {
                    self.system_process
                        .as_ref()
                        .filter(|sp| sp.package_name.as_deref() == Some(package.as_str()))
                        .map(|sp| sp.pid)
                });
                HeaderColumn {
                    package: package.clone(),
                    pid,
                }
            })
            .collect()
    }

    /// 엔트리 하나를 처리합니다.
    pub fn observe(&mut self, entry: &LogcatEntry) {
        match &entry.kind {
            EntryKind::EntityStart { target } => self.on_entity_start(entry, target),
            EntryKind::Plain => self.on_entry(entry),
        }
    }

    fn is_tracked(&self, package: &str) -> bool {
        self.packages.iter().any(|p| p == package)
    }

    fn on_entity_start(&mut self, entry: &LogcatEntry, target: &Entity) {
        if self.system_process.is_none() {
            // 보고 라인의 패키지와 무관하게 설정된 컬럼 이름으로 기록
            if let Some(reporter) = &entry.entity {
                debug!(
                    pid = reporter.pid,
                    reported = reporter.package_name.as_deref().unwrap_or("-"),
                    name = %self.system_process_name,
                    "system process recorded"
                );
                self.system_process = Some(Entity::with_package(
                    reporter.pid,
                    self.system_process_name.clone(),
                ));
            }
        }

        let Some(package) = target.package_name.as_deref() else {
            return;
        };
        if !self.is_tracked(package) {
            return;
        }

        if self.last_pid.is_some_and(|pid| pid != target.pid) {
            self.flush();
        }

        if let Some(previous) = self.entities.insert(package.to_owned(), target.clone()) {
            debug!(
                package,
                previous_pid = previous.pid,
                pid = target.pid,
                "start for live package, superseding"
            );
        } else {
            debug!(package, pid = target.pid, "entity registered");
        }
        self.last_pid = Some(target.pid);

        if let Some(buffered) = self.pending.remove(package) {
            debug!(package, count = buffered.len(), "replaying entries seen before start");
            self.temp.extend(buffered);
            self.flush();
        }

        self.temp.push(entry.clone());
    }

    fn on_entry(&mut self, entry: &LogcatEntry) {
        let Some(emitter) = &entry.entity else {
            return;
        };

        // 추적 패키지 순서대로 탐색
        let matched = self
            .packages
            .iter()
            .filter_map(|p| self.entities.get(p))
            .find(|live| {
                live.pid == emitter.pid
                    || (emitter.package_name.is_some() && live.package_name == emitter.package_name)
            })
            .map(|live| live.pid);

        match matched {
            Some(pid) => {
                if self.last_pid.is_some_and(|last| last != pid) {
                    self.flush();
                }
                self.last_pid = Some(pid);
                self.temp.push(entry.clone());
            }
            None => self.buffer_before_start(entry),
        }
    }

    fn buffer_before_start(&mut self, entry: &LogcatEntry) {
        let message = entry.message.as_deref().unwrap_or_default();
        let candidate = self
            .packages
            .iter()
            .filter(|p| !self.entities.contains_key(p.as_str()))
            .find(|p| self.matchers.mentions(p, message))
            .cloned();

        if let Some(package) = candidate {
            self.pending.entry(package).or_default().push(entry.clone());
        }
    }

    /// 누적된 엔트리를 한 행으로 내보냅니다. 누적이 비어 있으면 아무 것도 하지 않습니다.
    pub fn flush(&mut self) {
        if self.temp.is_empty() {
            return;
        }

        let raw: String = self.temp.iter().map(|e| e.line.text()).collect();
        let text = collapse_blank_lines(&raw);
        let cells = self
            .packages
            .iter()
            .map(|package| match self.entities.get(package) {
                Some(live) if Some(live.pid) == self.last_pid => Some(text.clone()),
                _ => None,
            })
            .collect();

        self.rows.push(TimelineRow {
            number: self.next_block,
            cells,
        });
        self.next_block += 1;
        self.temp.clear();
    }
}

impl<W: Write> EntrySink<LogcatEntry> for CorrelationContext<W> {
    fn name(&self) -> &str {
        "html"
    }

    fn accept(&mut self, entry: &LogcatEntry) -> Result<(), LogdroidError> {
        self.observe(entry);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), LogdroidError> {
        self.flush();
        let header = self.header();
        self.renderer
            .render(&mut self.out, &header, &self.rows)
            .map_err(LogcatError::from)?;
        self.out.flush().map_err(LogcatError::from)?;

        let unreplayed: usize = self.pending.values().map(Vec::len).sum();
        info!(
            rows = self.rows.len(),
            packages = self.packages.len(),
            unreplayed,
            "timeline written"
        );
        Ok(())
    }
}

/// 연속된 빈 줄 중복을 한 번 접습니다 (`\r\n\r\n`, `\r\r`, `\n\n`).
fn collapse_blank_lines(text: &str) -> String {
    text.replace("\r\n\r\n", "\r\n")
        .replace("\r\r", "\r")
        .replace("\n\n", "\n")
}
