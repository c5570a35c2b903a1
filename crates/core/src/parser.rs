//! 파서 상태 머신 -- 라인 분류 결과를 상태 전이로 변환
//!
//! [`Parser`]는 [`LineSource`]에서 라인을 하나씩 읽어 [`Classifier`]에 넘기고,
//! 분류 결과 네 가지를 [`ParseContext`]에 대한 전이로 바꿉니다.
//!
//! | 분류 결과 | 전이 | 동작 |
//! |-----------|------|------|
//! | [`Classified::Continuation`] | append | 보유 중인 엔트리에 원본 텍스트를 덧붙임 |
//! | [`Classified::Entry`] | forward | 보유 엔트리를 싱크로 push하고 새 엔트리를 보유 |
//! | [`Classified::Nothing`] | discard | 보유 엔트리를 push 없이 버림 |
//! | [`Classified::Marker`] | stay | 아무 것도 하지 않음 (부수 효과는 분류기에서 처리됨) |
//!
//! 입력이 끝나면 보유 엔트리를 push하고 싱크를 commit합니다.
//! 파서 자체는 자원을 소유하지 않으며, 라인 소스와 싱크에 I/O를 위임합니다.

use tracing::{debug, info};

use crate::error::LogdroidError;
use crate::pipeline::EntrySink;
use crate::text::{Line, LineSource};
use crate::types::BlockMark;

/// 원본 라인을 보유하며 연속 라인으로 확장될 수 있는 레코드
pub trait LogRecord {
    /// 원본 라인의 가변 참조
    fn source_line_mut(&mut self) -> &mut Line;

    /// 연속 라인이 덧붙은 뒤 호출되는 훅 (기본은 아무 것도 하지 않음)
    fn update(&mut self) {}

    /// 연속 라인을 덧붙이고 [`update`](LogRecord::update) 훅을 호출합니다.
    fn append_line(&mut self, line: &Line) {
        self.source_line_mut().append(line);
        self.update();
    }
}

/// 분류기 한 번 호출의 결과
#[derive(Debug)]
pub enum Classified<E> {
    /// 이전 엔트리의 연속 라인
    Continuation(Line),
    /// 새 엔트리 시작
    Entry(E),
    /// 진행 중인 누적을 버림 (빈 줄, 배너)
    Nothing,
    /// 엔트리 흐름에 참여하지 않는 구조 마커
    Marker(BlockMark),
}

/// 보유 상태
#[derive(Debug)]
pub enum ParserState<E> {
    /// 보유 중인 엔트리 없음
    Idle,
    /// 연속 라인을 받을 수 있는 엔트리를 보유 중
    Accumulating(E),
}

impl<E: LogRecord> ParserState<E> {
    /// 보유 엔트리에 연속 라인을 덧붙입니다.
    ///
    /// `Idle` 상태에서는 아무 것도 하지 않고 `false`를 반환합니다.
    pub fn append(&mut self, line: &Line) -> bool {
        match self {
            Self::Idle => false,
            Self::Accumulating(entry) => {
                entry.append_line(line);
                true
            }
        }
    }

    /// 새 엔트리를 보유하고, 이전에 보유하던 엔트리를 반환합니다.
    pub fn forward(&mut self, entry: E) -> Option<E> {
        match std::mem::replace(self, Self::Accumulating(entry)) {
            Self::Idle => None,
            Self::Accumulating(prev) => Some(prev),
        }
    }

    /// 보유 엔트리를 꺼내고 `Idle`로 돌아갑니다.
    pub fn take(&mut self) -> Option<E> {
        match std::mem::replace(self, Self::Idle) {
            Self::Idle => None,
            Self::Accumulating(prev) => Some(prev),
        }
    }

    /// 보유 엔트리가 있는지 확인합니다.
    pub fn is_accumulating(&self) -> bool {
        matches!(self, Self::Accumulating(_))
    }
}

/// 파서 컨텍스트
///
/// 보유 상태와 활성 블록 마크를 담습니다. 분류기는 이 컨텍스트를 읽고,
/// 블록 경계처럼 부수 효과가 필요한 경우에만 수정합니다.
#[derive(Debug)]
pub struct ParseContext<E> {
    state: ParserState<E>,
    mark: Option<BlockMark>,
}

impl<E: LogRecord> ParseContext<E> {
    /// 빈 컨텍스트를 생성합니다.
    pub fn new() -> Self {
        Self {
            state: ParserState::Idle,
            mark: None,
        }
    }

    /// 현재 보유 상태
    pub fn state(&self) -> &ParserState<E> {
        &self.state
    }

    /// 활성 블록 마크
    pub fn mark(&self) -> Option<&BlockMark> {
        self.mark.as_ref()
    }

    /// 활성 블록 마크를 교체합니다.
    pub fn set_mark(&mut self, mark: BlockMark) {
        self.mark = Some(mark);
    }

    /// 보유 엔트리를 push 없이 버립니다. 버린 엔트리가 있으면 `true`.
    pub fn discard(&mut self) -> bool {
        self.state.take().is_some()
    }

    /// 소스 경계에서 보유 상태와 마크를 초기화합니다.
    fn reset(&mut self) {
        self.state = ParserState::Idle;
        self.mark = None;
    }
}

impl<E: LogRecord> Default for ParseContext<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// 라인 분류기
///
/// 라인 하나와 현재 컨텍스트를 받아 정확히 하나의 [`Classified`]를 반환합니다.
/// 인식하지 못한 라인은 에러가 아니라 연속 라인입니다.
pub trait Classifier {
    /// 생성하는 엔트리 타입
    type Entry: LogRecord;

    /// 다음 라인을 분류합니다.
    fn read_next(
        &self,
        context: &mut ParseContext<Self::Entry>,
        line: Line,
    ) -> Result<Classified<Self::Entry>, LogdroidError>;
}

/// 파싱 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// 읽은 라인 수
    pub lines: usize,
    /// 싱크로 push된 엔트리 수
    pub entries: usize,
    /// 보유 엔트리에 덧붙은 연속 라인 수
    pub continuations: usize,
    /// 보유 엔트리 없이 도착해 무시된 연속 라인 수
    pub orphans: usize,
    /// push 없이 버려진 엔트리 수
    pub discarded: usize,
    /// 블록 마크 수
    pub marks: usize,
}

impl ParseStats {
    fn merge(&mut self, other: ParseStats) {
        self.lines += other.lines;
        self.entries += other.entries;
        self.continuations += other.continuations;
        self.orphans += other.orphans;
        self.discarded += other.discarded;
        self.marks += other.marks;
    }
}

/// 파서 상태 머신
pub struct Parser<C> {
    classifier: C,
}

impl<C: Classifier> Parser<C> {
    /// 분류기로 파서를 생성합니다.
    pub fn new(classifier: C) -> Self {
        Self { classifier }
    }

    /// 분류기 참조
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// 단일 소스를 끝까지 파싱하고 싱크를 commit합니다.
    pub fn parse<S, K>(&self, source: S, sink: &mut K) -> Result<ParseStats, LogdroidError>
    where
        S: LineSource,
        K: EntrySink<C::Entry> + ?Sized,
    {
        self.parse_all(std::iter::once(source), sink)
    }

    /// 여러 소스를 순서대로 파싱한 뒤 싱크를 한 번 commit합니다.
    ///
    /// 보유 상태와 블록 마크는 소스 경계마다 초기화됩니다.
    pub fn parse_all<I, S, K>(&self, sources: I, sink: &mut K) -> Result<ParseStats, LogdroidError>
    where
        I: IntoIterator<Item = S>,
        S: LineSource,
        K: EntrySink<C::Entry> + ?Sized,
    {
        let mut context = ParseContext::new();
        let mut total = ParseStats::default();

        for source in sources {
            let stats = self.feed(source, &mut context, sink)?;
            total.merge(stats);
        }

        sink.commit()?;
        info!(
            lines = total.lines,
            entries = total.entries,
            continuations = total.continuations,
            discarded = total.discarded,
            marks = total.marks,
            "parse finished"
        );
        Ok(total)
    }

    fn feed<S, K>(
        &self,
        source: S,
        context: &mut ParseContext<C::Entry>,
        sink: &mut K,
    ) -> Result<ParseStats, LogdroidError>
    where
        S: LineSource,
        K: EntrySink<C::Entry> + ?Sized,
    {
        context.reset();
        let mut stats = ParseStats::default();
        debug!(source = source.source_id(), "reading source");

        for line in source {
            let line = line?;
            stats.lines += 1;

            // 분류기가 경계 처리 중 버린 엔트리도 집계합니다.
            let held_before = context.state.is_accumulating();
            let outcome = self.classifier.read_next(context, line)?;
            if held_before && !context.state.is_accumulating() {
                stats.discarded += 1;
            }

            match outcome {
                Classified::Continuation(line) => {
                    if context.state.append(&line) {
                        stats.continuations += 1;
                    } else {
                        stats.orphans += 1;
                    }
                }
                Classified::Entry(entry) => {
                    if let Some(prev) = context.state.forward(entry) {
                        sink.accept(&prev)?;
                        stats.entries += 1;
                    }
                }
                Classified::Nothing => {
                    if context.discard() {
                        stats.discarded += 1;
                    }
                }
                Classified::Marker(_) => {
                    stats.marks += 1;
                }
            }
        }

        if let Some(last) = context.state.take() {
            sink.accept(&last)?;
            stats.entries += 1;
        }

        Ok(stats)
    }
}
