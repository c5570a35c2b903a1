//! logdroid-logcat -- Android logcat 분류기와 싱크
//!
//! # 모듈 구성
//!
//! - [`entry`]: 엔티티(프로세스)와 logcat 엔트리 모델
//! - [`classifier`]: short/long 형식 logcat 라인 분류기
//! - [`correlation`]: 엔트리를 프로세스별로 묶는 상관 분석 컨텍스트 (HTML 싱크)
//! - [`html`]: 타임라인 HTML 렌더러
//! - [`store`]: SQLite 저장 싱크와 PID별 덤프
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! LineReader -> Parser<LogcatClassifier> -> FanOut
//!                                             |-- CorrelationContext -> HTML
//!                                             |-- LogStore -> SQLite -> LogDump
//! ```

pub mod classifier;
pub mod correlation;
pub mod entry;
pub mod error;
pub mod html;
pub mod store;

// --- 주요 타입 re-export ---

// 분류기
pub use classifier::LogcatClassifier;

// 엔트리
pub use entry::{Entity, EntityKind, EntryKind, LogcatEntry};

// 싱크
pub use correlation::{CorrelationContext, PackageMatchers};
pub use store::{DumpRow, LogDump, LogStore};

// 렌더러
pub use html::{HeaderColumn, HtmlTimeline, TimelineRow};

// 에러
pub use error::LogcatError;
