//! logdroid-core -- 라인 기반 로그 파싱 공통 기반
//!
//! # 모듈 구성
//!
//! - [`text`]: 번호 붙은 입력 라인과 라인 소스
//! - [`parser`]: 분류기 결과를 상태 전이로 바꾸는 파서 상태 머신
//! - [`pipeline`]: 완성된 엔트리를 받는 싱크 trait과 팬아웃
//! - [`types`]: 로그 레벨, 블록 마크
//! - [`config`]: logdroid.toml 설정
//! - [`error`]: 에러 타입
//!
//! # 흐름
//!
//! ```text
//! LineSource -> Parser -> Classifier -> ParseContext -> EntrySink(s) -> commit
//! ```

pub mod config;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod text;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, LogdroidError, ParseError, StorageError};

// 설정
pub use config::LogdroidConfig;

// 파서
pub use parser::{Classified, Classifier, LogRecord, ParseContext, ParseStats, Parser, ParserState};

// 싱크
pub use pipeline::{EntrySink, FanOut};

// 라인
pub use text::{Line, LineReader, LineSource};

// 도메인 타입
pub use types::{BlockMark, Level};
