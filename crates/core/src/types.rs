//! 도메인 타입 -- 로그 레벨과 블록 마크
//!
//! 파서와 싱크가 공유하는 작은 값 타입을 정의합니다.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// 로그 심각도 레벨
///
/// 닫힌 열거형입니다. 하위 소비자가 레벨 기준으로 필터링하므로
/// 모든 엔트리는 유효한 레벨을 가져야 합니다.
/// `Ord` 구현으로 비교가 가능합니다 (`Verbose < Debug < ... < Fatal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Verbose,
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl Level {
    /// logcat 한 글자 레벨 코드를 디코딩합니다.
    ///
    /// `V D I W E F` 외의 코드는 `None`을 반환합니다.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'V' => Some(Self::Verbose),
            'D' => Some(Self::Debug),
            'I' => Some(Self::Info),
            'W' => Some(Self::Warning),
            'E' => Some(Self::Error),
            'F' => Some(Self::Fatal),
            _ => None,
        }
    }

    /// 저장소와 출력에 쓰이는 대문자 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verbose => "VERBOSE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 블록 마크
///
/// `--------- beginning of <name>` 같은 버퍼 경계 라인을 나타냅니다.
/// 파서 컨텍스트가 소유하며, 마크가 활성인 동안 생성된 엔트리에
/// 참조로 복사됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockMark(Arc<str>);

impl BlockMark {
    /// 새 블록 마크를 생성합니다.
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    /// 마크 이름 (예: `main`, `system`, `crash`)
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
