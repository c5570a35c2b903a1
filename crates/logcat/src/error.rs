//! logcat 크레이트 에러 타입
//!
//! [`LogcatError`]는 분류기 패턴 컴파일, HTML 출력, SQLite 저장소에서 발생하는
//! 에러를 표현합니다. `From<LogcatError> for LogdroidError` 변환이 구현되어 있어
//! 싱크 구현에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use logdroid_core::error::{LogdroidError, ParseError, StorageError};

/// logcat 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogcatError {
    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    /// 데이터베이스 열기 실패
    #[error("cannot open database {path}: {reason}")]
    Open {
        /// 데이터베이스 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// SQLite 쿼리 에러
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O 에러 (HTML 출력 등)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LogcatError> for LogdroidError {
    fn from(err: LogcatError) -> Self {
        match err {
            LogcatError::Regex(e) => LogdroidError::Parse(ParseError::Pattern(e.to_string())),
            LogcatError::Open { path, reason } => {
                LogdroidError::Storage(StorageError::Connection(format!("{path}: {reason}")))
            }
            LogcatError::Sqlite(e) => LogdroidError::Storage(StorageError::Query(e.to_string())),
            LogcatError::Io(e) => LogdroidError::Io(e),
        }
    }
}
