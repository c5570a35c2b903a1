//! 에러 타입 -- 도메인별 에러 정의

/// logdroid 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogdroidError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 파싱 에러 (복구 불가)
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 스토리지 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 파싱 에러
///
/// 인식하지 못한 라인 형식은 에러가 아닙니다 (연속 라인으로 처리).
/// 여기에는 처리를 중단해야 하는 디코딩 실패만 포함됩니다.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 알 수 없는 로그 레벨 코드
    #[error("unknown log level '{code}' at line {line}")]
    UnknownLevel { code: String, line: usize },

    /// 패턴 컴파일 실패
    #[error("invalid pattern: {0}")]
    Pattern(String),
}

/// 스토리지 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 연결 실패
    #[error("connection failed: {0}")]
    Connection(String),

    /// 쿼리 실패
    #[error("query failed: {0}")]
    Query(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_level_display_includes_code_and_line() {
        let err = ParseError::UnknownLevel {
            code: "X".to_owned(),
            line: 42,
        };
        let msg = err.to_string();
        assert!(msg.contains("'X'"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn parse_error_converts_to_top_level() {
        let err: LogdroidError = ParseError::Pattern("bad".to_owned()).into();
        assert!(matches!(err, LogdroidError::Parse(_)));
    }

    #[test]
    fn storage_error_display() {
        let err = LogdroidError::from(StorageError::Query("no such table: log".to_owned()));
        assert!(err.to_string().contains("no such table"));
    }
}
