//! 설정 관리 -- logdroid.toml 파싱 및 런타임 설정
//!
//! [`LogdroidConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGDROID_STORE_PATH=/tmp/log.db` 형식)
//! 3. 설정 파일 (`logdroid.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # fn example() -> Result<(), logdroid_core::error::LogdroidError> {
//! use logdroid_core::config::LogdroidConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogdroidConfig::load("logdroid.toml")?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogdroidConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogdroidError};

/// 시스템 프로세스 컬럼의 기본 이름
pub const SYSTEM_PROCESS: &str = "system_process";

/// logdroid 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogdroidConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 엔티티 상관 분석 설정
    #[serde(default)]
    pub correlation: CorrelationConfig,
    /// 저장소 설정
    #[serde(default)]
    pub store: StoreConfig,
    /// HTML 출력 설정
    #[serde(default)]
    pub html: HtmlConfig,
    /// 파서 설정
    #[serde(default)]
    pub parser: ParserConfig,
}

impl LogdroidConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LogdroidError> {
        let mut config = Self::from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 있으면 [`load`](Self::load)하고, 없으면 기본값에 환경변수만 적용합니다.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, LogdroidError> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LogdroidError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogdroidError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogdroidError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogdroidError> {
        toml::from_str(toml_str).map_err(|e| {
            LogdroidError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGDROID_{SECTION}_{FIELD}`
    /// 예: `LOGDROID_CORRELATION_PACKAGE_NAMES=com.a,com.b`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGDROID_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGDROID_GENERAL_LOG_FORMAT");

        // Correlation
        override_csv(
            &mut self.correlation.package_names,
            "LOGDROID_CORRELATION_PACKAGE_NAMES",
        );
        override_bool(
            &mut self.correlation.include_system_process,
            "LOGDROID_CORRELATION_INCLUDE_SYSTEM_PROCESS",
        );
        override_string(
            &mut self.correlation.system_process_name,
            "LOGDROID_CORRELATION_SYSTEM_PROCESS_NAME",
        );

        // Store
        override_string(&mut self.store.path, "LOGDROID_STORE_PATH");
        override_usize(&mut self.store.batch_size, "LOGDROID_STORE_BATCH_SIZE");

        // HTML
        override_string(&mut self.html.title, "LOGDROID_HTML_TITLE");

        // Parser
        if let Ok(val) = std::env::var("LOGDROID_PARSER_YEAR") {
            match val.parse::<i32>() {
                Ok(parsed) => self.parser.year = Some(parsed),
                Err(_) => warn!(
                    env_key = "LOGDROID_PARSER_YEAR",
                    value = val.as_str(),
                    "failed to parse i32 from env var, ignoring"
                ),
            }
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogdroidError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.store.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "store.batch_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.store.path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store.path".to_owned(),
                reason: "must not be empty".to_owned(),
            }
            .into());
        }

        if let Some(empty) = self
            .correlation
            .package_names
            .iter()
            .position(|name| name.trim().is_empty())
        {
            return Err(ConfigError::InvalidValue {
                field: format!("correlation.package_names[{empty}]"),
                reason: "package name must not be empty".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 엔티티 상관 분석 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// 추적할 패키지 이름 목록 (HTML 컬럼 순서)
    pub package_names: Vec<String>,
    /// 패키지 목록이 있을 때 시스템 프로세스 컬럼을 덧붙일지 여부
    pub include_system_process: bool,
    /// 시스템 프로세스 컬럼 이름 (보고 라인의 패키지와 무관하게 이 이름으로 기록)
    pub system_process_name: String,
}

impl CorrelationConfig {
    /// 실제 추적 대상 패키지 목록
    ///
    /// 패키지가 하나 이상이고 `include_system_process`가 켜져 있으면
    /// 시스템 프로세스 이름을 마지막 컬럼으로 덧붙입니다.
    pub fn tracked_packages(&self) -> Vec<String> {
        let mut packages = self.package_names.clone();
        if !packages.is_empty()
            && self.include_system_process
            && !packages.contains(&self.system_process_name)
        {
            packages.push(self.system_process_name.clone());
        }
        packages
    }
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            package_names: Vec::new(),
            include_system_process: true,
            system_process_name: SYSTEM_PROCESS.to_owned(),
        }
    }
}

/// 저장소 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite 데이터베이스 경로
    pub path: String,
    /// 트랜잭션 하나에 묶을 엔트리 수
    pub batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "android_log.db".to_owned(),
            batch_size: 1000,
        }
    }
}

/// HTML 출력 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    /// 문서 제목
    pub title: String,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            title: "Android Log".to_owned(),
        }
    }
}

/// 파서 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// 연도가 없는 logcat 타임스탬프에 적용할 연도 (없으면 현재 연도)
    pub year: Option<i32>,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
