//! logcat 엔트리 모델 -- 엔티티(프로세스)와 구조화된 로그 엔트리
//!
//! 모든 엔트리는 공통 필드 집합을 가지며, 프로세스 시작 이벤트만
//! [`EntryKind::EntityStart`]로 시작 대상 엔티티를 추가로 보유합니다.
//! 보고한 프로세스(`entity`)와 시작되는 프로세스(`target`)는 서로 다른 값입니다.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use logdroid_core::parser::LogRecord;
use logdroid_core::text::Line;
use logdroid_core::types::{BlockMark, Level};

/// 엔티티 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// 액티비티
    Activity,
    /// 서비스
    Service,
    /// 브로드캐스트 리시버
    Broadcast,
}

impl EntityKind {
    /// 문자열 표현 (`activity`, `service`, `broadcast`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Activity => "activity",
            Self::Service => "service",
            Self::Broadcast => "broadcast",
        }
    }

    /// 문자열에서 종류를 파싱합니다. 알 수 없는 값은 `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "activity" => Some(Self::Activity),
            "service" => Some(Self::Service),
            "broadcast" => Some(Self::Broadcast),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 운영체제 프로세스
///
/// 같은 패키지라도 프로세스가 다시 시작되면 새 `Entity` 값이 만들어집니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    /// 프로세스 ID
    pub pid: u32,
    /// 패키지 이름
    pub package_name: Option<String>,
    /// 컴포넌트 이름
    pub name: Option<String>,
    /// 컴포넌트 종류
    pub kind: Option<EntityKind>,
}

impl Entity {
    /// PID만 알려진 엔티티
    pub fn from_pid(pid: u32) -> Self {
        Self {
            pid,
            package_name: None,
            name: None,
            kind: None,
        }
    }

    /// PID와 패키지 이름이 알려진 엔티티
    pub fn with_package(pid: u32, package_name: impl Into<String>) -> Self {
        Self {
            pid,
            package_name: Some(package_name.into()),
            name: None,
            kind: None,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pid)?;
        if let Some(package) = &self.package_name {
            write!(f, "/{package}")?;
        }
        if let Some(name) = &self.name {
            write!(f, "/{name}")?;
        }
        if let Some(kind) = self.kind {
            write!(f, " ({kind})")?;
        }
        Ok(())
    }
}

/// 엔트리 변형
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// 일반 로그 엔트리
    Plain,
    /// 프로세스 시작 이벤트 (`Start proc <PID>:...`)
    EntityStart {
        /// 시작되는 프로세스
        target: Entity,
    },
}

/// 구조화된 logcat 엔트리
///
/// 구조화 필드는 엔트리가 생성될 때 한 번만 채워지며,
/// 연속 라인은 `line`의 원본 텍스트만 늘립니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogcatEntry {
    /// 타임스탬프 (연도는 설정값 또는 현재 연도)
    pub timestamp: Option<NaiveDateTime>,
    /// 로그 레벨
    pub level: Option<Level>,
    /// 태그
    pub tag: Option<String>,
    /// 메시지 (첫 라인 기준)
    pub message: Option<String>,
    /// 원본 라인 (연속 라인 포함)
    pub line: Line,
    /// 로그를 남긴 프로세스
    pub entity: Option<Entity>,
    /// 엔트리 생성 시 활성 블록 마크
    pub mark: Option<BlockMark>,
    /// 엔트리 변형
    pub kind: EntryKind,
}

impl LogcatEntry {
    /// 프로세스 시작 이벤트의 대상 엔티티
    pub fn target_entity(&self) -> Option<&Entity> {
        match &self.kind {
            EntryKind::Plain => None,
            EntryKind::EntityStart { target } => Some(target),
        }
    }

    /// 프로세스 시작 이벤트인지 확인합니다.
    pub fn is_entity_start(&self) -> bool {
        matches!(self.kind, EntryKind::EntityStart { .. })
    }

    /// 로그를 남긴 프로세스의 PID
    pub fn pid(&self) -> Option<u32> {
        self.entity.as_ref().map(|e| e.pid)
    }
}

impl LogRecord for LogcatEntry {
    fn source_line_mut(&mut self) -> &mut Line {
        &mut self.line
    }
}

impl fmt::Display for LogcatEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.line.number())?;
        if let Some(level) = self.level {
            write!(f, " {level}")?;
        }
        if let Some(tag) = &self.tag {
            write!(f, " {tag}")?;
        }
        if let Some(entity) = &self.entity {
            write!(f, " [{entity}]")?;
        }
        if let Some(target) = self.target_entity() {
            write!(f, " start -> [{target}]")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}
