//! SQLite 로그 저장소와 덤프 리더
//!
//! [`LogStore`]는 엔트리를 `log` 테이블에, 프로세스 시작 이벤트의 대상 엔티티를
//! `entity` 테이블에 기록하는 싱크입니다. 쓰기는 `batch_size`개씩 하나의
//! 트랜잭션으로 묶으며, 마지막 불완전 배치는 commit 시 기록됩니다.
//!
//! [`LogDump`]는 같은 데이터베이스를 읽기 전용으로 열어 PID별 원본 라인을 조회합니다.

use std::path::Path;

use rusqlite::{params, Connection, OpenFlags};
use serde::Serialize;
use tracing::{debug, info};

use logdroid_core::error::LogdroidError;
use logdroid_core::pipeline::EntrySink;

use crate::entry::LogcatEntry;
use crate::error::LogcatError;

/// 기본 배치 크기
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// 저장 시 타임스탬프 형식
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS log (
        line_no INTEGER NOT NULL,
        raw_line TEXT NOT NULL,
        timestamp TEXT,
        entity_pid INTEGER,
        entity_package_name TEXT,
        entity_name TEXT,
        entity_type TEXT,
        block_mark TEXT,
        tag TEXT,
        level TEXT,
        message TEXT
    );

    CREATE TABLE IF NOT EXISTS entity (
        pid INTEGER NOT NULL,
        package_name TEXT,
        name TEXT,
        type TEXT
    );

    CREATE INDEX IF NOT EXISTS log_entity_pid ON log (entity_pid);
";

const INSERT_LOG: &str = "INSERT INTO log (line_no, raw_line, timestamp, entity_pid, \
     entity_package_name, entity_name, entity_type, block_mark, tag, level, message) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

const INSERT_ENTITY: &str = "INSERT INTO entity (pid, package_name, name, type) VALUES (?1, ?2, ?3, ?4)";

/// SQLite 저장 싱크
pub struct LogStore {
    conn: Connection,
    batch: Vec<LogcatEntry>,
    batch_size: usize,
    written: usize,
    entities: usize,
}

impl LogStore {
    /// 데이터베이스를 열거나 생성하고 스키마를 준비합니다.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LogcatError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| LogcatError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::with_connection(conn)
    }

    /// 인메모리 저장소 (테스트용)
    pub fn open_in_memory() -> Result<Self, LogcatError> {
        let conn = Connection::open_in_memory().map_err(|e| LogcatError::Open {
            path: ":memory:".to_owned(),
            reason: e.to_string(),
        })?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, LogcatError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            batch: Vec::with_capacity(DEFAULT_BATCH_SIZE),
            batch_size: DEFAULT_BATCH_SIZE,
            written: 0,
            entities: 0,
        })
    }

    /// 배치 크기를 설정합니다. 0은 1로 취급합니다.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// 기록된 `log` 행 수
    pub fn written(&self) -> usize {
        self.written
    }

    /// 기록된 `entity` 행 수
    pub fn entities_written(&self) -> usize {
        self.entities
    }

    /// 아직 기록되지 않은 배치 크기
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// 하위 연결 (조회용)
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// 쌓인 배치를 하나의 트랜잭션으로 기록합니다.
    fn write_batch(&mut self) -> Result<(), LogcatError> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        let mut entities = 0;
        {
            let mut insert_log = tx.prepare_cached(INSERT_LOG)?;
            let mut insert_entity = tx.prepare_cached(INSERT_ENTITY)?;

            for entry in &self.batch {
                if let Some(target) = entry.target_entity() {
                    insert_entity.execute(params![
                        target.pid,
                        target.package_name,
                        target.name,
                        target.kind.map(|k| k.as_str()),
                    ])?;
                    entities += 1;
                }

                let reporter = entry.entity.as_ref();
                insert_log.execute(params![
                    entry.line.number() as i64,
                    entry.line.text(),
                    entry
                        .timestamp
                        .map(|ts| ts.format(TIMESTAMP_FORMAT).to_string()),
                    reporter.map(|e| e.pid),
                    reporter.and_then(|e| e.package_name.as_deref()),
                    reporter.and_then(|e| e.name.as_deref()),
                    reporter.and_then(|e| e.kind.map(|k| k.as_str())),
                    entry.mark.as_ref().map(|m| m.name()),
                    entry.tag,
                    entry.level.map(|l| l.as_str()),
                    entry.message,
                ])?;
            }
        }
        tx.commit()?;

        debug!(rows = self.batch.len(), entities, "batch committed");
        self.written += self.batch.len();
        self.entities += entities;
        self.batch.clear();
        Ok(())
    }
}

impl EntrySink<LogcatEntry> for LogStore {
    fn name(&self) -> &str {
        "db"
    }

    fn accept(&mut self, entry: &LogcatEntry) -> Result<(), LogdroidError> {
        self.batch.push(entry.clone());
        if self.batch.len() >= self.batch_size {
            self.write_batch()?;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), LogdroidError> {
        self.write_batch()?;
        info!(
            rows = self.written,
            entities = self.entities,
            "log store committed"
        );
        Ok(())
    }
}

/// 덤프 결과 행
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpRow {
    /// 소스 내 라인 번호
    pub line_no: i64,
    /// 원본 라인 (연속 라인 포함)
    pub raw_line: String,
}

/// 저장된 로그 조회기
pub struct LogDump {
    conn: Connection,
}

impl LogDump {
    /// 데이터베이스를 읽기 전용으로 엽니다. 파일이 없으면 에러입니다.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LogcatError> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(
            |e| LogcatError::Open {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
        )?;
        Ok(Self { conn })
    }

    /// PID가 남긴 원본 라인을 기록 순서대로 조회합니다.
    pub fn by_pid(&self, pid: u32) -> Result<Vec<DumpRow>, LogcatError> {
        let mut stmt = self
            .conn
            .prepare("SELECT line_no, raw_line FROM log WHERE entity_pid = ?1 ORDER BY rowid")?;
        let rows = stmt
            .query_map(params![pid], |row| {
                Ok(DumpRow {
                    line_no: row.get(0)?,
                    raw_line: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
