//! 라인 소스 -- 콘솔 스트림이나 파일을 번호 붙은 텍스트 라인으로 변환
//!
//! [`LineReader`]는 임의의 [`BufRead`]를 감싸 1부터 시작하는 순번의
//! [`Line`]을 순서대로 생성합니다. 코어 파서는 "라인을 순서대로 생성한다"는
//! 사실에만 의존하며 I/O 매체는 알지 못합니다.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// 입력 라인
///
/// 원본 텍스트는 줄바꿈 문자를 포함한 그대로 보관합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    source: Arc<str>,
    number: usize,
    text: String,
}

impl Line {
    /// 새 라인을 생성합니다.
    pub fn new(source: impl Into<Arc<str>>, number: usize, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            number,
            text: text.into(),
        }
    }

    /// 라인을 생성한 소스 식별자 (파일 경로 또는 `<stdin>`)
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 소스 내 순번 (1부터 시작)
    pub fn number(&self) -> usize {
        self.number
    }

    /// 원본 텍스트
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 줄바꿈 문자를 제거한 텍스트
    pub fn trimmed(&self) -> &str {
        self.text.trim_end_matches(['\r', '\n'])
    }

    /// 연속 라인의 텍스트를 덧붙입니다. 순번과 소스는 그대로 유지됩니다.
    pub fn append(&mut self, other: &Line) {
        self.text.push_str(&other.text);
    }
}

/// 순서가 보장된 라인 시퀀스
pub trait LineSource: Iterator<Item = io::Result<Line>> {
    /// 소스 식별자
    fn source_id(&self) -> &str;
}

/// [`BufRead`] 기반 라인 리더
///
/// 유효하지 않은 UTF-8 바이트는 손실 변환합니다.
pub struct LineReader<R> {
    source: Arc<str>,
    reader: R,
    next_number: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    /// 리더를 감싸 라인 소스를 만듭니다.
    pub fn new(source: impl Into<Arc<str>>, reader: R) -> Self {
        Self {
            source: source.into(),
            reader,
            next_number: 1,
            buf: Vec::new(),
        }
    }
}

impl LineReader<BufReader<File>> {
    /// 파일을 열어 라인 소스를 만듭니다.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Ok(Self::new(path.display().to_string(), BufReader::new(file)))
    }
}

impl LineReader<io::StdinLock<'static>> {
    /// 표준 입력에서 읽는 라인 소스
    pub fn stdin() -> Self {
        Self::new("<stdin>", io::stdin().lock())
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<Line>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                let text = String::from_utf8_lossy(&self.buf).into_owned();
                let line = Line::new(Arc::clone(&self.source), self.next_number, text);
                self.next_number += 1;
                Some(Ok(line))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

impl<R: BufRead> LineSource for LineReader<R> {
    fn source_id(&self) -> &str {
        &self.source
    }
}
