//! HTML 타임라인 렌더러
//!
//! 상관 분석 결과를 패키지별 열을 가진 표로 출력합니다.
//! 첫 열은 블록 번호이며, 각 행은 한 번의 flush에 해당합니다.

use std::borrow::Cow;
use std::io::{self, Write};

/// 기본 문서 제목
pub const DEFAULT_TITLE: &str = "Android Log";

/// 헤더 열 하나 (패키지 이름과 PID)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderColumn {
    /// 패키지 이름
    pub package: String,
    /// 알려진 PID가 없으면 `None` (`?`로 출력)
    pub pid: Option<u32>,
}

/// 타임라인 행
///
/// `cells`는 추적 패키지 순서와 같은 순서이며, 비어 있는 열은 `None`입니다.
/// 셀 텍스트는 이스케이프되지 않은 원본이며 렌더링 시점에 이스케이프합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRow {
    /// 블록 번호 (1부터 시작)
    pub number: u32,
    /// 패키지별 셀
    pub cells: Vec<Option<String>>,
}

/// HTML 문서 렌더러
#[derive(Debug, Clone)]
pub struct HtmlTimeline {
    title: String,
}

impl HtmlTimeline {
    /// 제목을 지정하여 렌더러를 생성합니다.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// 헤더와 행 전체를 하나의 문서로 출력합니다.
    pub fn render<W: Write + ?Sized>(
        &self,
        out: &mut W,
        header: &[HeaderColumn],
        rows: &[TimelineRow],
    ) -> io::Result<()> {
        self.write_head(out, header)?;
        for row in rows {
            write_row(out, row)?;
        }
        write_tail(out)
    }

    fn write_head<W: Write + ?Sized>(&self, out: &mut W, header: &[HeaderColumn]) -> io::Result<()> {
        writeln!(out, "<!DOCTYPE html>")?;
        writeln!(out, "<html>")?;
        writeln!(out)?;
        writeln!(out, "<head>")?;
        writeln!(out, "\t<meta charset=\"utf-8\">")?;
        writeln!(out, "\t<title>{}</title>", escape_html(&self.title))?;
        writeln!(out, "</head>")?;
        writeln!(out)?;
        writeln!(out, "<body>")?;
        writeln!(out, "<table border=\"1\">")?;
        writeln!(out, "<thead>")?;
        writeln!(out, "<tr>")?;
        writeln!(out, "\t<td>#</td>")?;
        for column in header {
            let package = escape_html(&column.package);
            match column.pid {
                Some(pid) => writeln!(out, "\t<td>{package}<br>({pid})</td>")?,
                None => writeln!(out, "\t<td>{package}<br>(?)</td>")?,
            }
        }
        writeln!(out, "</tr>")?;
        writeln!(out, "</thead>")?;
        writeln!(out, "<tbody>")
    }
}

impl Default for HtmlTimeline {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE)
    }
}

fn write_row<W: Write + ?Sized>(out: &mut W, row: &TimelineRow) -> io::Result<()> {
    write!(out, "<tr><td align=\"right\">{}</td>", row.number)?;
    for cell in &row.cells {
        match cell {
            Some(text) => write!(out, "<td><pre>{}</pre></td>", escape_html(text))?,
            None => write!(out, "<td></td>")?,
        }
    }
    writeln!(out, "</tr>")
}

fn write_tail<W: Write + ?Sized>(out: &mut W) -> io::Result<()> {
    writeln!(out, "</tbody>")?;
    writeln!(out, "</table>")?;
    writeln!(out, "</body>")?;
    writeln!(out)?;
    writeln!(out, "</html>")
}

/// `&`, `<`, `>`를 엔티티로 바꿉니다. 바꿀 문자가 없으면 빌린 그대로 반환합니다.
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(header: &[HeaderColumn], rows: &[TimelineRow]) -> String {
        let mut out = Vec::new();
        HtmlTimeline::default().render(&mut out, header, rows).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn escape_replaces_markup_characters() {
        assert_eq!(escape_html("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
    }

    #[test]
    fn escape_borrows_clean_text() {
        assert!(matches!(escape_html("plain text"), Cow::Borrowed(_)));
    }

    #[test]
    fn document_skeleton() {
        let html = render(&[], &[]);
        assert!(html.starts_with("<!DOCTYPE html>\n"));
        assert!(html.contains("<title>Android Log</title>"));
        assert!(html.contains("<table border=\"1\">"));
        assert!(html.contains("<td>#</td>"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn header_shows_pid_or_question_mark() {
        let header = vec![
            HeaderColumn {
                package: "com.example.app".to_owned(),
                pid: Some(5678),
            },
            HeaderColumn {
                package: "com.example.idle".to_owned(),
                pid: None,
            },
        ];
        let html = render(&header, &[]);
        assert!(html.contains("<td>com.example.app<br>(5678)</td>"));
        assert!(html.contains("<td>com.example.idle<br>(?)</td>"));
    }

    #[test]
    fn rows_escape_cell_text_and_keep_empty_cells() {
        let rows = vec![TimelineRow {
            number: 3,
            cells: vec![None, Some("List<String> x\n".to_owned())],
        }];
        let html = render(&[], &rows);
        assert!(html.contains(
            "<tr><td align=\"right\">3</td><td></td><td><pre>List&lt;String&gt; x\n</pre></td></tr>"
        ));
    }

    #[test]
    fn custom_title_is_escaped() {
        let mut out = Vec::new();
        HtmlTimeline::new("A & B")
            .render(&mut out, &[], &[])
            .unwrap();
        let html = String::from_utf8(out).unwrap();
        assert!(html.contains("<title>A &amp; B</title>"));
    }
}
