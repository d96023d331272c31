//! Word 文档导出
//!
//! 固定版式：一级标题 + 正文段落（+ 可选的来源小节），全部在内存中完成。

use std::io::Cursor;
use std::sync::OnceLock;

use docx_rs::{BreakType, Docx, Paragraph, Run, Style, StyleType};
use regex::Regex;

use crate::error::ExportError;

/// docx 的 MIME 类型
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// 来源小节的标题
pub const SOURCE_HEADING: &str = "સંદર્ભ (Source):";

/// 导出的文章
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedArticle {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// 生成 docx 字节流
///
/// # 参数
/// - `title`: 一级标题
/// - `body`: 正文，按空行分段，段内换行保留为换行符
/// - `source`: 来源链接（调研模式才有）
pub fn build_docx(title: &str, body: &str, source: Option<&str>) -> Result<Vec<u8>, ExportError> {
    let mut docx = Docx::new()
        .add_style(
            Style::new("Heading1", StyleType::Paragraph)
                .name("Heading 1")
                .size(32)
                .bold(),
        )
        .add_style(
            Style::new("Heading2", StyleType::Paragraph)
                .name("Heading 2")
                .size(26)
                .bold(),
        )
        .add_paragraph(heading(title, "Heading1"));

    for block in split_blocks(body) {
        docx = docx.add_paragraph(body_paragraph(block));
    }

    if let Some(source) = source {
        docx = docx
            .add_paragraph(heading(SOURCE_HEADING, "Heading2"))
            .add_paragraph(body_paragraph(source));
    }

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| ExportError::PackFailed(e.to_string()))?;
    Ok(buffer.into_inner())
}

fn heading(text: &str, style: &str) -> Paragraph {
    Paragraph::new()
        .add_run(Run::new().add_text(text))
        .style(style)
}

/// 段内的单个换行保留为 Word 换行
fn body_paragraph(block: &str) -> Paragraph {
    let mut run = Run::new();
    for (i, line) in block.split('\n').enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line);
    }
    Paragraph::new().add_run(run)
}

/// 按空行切分段落；全部为空时返回一个空段落
fn split_blocks(body: &str) -> Vec<&str> {
    static BLANK_LINE: OnceLock<Regex> = OnceLock::new();
    let blank = BLANK_LINE.get_or_init(|| Regex::new(r"\n[ \t]*\n").expect("valid blank line regex"));

    let normalized = body.trim_matches('\n');
    let blocks: Vec<&str> = blank
        .split(normalized)
        .map(|block| block.trim_matches('\n'))
        .filter(|block| !block.trim().is_empty())
        .collect();

    if blocks.is_empty() {
        vec![""]
    } else {
        blocks
    }
}
