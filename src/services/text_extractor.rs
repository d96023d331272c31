//! 文本提取服务
//!
//! 按页提取上传文件中的文本；没有文本的页直接跳过（不加分隔符），
//! 纯图片页不算错误。

use std::path::{Path, PathBuf};

use lopdf::Document;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult, ExtractError, MissingInput};
use crate::models::SourceText;

/// 分页文档
pub trait PagedDocument {
    /// 页数
    fn page_count(&self) -> usize;

    /// 第 `index` 页（从 0 开始）的文本；无法提取时返回 `None`
    fn page_text(&self, index: usize) -> Option<String>;
}

/// 按页顺序拼接所有可提取的文本
pub fn extract_text<D: PagedDocument + ?Sized>(doc: &D) -> String {
    let mut text = String::new();
    let mut skipped = 0usize;

    for index in 0..doc.page_count() {
        match doc.page_text(index) {
            Some(page) if !page.trim().is_empty() => text.push_str(&page),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("跳过 {} 个没有文本的页面", skipped);
    }
    text
}

/// 基于 lopdf 的 PDF 文档
pub struct PdfDocument {
    doc: Document,
    page_numbers: Vec<u32>,
}

impl PdfDocument {
    /// 从内存中的字节加载 PDF
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, lopdf::Error> {
        let doc = Document::load_mem(bytes)?;
        let page_numbers = doc.get_pages().keys().copied().collect();
        Ok(Self { doc, page_numbers })
    }
}

impl PagedDocument for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text(&self, index: usize) -> Option<String> {
        let page_number = *self.page_numbers.get(index)?;
        match self.doc.extract_text(&[page_number]) {
            Ok(text) => Some(text),
            Err(e) => {
                debug!("第 {} 页提取失败: {}", page_number, e);
                None
            }
        }
    }
}

/// 提取单个文件的文本（按扩展名选择方式）
pub async fn extract_file(path: &Path) -> AppResult<String> {
    let file = path.display().to_string();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let bytes = tokio::fs::read(path).await.map_err(|e| ExtractError::ReadFailed {
        path: file.clone(),
        message: e.to_string(),
    })?;

    let text = match extension.as_deref() {
        Some("pdf") => {
            let doc = PdfDocument::from_bytes(&bytes).map_err(|e| ExtractError::PdfParseFailed {
                path: file.clone(),
                message: e.to_string(),
            })?;
            debug!("{}: 共 {} 页", file, doc.page_count());
            extract_text(&doc)
        }
        Some("txt") | Some("md") => String::from_utf8(bytes)
            .map_err(|_| ExtractError::InvalidUtf8 {
                path: file.clone(),
            })?,
        _ => return Err(ExtractError::UnsupportedFormat { path: file }.into()),
    };

    if text.trim().is_empty() {
        warn!("⚠️ {} 中没有可提取的文本", file);
    }
    Ok(text)
}

/// 提取多个文件并按顺序拼接
///
/// 所有文件都没有文本时返回 `EmptyInput`。
pub async fn extract_files(paths: &[PathBuf]) -> AppResult<SourceText> {
    if paths.is_empty() {
        return Err(AppError::EmptyInput(MissingInput::Files));
    }

    let mut combined = String::new();
    for path in paths {
        let text = extract_file(path).await?;
        info!(
            "📄 已读取 {}（{} 字符）",
            path.display(),
            text.chars().count()
        );
        combined.push_str(&text);
    }

    SourceText::new(combined).ok_or(AppError::EmptyInput(MissingInput::NoExtractableText))
}
