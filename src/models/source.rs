//! 原始文本

use std::fmt;

/// 用户提供的原始文本（粘贴、上传提取或调研结果）
///
/// 创建后不可修改；新的输入会整体替换它。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText(String);

impl SourceText {
    /// 创建原始文本；全是空白时返回 `None`
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 字符数（不是字节数）
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    /// 截取前 `max_chars` 个字符用于提示词
    ///
    /// 按字符边界截断，可能截在句子中间。
    pub fn excerpt(&self, max_chars: usize) -> &str {
        match self.0.char_indices().nth(max_chars) {
            Some((byte_idx, _)) => &self.0[..byte_idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
