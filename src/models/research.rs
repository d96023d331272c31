//! 调研结果

use std::sync::OnceLock;

use regex::Regex;

/// 搜索模型返回的调研结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchBrief {
    /// 原始调研文本（标题、摘要、链接）
    pub text: String,
    /// 文本中的第一个链接
    pub source_url: Option<String>,
}

impl ResearchBrief {
    pub fn from_response(text: impl Into<String>) -> Self {
        let text = text.into();
        let source_url = first_url(&text);
        Self { text, source_url }
    }

    /// 导出文档中"来源"一节的内容
    pub fn source_label(&self) -> &str {
        self.source_url.as_deref().unwrap_or("Perplexity Search Data")
    }
}

/// 提取第一个 http(s) 链接，去掉结尾的标点和括号
fn first_url(text: &str) -> Option<String> {
    static URL: OnceLock<Regex> = OnceLock::new();
    let url = URL.get_or_init(|| Regex::new(r#"https?://[^\s<>"'\]]+"#).expect("valid url regex"));

    url.find(text).map(|m| {
        m.as_str()
            .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | ')' | '*'))
            .to_string()
    })
}
