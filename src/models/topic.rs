//! 作物 - 害虫 主题

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// 从原文中识别出的 `作物 - 害虫` 组合
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTopic {
    pub crop: String,
    pub pest: String,
}

impl ExtractedTopic {
    pub fn new(crop: impl Into<String>, pest: impl Into<String>) -> Self {
        Self {
            crop: crop.into(),
            pest: pest.into(),
        }
    }

    /// 解析单行 `Crop - Pest`
    ///
    /// 会去掉模型常加的列表符号、序号和加粗标记；不符合格式的行返回 `None`。
    pub fn parse_line(line: &str) -> Option<Self> {
        static PREFIX: OnceLock<Regex> = OnceLock::new();
        let prefix = PREFIX.get_or_init(|| {
            Regex::new(r"^\s*(?:[-*•]+\s*|\d+[.)]\s*)?").expect("valid topic prefix regex")
        });

        let cleaned = prefix.replace(line, "");
        let cleaned = cleaned.trim().trim_matches('*').trim();
        let (crop, pest) = cleaned.split_once(" - ")?;
        let (crop, pest) = (crop.trim(), pest.trim());
        if crop.is_empty() || pest.is_empty() {
            return None;
        }
        Some(Self::new(crop, pest))
    }
}

impl fmt::Display for ExtractedTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.crop, self.pest)
    }
}

/// 解析模型返回的主题列表（每行一个），保持原顺序，不去重
pub fn parse_topic_lines(response: &str) -> Vec<ExtractedTopic> {
    response.lines().filter_map(ExtractedTopic::parse_line).collect()
}
