//! 会话状态
//!
//! 单个编辑会话的全部可变数据。只有 `ArticleFlow` 的步骤会修改它；
//! 每一步要么整体替换相关字段，要么失败且不做任何修改。

use std::fmt;

use crate::models::{ExtractedTopic, PesticideTable, ResearchBrief, SourceText};

/// 工作流所处阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Empty,
    SourceProvided,
    TopicsExtracted,
    DraftGenerated,
    Exported,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Empty => "waiting for source text",
            Stage::SourceProvided => "source text ready",
            Stage::TopicsExtracted => "topics extracted",
            Stage::DraftGenerated => "draft ready",
            Stage::Exported => "exported",
        };
        f.write_str(label)
    }
}

/// 会话状态
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) stage: Stage,
    pub(crate) source: Option<SourceText>,
    pub(crate) research: Option<ResearchBrief>,
    pub(crate) topics: Vec<ExtractedTopic>,
    pub(crate) selected_topic: Option<usize>,
    pub(crate) pesticides: PesticideTable,
    pub(crate) draft: String,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            stage: Stage::Empty,
            source: None,
            research: None,
            topics: Vec::new(),
            selected_topic: None,
            pesticides: PesticideTable::default(),
            draft: String::new(),
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn source(&self) -> Option<&SourceText> {
        self.source.as_ref()
    }

    pub fn research(&self) -> Option<&ResearchBrief> {
        self.research.as_ref()
    }

    pub fn topics(&self) -> &[ExtractedTopic] {
        &self.topics
    }

    pub fn selected_topic(&self) -> Option<&ExtractedTopic> {
        self.selected_topic.and_then(|i| self.topics.get(i))
    }

    pub fn pesticides(&self) -> &PesticideTable {
        &self.pesticides
    }

    /// 当前文章；尚未生成时为空字符串
    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn has_draft(&self) -> bool {
        !self.draft.trim().is_empty()
    }

    /// 替换原文，并清除由旧原文派生的数据（文章保留）
    pub(crate) fn replace_source(&mut self, source: SourceText, research: Option<ResearchBrief>) {
        self.source = Some(source);
        self.research = research;
        self.topics.clear();
        self.selected_topic = None;
        self.pesticides = PesticideTable::default();
        self.stage = Stage::SourceProvided;
    }
}
