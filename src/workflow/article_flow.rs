//! 文章处理流程 - 流程层
//!
//! 核心职责：根据用户操作决定下一步，构建提示词，调用 AI，更新会话状态
//!
//! 流程顺序：
//! 1. 提供原文（粘贴 / 上传 / 调研）
//! 2. 提取主题 → 选择主题（可选）；提取农药用量 → 勾选记录（可选）
//! 3. 生成文章
//! 4. 按建议改写（可重复）
//! 5. 导出 Word（可重复）
//!
//! 所有凭据和输入检查都在远程调用之前完成；远程调用失败时会话保持不变。

use std::path::PathBuf;

use tracing::{info, warn};

use crate::clients::{AiGateway, ResponseShape};
use crate::config::Config;
use crate::error::{AppError, AppResult, Credential, MissingInput};
use crate::models::{parse_topic_lines, PesticideTable, ResearchBrief, SourceText};
use crate::services::document_exporter::{build_docx, ExportedArticle, DOCX_CONTENT_TYPE};
use crate::services::prompt_builder::{self, DraftingInput};
use crate::services::{dose_normalizer, text_extractor};
use crate::utils::truncate_text;
use crate::workflow::session::{Session, Stage};

/// 表单中的两个密钥
///
/// 只在调用期间借给工作流，不会存入会话。
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub search: String,
    pub generation: String,
}

impl ApiKeys {
    pub fn new(search: impl Into<String>, generation: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            generation: generation.into(),
        }
    }

    fn require(&self, credential: Credential) -> AppResult<&str> {
        let key = match credential {
            Credential::Search => self.search.trim(),
            Credential::Generation => self.generation.trim(),
        };
        if key.is_empty() {
            Err(AppError::MissingCredential(credential))
        } else {
            Ok(key)
        }
    }
}

/// 主题提取结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopicOutcome {
    /// 找到若干主题
    Found(usize),
    /// 模型没有返回符合格式的主题，阶段不变
    NoneFound,
}

/// 导出相关的设置
#[derive(Debug, Clone)]
struct ExportSettings {
    default_title: String,
    research_file_name: String,
    article_file_name: String,
}

/// 文章处理流程
///
/// - 编排完整的编辑流程
/// - 不持有会话状态，每个步骤显式接收 `&mut Session`
/// - 只依赖 AI 能力（`AiGateway`）和业务能力（services）
pub struct ArticleFlow<G> {
    gateway: G,
    research_subject: String,
    export: ExportSettings,
}

impl<G: AiGateway> ArticleFlow<G> {
    /// 创建新的流程
    pub fn new(gateway: G, config: &Config) -> Self {
        Self {
            gateway,
            research_subject: config.research_subject.clone(),
            export: ExportSettings {
                default_title: config.article_title.clone(),
                research_file_name: config.research_file_name.clone(),
                article_file_name: config.article_file_name.clone(),
            },
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// 使用粘贴的文本作为原文
    pub fn provide_text(&self, session: &mut Session, text: &str) -> AppResult<()> {
        let source =
            SourceText::new(text).ok_or(AppError::EmptyInput(MissingInput::SourceText))?;
        info!("📝 已接收粘贴文本（{} 字符）", source.char_count());
        session.replace_source(source, None);
        Ok(())
    }

    /// 从上传的文件中提取原文
    pub async fn provide_files(&self, session: &mut Session, paths: &[PathBuf]) -> AppResult<()> {
        let source = text_extractor::extract_files(paths).await?;
        info!(
            "📄 已从 {} 个文件提取原文（{} 字符）",
            paths.len(),
            source.char_count()
        );
        session.replace_source(source, None);
        Ok(())
    }

    /// 通过搜索模型调研，结果作为原文
    pub async fn research(&self, session: &mut Session, keys: &ApiKeys) -> AppResult<()> {
        let api_key = keys.require(Credential::Search)?;

        info!("🔍 正在搜索 NAU、AAU 和 Krushi Prabhat 的最新资料...");
        let prompt = prompt_builder::research_prompt(&self.research_subject);
        let response = self.gateway.search(api_key, &prompt).await?;

        let source = SourceText::new(response.as_str())
            .ok_or(AppError::EmptyInput(MissingInput::SourceText))?;
        let brief = ResearchBrief::from_response(response);
        info!(
            "✓ 调研完成，来源: {}",
            brief.source_url.as_deref().unwrap_or("（未找到链接）")
        );
        session.replace_source(source, Some(brief));
        Ok(())
    }

    /// 提取 `作物 - 害虫` 主题
    pub async fn extract_topics(
        &self,
        session: &mut Session,
        keys: &ApiKeys,
    ) -> AppResult<TopicOutcome> {
        let api_key = keys.require(Credential::Generation)?;
        let source = session
            .source
            .as_ref()
            .ok_or(AppError::EmptyInput(MissingInput::SourceText))?;

        info!("🧭 正在提取主题...");
        let prompt = prompt_builder::topic_extraction_prompt(source);
        let response = self
            .gateway
            .generate(api_key, &prompt, ResponseShape::Text)
            .await?;

        let topics = parse_topic_lines(&response);
        if topics.is_empty() {
            warn!(
                "⚠️ 没有解析到主题，模型返回: {}",
                truncate_text(&response, 80)
            );
            return Ok(TopicOutcome::NoneFound);
        }

        info!("✓ 提取到 {} 个主题", topics.len());
        let count = topics.len();
        session.topics = topics;
        session.selected_topic = None;
        // 已有文章时保持原阶段，不回退
        if matches!(session.stage, Stage::Empty | Stage::SourceProvided) {
            session.stage = Stage::TopicsExtracted;
        }
        Ok(TopicOutcome::Found(count))
    }

    /// 选择文章主题
    pub fn select_topic(&self, session: &mut Session, index: usize) -> AppResult<()> {
        if index >= session.topics.len() {
            return Err(AppError::InvalidSelection {
                index,
                len: session.topics.len(),
            });
        }
        session.selected_topic = Some(index);
        info!("🎯 已选择主题: {}", session.topics[index]);
        Ok(())
    }

    /// 提取农药标签用量并换算为每泵用量
    ///
    /// 成功时替换整张表；JSON 无法解析时表格保持不变。
    pub async fn extract_doses(&self, session: &mut Session, keys: &ApiKeys) -> AppResult<usize> {
        let api_key = keys.require(Credential::Generation)?;
        let source = session
            .source
            .as_ref()
            .ok_or(AppError::EmptyInput(MissingInput::SourceText))?;

        info!("🧪 正在提取农药用量...");
        let prompt = prompt_builder::label_claim_extraction_prompt(source);
        let response = self
            .gateway
            .generate(api_key, &prompt, ResponseShape::Json)
            .await?;

        let records = dose_normalizer::parse_label_claims(&response).map_err(|e| {
            warn!("⚠️ 用量数据解析失败: {}", e);
            e
        })?;

        let count = records.len();
        info!("✓ 得到 {} 条有效用量记录", count);
        session.pesticides = PesticideTable::from_records(records);
        Ok(count)
    }

    /// 勾选或取消某条用量记录
    pub fn set_record_selection(
        &self,
        session: &mut Session,
        index: usize,
        selected: bool,
    ) -> AppResult<()> {
        if session.pesticides.set_selected(index, selected) {
            Ok(())
        } else {
            Err(AppError::InvalidSelection {
                index,
                len: session.pesticides.len(),
            })
        }
    }

    /// 生成文章
    pub async fn generate(&self, session: &mut Session, keys: &ApiKeys) -> AppResult<()> {
        let api_key = keys.require(Credential::Generation)?;
        let source = session
            .source
            .as_ref()
            .ok_or(AppError::EmptyInput(MissingInput::SourceText))?;

        let topic = session.selected_topic();
        if !session.topics.is_empty() && topic.is_none() {
            return Err(AppError::EmptyInput(MissingInput::TopicSelection));
        }

        let doses = session.pesticides.selected();
        info!(
            "✍️ 正在生成古吉拉特语文章（主题: {}，用量记录: {} 条）...",
            topic.map(|t| t.to_string()).unwrap_or_else(|| "无".to_string()),
            doses.len()
        );

        let prompt = prompt_builder::drafting_prompt(&DraftingInput {
            source,
            topic,
            doses: &doses,
        });
        let draft = self
            .gateway
            .generate(api_key, &prompt, ResponseShape::Text)
            .await?;
        let draft = non_empty_article(draft)?;

        info!("✓ 文章生成完成（{} 字符）", draft.chars().count());
        session.draft = draft;
        session.stage = Stage::DraftGenerated;
        Ok(())
    }

    /// 根据建议改写文章
    pub async fn rewrite(
        &self,
        session: &mut Session,
        keys: &ApiKeys,
        suggestion: &str,
    ) -> AppResult<()> {
        let api_key = keys.require(Credential::Generation)?;
        if !session.has_draft() {
            return Err(AppError::EmptyInput(MissingInput::Draft));
        }
        let suggestion = suggestion.trim();
        if suggestion.is_empty() {
            return Err(AppError::EmptyInput(MissingInput::Suggestion));
        }

        info!("🔁 正在按建议改写: {}", truncate_text(suggestion, 60));
        let prompt = prompt_builder::rewrite_prompt(&session.draft, suggestion);
        let draft = self
            .gateway
            .generate(api_key, &prompt, ResponseShape::Text)
            .await?;
        let draft = non_empty_article(draft)?;

        info!("✓ 改写完成（{} 字符）", draft.chars().count());
        session.draft = draft;
        session.stage = Stage::DraftGenerated;
        Ok(())
    }

    /// 导出 Word 文档；不会修改文章
    pub fn export(&self, session: &mut Session) -> AppResult<ExportedArticle> {
        if !session.has_draft() {
            return Err(AppError::EmptyInput(MissingInput::Draft));
        }

        let title = session
            .selected_topic()
            .map(|t| t.to_string())
            .unwrap_or_else(|| self.export.default_title.clone());
        let source = session.research.as_ref().map(|brief| brief.source_label());
        let file_name = if session.research.is_some() {
            &self.export.research_file_name
        } else {
            &self.export.article_file_name
        };

        let bytes = build_docx(&title, &session.draft, source)?;
        info!("📄 已导出 {}（{} 字节）", file_name, bytes.len());

        session.stage = Stage::Exported;
        Ok(ExportedArticle {
            file_name: file_name.clone(),
            content_type: DOCX_CONTENT_TYPE,
            bytes,
        })
    }
}

/// 空白回复不能作为文章，会话保持不变
fn non_empty_article(reply: String) -> AppResult<String> {
    if reply.trim().is_empty() {
        warn!("⚠️ 模型返回了空文章");
        return Err(AppError::malformed("AI service returned an empty article"));
    }
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_article_is_rejected() {
        assert!(matches!(
            non_empty_article(" \n ".to_string()),
            Err(AppError::MalformedResponse { .. })
        ));
        assert_eq!(non_empty_article("લેખ".to_string()).unwrap(), "લેખ");
    }

    #[test]
    fn test_api_keys_require_non_blank() {
        let keys = ApiKeys::new("  ", "gemini-key");
        assert!(matches!(
            keys.require(Credential::Search),
            Err(AppError::MissingCredential(Credential::Search))
        ));
        assert_eq!(keys.require(Credential::Generation).unwrap(), "gemini-key");
    }
}
