//! 交互式终端界面
//!
//! 相当于原来的网页表单：密钥输入（隐藏）、粘贴区、文件上传、主题选择、
//! 用量记录勾选、修改建议输入和各个操作按钮。每个操作同步等待一次远程调用。

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Editor, Input, MultiSelect, Password, Select};
use tracing::{error, info, warn};

use crate::clients::LlmClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::services::ArticleSaver;
use crate::utils::logging;
use crate::workflow::{ApiKeys, ArticleFlow, Session, Stage, TopicOutcome};

/// 菜单操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    SetKeys,
    PasteText,
    UploadFiles,
    Research,
    ExtractTopics,
    SelectTopic,
    ExtractDoses,
    SelectRecords,
    Generate,
    Rewrite,
    ShowDraft,
    Export,
    Exit,
}

impl MenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::SetKeys => "🔑 Set API keys",
            MenuAction::PasteText => "📝 Paste source text",
            MenuAction::UploadFiles => "📄 Upload PDF / text files",
            MenuAction::Research => "🔍 Research latest advisories (search)",
            MenuAction::ExtractTopics => "🧭 Extract crop - pest topics",
            MenuAction::SelectTopic => "🎯 Choose topic",
            MenuAction::ExtractDoses => "🧪 Extract pesticide doses",
            MenuAction::SelectRecords => "☑️  Choose dose records for the article",
            MenuAction::Generate => "✍️  Generate Gujarati article",
            MenuAction::Rewrite => "🔁 Rewrite with a suggestion",
            MenuAction::ShowDraft => "👀 Show current article",
            MenuAction::Export => "💾 Export Word document",
            MenuAction::Exit => "🛑 Exit",
        }
    }
}

/// 当前状态下可用的操作
pub fn available_actions(session: &Session) -> Vec<MenuAction> {
    let mut actions = vec![
        MenuAction::SetKeys,
        MenuAction::PasteText,
        MenuAction::UploadFiles,
        MenuAction::Research,
    ];

    if session.source().is_some() {
        actions.push(MenuAction::ExtractTopics);
        if !session.topics().is_empty() {
            actions.push(MenuAction::SelectTopic);
        }
        actions.push(MenuAction::ExtractDoses);
        if !session.pesticides().is_empty() {
            actions.push(MenuAction::SelectRecords);
        }
        actions.push(MenuAction::Generate);
    }

    if session.has_draft() {
        actions.push(MenuAction::Rewrite);
        actions.push(MenuAction::ShowDraft);
        actions.push(MenuAction::Export);
    }

    actions.push(MenuAction::Exit);
    actions
}

/// 应用主结构
pub struct App {
    flow: ArticleFlow<LlmClient>,
    saver: ArticleSaver,
    session: Session,
    keys: ApiKeys,
    theme: ColorfulTheme,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Self {
        logging::log_startup(&config);

        let client = LlmClient::new(&config);
        info!("🤖 文章生成模型: {}", client.generation_model());

        Self {
            flow: ArticleFlow::new(client, &config),
            saver: ArticleSaver::with_dir(&config.output_dir),
            session: Session::new(),
            keys: ApiKeys::default(),
            theme: ColorfulTheme::default(),
        }
    }

    /// 运行交互主循环
    pub async fn run(mut self) -> Result<()> {
        println!();
        println!("{}", style("🕷️ Agricultural Extension Article Generator").bold());
        println!("Generate Gujarati extension articles from research, PDFs or pasted text.");

        loop {
            println!();
            println!("{} {}", style("Status:").bold(), style(self.session.stage()).cyan());

            let actions = available_actions(&self.session);
            let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
            let choice = Select::with_theme(&self.theme)
                .with_prompt("What would you like to do?")
                .items(&labels)
                .default(0)
                .interact()?;

            match actions[choice] {
                MenuAction::Exit => {
                    println!("{}", style("👋 Goodbye!").blue());
                    break;
                }
                action => self.handle(action).await?,
            }
        }

        Ok(())
    }

    /// 处理一个菜单操作
    ///
    /// 只有终端交互本身的错误会向上传播；步骤失败只展示，不会结束会话。
    async fn handle(&mut self, action: MenuAction) -> Result<()> {
        match action {
            MenuAction::SetKeys => self.prompt_keys()?,
            MenuAction::PasteText => {
                let text = self.read_pasted_text()?;
                let result = self.flow.provide_text(&mut self.session, &text);
                report(result);
            }
            MenuAction::UploadFiles => {
                let paths = self.prompt_paths()?;
                busy("Reading files...");
                let result = self.flow.provide_files(&mut self.session, &paths).await;
                report(result);
            }
            MenuAction::Research => {
                busy("Searching NAU, AAU and Krushi Prabhat for the latest advisories...");
                let result = self.flow.research(&mut self.session, &self.keys).await;
                if report(result).is_some() {
                    if let Some(brief) = self.session.research() {
                        println!("{}", style("Underlying research & sources:").bold());
                        println!("{}", brief.text);
                    }
                }
            }
            MenuAction::ExtractTopics => {
                busy("Extracting topics...");
                let result = self.flow.extract_topics(&mut self.session, &self.keys).await;
                match report(result) {
                    Some(TopicOutcome::Found(_)) => self.prompt_topic()?,
                    Some(TopicOutcome::NoneFound) => {
                        println!("{}", style("⚠️ No crop - pest topics could be identified.").yellow());
                    }
                    None => {}
                }
            }
            MenuAction::SelectTopic => self.prompt_topic()?,
            MenuAction::ExtractDoses => {
                busy("Extracting label-claim doses...");
                let result = self.flow.extract_doses(&mut self.session, &self.keys).await;
                match report(result) {
                    Some(0) => {
                        println!("{}", style("⚠️ No usable dose records were found.").yellow());
                    }
                    Some(_) => self.prompt_records()?,
                    None => {}
                }
            }
            MenuAction::SelectRecords => self.prompt_records()?,
            MenuAction::Generate => {
                busy("Drafting the Gujarati article...");
                let result = self.flow.generate(&mut self.session, &self.keys).await;
                if report(result).is_some() {
                    self.print_draft();
                }
            }
            MenuAction::Rewrite => {
                let suggestion: String = Input::with_theme(&self.theme)
                    .with_prompt("Suggestion for the rewrite")
                    .allow_empty(true)
                    .interact_text()?;
                busy("Rewriting the article...");
                let result = self
                    .flow
                    .rewrite(&mut self.session, &self.keys, &suggestion)
                    .await;
                if report(result).is_some() {
                    self.print_draft();
                }
            }
            MenuAction::ShowDraft => self.print_draft(),
            MenuAction::Export => {
                let exported = self.flow.export(&mut self.session);
                if let Some(article) = report(exported) {
                    let saved = self.saver.save(&article).await;
                    if let Some(path) = report(saved) {
                        println!(
                            "{} {}",
                            style("📄 Saved Word document:").green(),
                            path.display()
                        );
                    }
                }
            }
            MenuAction::Exit => {}
        }
        Ok(())
    }

    fn prompt_keys(&mut self) -> Result<()> {
        let search = Password::with_theme(&self.theme)
            .with_prompt("Perplexity API key (leave empty to skip)")
            .allow_empty_password(true)
            .interact()?;
        let generation = Password::with_theme(&self.theme)
            .with_prompt("Gemini API key")
            .allow_empty_password(true)
            .interact()?;

        self.keys = ApiKeys::new(search, generation);
        info!(
            "🔑 已更新密钥（搜索: {}，生成: {}）",
            present(&self.keys.search),
            present(&self.keys.generation)
        );
        Ok(())
    }

    /// 优先用 $EDITOR 粘贴；编辑器不可用时从标准输入读取，单独一行 `.` 结束
    fn read_pasted_text(&self) -> Result<String> {
        match Editor::new().extension(".txt").edit("") {
            Ok(Some(text)) => return Ok(text),
            Ok(None) => return Ok(String::new()),
            Err(e) => {
                error!("无法打开编辑器: {}", e);
            }
        }

        println!("Paste the source text, then enter a single '.' on its own line:");
        let mut text = String::new();
        for line in std::io::stdin().lock().lines() {
            let line = line?;
            if line.trim() == "." {
                break;
            }
            text.push_str(&line);
            text.push('\n');
        }
        Ok(text)
    }

    fn prompt_paths(&self) -> Result<Vec<PathBuf>> {
        let input: String = Input::with_theme(&self.theme)
            .with_prompt("File paths (comma-separated)")
            .allow_empty(true)
            .interact_text()?;

        Ok(input
            .split(',')
            .map(|p| p.trim().trim_matches('"'))
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .collect())
    }

    fn prompt_topic(&mut self) -> Result<()> {
        let labels: Vec<String> = self.session.topics().iter().map(|t| t.to_string()).collect();
        if labels.is_empty() {
            return Ok(());
        }

        let index = Select::with_theme(&self.theme)
            .with_prompt("Choose the topic for the article")
            .items(&labels)
            .default(0)
            .interact()?;
        report(self.flow.select_topic(&mut self.session, index));
        Ok(())
    }

    fn prompt_records(&mut self) -> Result<()> {
        let rows = self.session.pesticides().rows();
        if rows.is_empty() {
            return Ok(());
        }

        println!("{}", style("Chemical dose per 10-litre pump:").bold());
        for (i, row) in rows.iter().enumerate() {
            println!("  {}. {}", i + 1, row.record.summary());
        }

        let labels: Vec<String> = rows.iter().map(|row| row.record.summary()).collect();
        let defaults: Vec<bool> = rows.iter().map(|row| row.selected).collect();
        let chosen = MultiSelect::with_theme(&self.theme)
            .with_prompt("Select the records to include (space to toggle)")
            .items(&labels)
            .defaults(&defaults)
            .interact()?;

        for index in 0..labels.len() {
            report(
                self.flow
                    .set_record_selection(&mut self.session, index, chosen.contains(&index)),
            );
        }
        Ok(())
    }

    fn print_draft(&self) {
        println!();
        println!("{}", style("Generated Gujarati article").bold().underlined());
        println!("{}", self.session.draft());
        if self.session.stage() == Stage::Exported {
            println!("{}", style("(already exported; export again to save changes)").dim());
        }
    }
}

/// 显示忙碌提示
fn busy(message: &str) {
    println!("{} {}", style("⏳").yellow(), message);
}

/// 展示步骤结果；失败时原样显示错误信息
///
/// 输入不完整只是提示，远程调用或解析失败才记为错误。
fn report<T>(result: AppResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_precondition() => {
            warn!("步骤未执行: {}", e);
            println!("{} {}", style("⚠️").yellow(), style(&e).yellow());
            None
        }
        Err(e) => {
            error!("步骤失败: {}", e);
            println!("{} {}", style("❌").red(), style(&e).red());
            None
        }
    }
}

fn present(key: &str) -> &'static str {
    if key.trim().is_empty() {
        "未设置"
    } else {
        "已设置"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, MissingInput};
    use crate::models::SourceText;

    #[test]
    fn test_report_passes_values_and_swallows_errors() {
        assert_eq!(report::<u32>(Ok(3)), Some(3));
        assert_eq!(
            report::<()>(Err(AppError::EmptyInput(MissingInput::Suggestion))),
            None
        );
        assert_eq!(report::<()>(Err(AppError::malformed("eof"))), None);
    }

    #[test]
    fn test_empty_session_offers_only_inputs() {
        let actions = available_actions(&Session::new());
        assert_eq!(
            actions,
            vec![
                MenuAction::SetKeys,
                MenuAction::PasteText,
                MenuAction::UploadFiles,
                MenuAction::Research,
                MenuAction::Exit,
            ]
        );
    }

    #[test]
    fn test_source_enables_generation() {
        let mut session = Session::new();
        session.replace_source(SourceText::new("mite advisory").unwrap(), None);

        let actions = available_actions(&session);
        assert!(actions.contains(&MenuAction::ExtractTopics));
        assert!(actions.contains(&MenuAction::Generate));
        assert!(!actions.contains(&MenuAction::SelectTopic));
        assert!(!actions.contains(&MenuAction::Export));
    }

    #[test]
    fn test_draft_enables_rewrite_and_export() {
        let mut session = Session::new();
        session.replace_source(SourceText::new("mite advisory").unwrap(), None);
        session.draft = "લેખ".to_string();
        session.stage = Stage::DraftGenerated;

        let actions = available_actions(&session);
        assert!(actions.contains(&MenuAction::Rewrite));
        assert!(actions.contains(&MenuAction::Export));
        assert_eq!(actions.last(), Some(&MenuAction::Exit));
    }
}
