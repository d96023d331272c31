//! # Agri Article Writer
//!
//! 为农业记者生成古吉拉特语推广文章的交互式工具
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - 与远程 AI 服务交互，只暴露能力
//! - `LlmClient` - 搜索模型 + 生成模型，每次调用按传入的密钥新建客户端
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `text_extractor` - 按页提取 PDF / 文本文件
//! - `prompt_builder` - 调研、提取、写作、改写提示词
//! - `dose_normalizer` - 标签用量换算为每 10 升一泵
//! - `document_exporter` / `ArticleSaver` - 生成并保存 Word 文档
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义一次编辑会话的状态机
//! - `Session` - 会话状态（原文、主题、用量表、文章）
//! - `ArticleFlow` - 流程编排（原文 → 提取/选择 → 生成 → 改写 → 导出）
//!
//! ### ④ 交互层（App）
//! - `app` - 终端表单和操作菜单
//!
//! ## 模块结构

pub mod app;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use clients::{AiGateway, LlmClient, ResponseShape};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{ExtractedTopic, PesticideRecord, SourceText};
pub use workflow::{ApiKeys, ArticleFlow, Session, Stage, TopicOutcome};
