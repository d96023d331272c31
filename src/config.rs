use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppError, AppResult, ConfigError};

/// 默认配置文件名（存在时才加载）
pub const DEFAULT_CONFIG_FILE: &str = "agri_writer.toml";

/// 程序配置
///
/// 只包含非敏感配置；API 密钥在每次会话中交互输入，不写入配置。
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    // --- 搜索模型配置 ---
    pub search_api_base_url: String,
    pub search_model_name: String,
    // --- 生成模型配置 ---
    pub generation_api_base_url: String,
    pub generation_model_name: String,
    /// 调研步骤的主题
    pub research_subject: String,
    /// 未选择主题时导出文档的标题
    pub article_title: String,
    /// 含调研来源时的导出文件名
    pub research_file_name: String,
    /// 普通文章的导出文件名
    pub article_file_name: String,
    /// 导出目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_api_base_url: "https://api.perplexity.ai".to_string(),
            search_model_name: "sonar".to_string(),
            generation_api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai"
                .to_string(),
            generation_model_name: "gemini-2.5-pro".to_string(),
            research_subject: "mites (કથીરી)".to_string(),
            article_title: "કથીરી જીવાત વ્યવસ્થાપન".to_string(),
            research_file_name: "Mite_Management_Article.docx".to_string(),
            article_file_name: "Sandesh_Agri_Article.docx".to_string(),
            output_dir: "output".to_string(),
            verbose_logging: false,
        }
    }
}

/// TOML 配置文件中的可选字段
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    search_api_base_url: Option<String>,
    search_model_name: Option<String>,
    generation_api_base_url: Option<String>,
    generation_model_name: Option<String>,
    research_subject: Option<String>,
    article_title: Option<String>,
    research_file_name: Option<String>,
    article_file_name: Option<String>,
    output_dir: Option<String>,
    verbose_logging: Option<bool>,
}

impl Config {
    /// 加载配置：默认值 → TOML 文件 → 环境变量
    pub fn load() -> AppResult<Self> {
        let explicit = std::env::var("AGRI_WRITER_CONFIG").ok().map(PathBuf::from);
        let config = match explicit {
            Some(path) => Self::default().merge_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::default().merge_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        Ok(config.merge_env())
    }

    /// 仅使用环境变量覆盖默认值
    pub fn from_env() -> Self {
        Self::default().merge_env()
    }

    /// 解析 TOML 文本并覆盖当前配置
    pub fn merge_toml(self, content: &str) -> AppResult<Self> {
        let file: FileConfig = toml::from_str(content).map_err(|e| {
            AppError::Config(ConfigError::Parse {
                path: String::new(),
                message: e.to_string(),
            })
        })?;

        Ok(Self {
            search_api_base_url: file.search_api_base_url.unwrap_or(self.search_api_base_url),
            search_model_name: file.search_model_name.unwrap_or(self.search_model_name),
            generation_api_base_url: file
                .generation_api_base_url
                .unwrap_or(self.generation_api_base_url),
            generation_model_name: file
                .generation_model_name
                .unwrap_or(self.generation_model_name),
            research_subject: file.research_subject.unwrap_or(self.research_subject),
            article_title: file.article_title.unwrap_or(self.article_title),
            research_file_name: file.research_file_name.unwrap_or(self.research_file_name),
            article_file_name: file.article_file_name.unwrap_or(self.article_file_name),
            output_dir: file.output_dir.unwrap_or(self.output_dir),
            verbose_logging: file.verbose_logging.unwrap_or(self.verbose_logging),
        })
    }

    fn merge_file(self, path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(ConfigError::Read {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        })?;
        self.merge_toml(&content).map_err(|e| match e {
            AppError::Config(ConfigError::Parse { message, .. }) => {
                AppError::Config(ConfigError::Parse {
                    path: path.display().to_string(),
                    message,
                })
            }
            other => other,
        })
    }

    fn merge_env(self) -> Self {
        Self {
            search_api_base_url: std::env::var("SEARCH_API_BASE_URL").unwrap_or(self.search_api_base_url),
            search_model_name: std::env::var("SEARCH_MODEL_NAME").unwrap_or(self.search_model_name),
            generation_api_base_url: std::env::var("GENERATION_API_BASE_URL").unwrap_or(self.generation_api_base_url),
            generation_model_name: std::env::var("GENERATION_MODEL_NAME").unwrap_or(self.generation_model_name),
            research_subject: std::env::var("RESEARCH_SUBJECT").unwrap_or(self.research_subject),
            article_title: std::env::var("ARTICLE_TITLE").unwrap_or(self.article_title),
            research_file_name: self.research_file_name,
            article_file_name: self.article_file_name,
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(self.output_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_toml_overrides_only_given_fields() {
        let config = Config::default()
            .merge_toml(
                r#"
                generation_model_name = "gemini-2.5-flash"
                output_dir = "articles"
                verbose_logging = true
                "#,
            )
            .unwrap();

        assert_eq!(config.generation_model_name, "gemini-2.5-flash");
        assert_eq!(config.output_dir, "articles");
        assert!(config.verbose_logging);
        assert_eq!(config.search_model_name, "sonar");
        assert_eq!(config.article_file_name, "Sandesh_Agri_Article.docx");
    }

    #[test]
    fn test_merge_toml_rejects_bad_types() {
        let result = Config::default().merge_toml("verbose_logging = \"maybe\"");
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::Parse { .. }))
        ));
    }
}
