use std::fmt;

use thiserror::Error;

/// 应用程序错误类型
///
/// 每个工作流步骤都返回 `AppResult`，由交互层统一展示给用户。
#[derive(Debug, Error)]
pub enum AppError {
    /// 缺少 API 密钥（不会发起远程调用）
    #[error("Missing API key: please provide the {0} key")]
    MissingCredential(Credential),
    /// 缺少必需的输入（不会发起远程调用）
    #[error("Missing input: {0}")]
    EmptyInput(MissingInput),
    /// 远程 AI 服务调用失败
    #[error("{0}")]
    Gateway(#[from] GatewayError),
    /// 结构化响应无法解析
    #[error("Could not parse the structured response: {reason}")]
    MalformedResponse { reason: String },
    /// 选择的序号超出范围
    #[error("Selection {index} is out of range (0..{len})")]
    InvalidSelection { index: usize, len: usize },
    /// 文本提取错误
    #[error("{0}")]
    Extract(#[from] ExtractError),
    /// 文档导出错误
    #[error("{0}")]
    Export(#[from] ExportError),
    /// 文件操作错误
    #[error("{0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("{0}")]
    Config(#[from] ConfigError),
}

/// 需要的凭据种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    /// 搜索模型（Perplexity）
    Search,
    /// 生成模型（Gemini）
    Generation,
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Search => write!(f, "search (Perplexity)"),
            Credential::Generation => write!(f, "generation (Gemini)"),
        }
    }
}

/// 缺失的输入种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingInput {
    /// 没有原始文本
    SourceText,
    /// 上传的文件中没有可提取的文本
    NoExtractableText,
    /// 已提取主题但尚未选择
    TopicSelection,
    /// 还没有生成文章
    Draft,
    /// 修改建议为空
    Suggestion,
    /// 没有选择任何文件
    Files,
}

impl fmt::Display for MissingInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingInput::SourceText => write!(f, "please paste or upload some source text first"),
            MissingInput::NoExtractableText => {
                write!(f, "no extractable text was found in the uploaded files")
            }
            MissingInput::TopicSelection => write!(f, "please select a topic first"),
            MissingInput::Draft => write!(f, "please generate an article first"),
            MissingInput::Suggestion => write!(f, "please enter a suggestion"),
            MissingInput::Files => write!(f, "please choose at least one file"),
        }
    }
}

/// 远程 AI 服务错误
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 请求构建失败
    #[error("Could not build the request for {model}: {message}")]
    InvalidRequest { model: String, message: String },
    /// API 调用失败（网络、认证、配额）
    #[error("AI service call failed ({model}): {message}")]
    CallFailed { model: String, message: String },
    /// 返回内容为空
    #[error("AI service returned no content ({model})")]
    EmptyContent { model: String },
}

/// 文本提取错误
#[derive(Debug, Error)]
pub enum ExtractError {
    /// 读取文件失败
    #[error("Could not read {path}: {message}")]
    ReadFailed { path: String, message: String },
    /// PDF 解析失败
    #[error("Could not parse PDF {path}: {message}")]
    PdfParseFailed { path: String, message: String },
    /// 文本文件不是 UTF-8
    #[error("{path} is not valid UTF-8 text")]
    InvalidUtf8 { path: String },
    /// 不支持的文件类型
    #[error("Unsupported file type: {path}")]
    UnsupportedFormat { path: String },
}

/// 文档导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 打包 docx 失败
    #[error("Could not build the Word document: {0}")]
    PackFailed(String),
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 创建目录失败
    #[error("Could not create directory {path}: {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("Could not write {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("Could not read config file {path}: {message}")]
    Read { path: String, message: String },
    /// 配置文件解析失败
    #[error("Could not parse config file {path}: {message}")]
    Parse { path: String, message: String },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建结构化响应解析错误
    pub fn malformed(reason: impl fmt::Display) -> Self {
        AppError::MalformedResponse {
            reason: reason.to_string(),
        }
    }

    /// 是否为调用前即可发现的输入问题（未产生任何副作用）
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            AppError::MissingCredential(_)
                | AppError::EmptyInput(_)
                | AppError::InvalidSelection { .. }
        )
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
