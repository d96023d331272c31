//! AI 服务客户端
//!
//! 封装搜索模型和生成模型的调用逻辑
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - Perplexity 与 Gemini 都提供兼容 OpenAI 的接口
//! - 每次调用都用调用方提供的密钥新建客户端，不缓存

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::GatewayError;

/// 生成模型的返回形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// 普通文本
    Text,
    /// JSON 对象模式（不校验内容结构）
    Json,
}

/// 远程 AI 能力
///
/// 工作流只依赖这个 trait，测试中可以替换为脚本化实现。
#[allow(async_fn_in_trait)]
pub trait AiGateway {
    /// 调用搜索模型
    async fn search(&self, api_key: &str, query: &str) -> Result<String, GatewayError>;

    /// 调用生成模型
    async fn generate(
        &self,
        api_key: &str,
        prompt: &str,
        shape: ResponseShape,
    ) -> Result<String, GatewayError>;
}

/// 单个模型端点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEndpoint {
    pub api_base_url: String,
    pub model_name: String,
}

/// 基于 OpenAI 兼容接口的客户端
#[derive(Debug, Clone)]
pub struct LlmClient {
    search: ModelEndpoint,
    generation: ModelEndpoint,
}

impl LlmClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> Self {
        Self {
            search: ModelEndpoint {
                api_base_url: config.search_api_base_url.clone(),
                model_name: config.search_model_name.clone(),
            },
            generation: ModelEndpoint {
                api_base_url: config.generation_api_base_url.clone(),
                model_name: config.generation_model_name.clone(),
            },
        }
    }

    pub fn generation_model(&self) -> &str {
        &self.generation.model_name
    }

    /// 发送单条用户消息
    ///
    /// # 参数
    /// - `endpoint`: 目标端点
    /// - `api_key`: 本次调用使用的密钥
    /// - `user_message`: 用户消息内容
    /// - `shape`: 返回形式
    ///
    /// # 返回
    /// 返回去掉首尾空白的响应内容
    async fn chat(
        endpoint: &ModelEndpoint,
        api_key: &str,
        user_message: &str,
        shape: ResponseShape,
    ) -> Result<String, GatewayError> {
        let model = endpoint.model_name.as_str();
        debug!("调用 AI API，模型: {}", model);
        debug!("用户消息长度: {} 字符", user_message.chars().count());

        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(&endpoint.api_base_url);
        let client = Client::with_config(openai_config);

        let invalid = |e: async_openai::error::OpenAIError| GatewayError::InvalidRequest {
            model: model.to_string(),
            message: e.to_string(),
        };

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()
            .map_err(invalid)?;

        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(model)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)]);
        if shape == ResponseShape::Json {
            request.response_format(ResponseFormat::JsonObject);
        }
        let request = request.build().map_err(invalid)?;

        let response = client.chat().create(request).await.map_err(|e| {
            warn!("AI API 调用失败: {}", e);
            GatewayError::CallFailed {
                model: model.to_string(),
                message: e.to_string(),
            }
        })?;

        debug!("AI API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| GatewayError::EmptyContent {
                model: model.to_string(),
            })?;

        Ok(content)
    }
}

impl AiGateway for LlmClient {
    async fn search(&self, api_key: &str, query: &str) -> Result<String, GatewayError> {
        Self::chat(&self.search, api_key, query, ResponseShape::Text).await
    }

    async fn generate(
        &self,
        api_key: &str,
        prompt: &str,
        shape: ResponseShape,
    ) -> Result<String, GatewayError> {
        Self::chat(&self.generation, api_key, prompt, shape).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints_follow_config() {
        let config = Config {
            generation_model_name: "gemini-2.5-flash".to_string(),
            ..Config::default()
        };
        let client = LlmClient::new(&config);

        assert_eq!(client.generation_model(), "gemini-2.5-flash");
        assert_eq!(client.search.model_name, "sonar");
        assert_eq!(client.search.api_base_url, "https://api.perplexity.ai");
    }

    /// 测试生成模型连通性
    ///
    /// 运行方式：
    /// ```bash
    /// GEMINI_API_KEY=... cargo test test_generate_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_generate_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let api_key = std::env::var("GEMINI_API_KEY").expect("GEMINI_API_KEY 未设置");
        let client = LlmClient::new(&Config::default());

        let response = client
            .generate(&api_key, "Reply with the single word: ok", ResponseShape::Text)
            .await
            .expect("生成模型调用失败");

        println!("LLM 响应: {}", response);
        assert!(!response.is_empty());
    }
}
