pub mod llm_client;

pub use llm_client::{AiGateway, LlmClient, ModelEndpoint, ResponseShape};
