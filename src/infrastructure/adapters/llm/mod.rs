//! LLM Adapter - Gemini / Anthropic 客户端与路由网关

mod anthropic_client;
mod fake_llm_client;
mod gemini_client;
mod routing_gateway;

pub use anthropic_client::{AnthropicClient, AnthropicClientConfig};
pub use fake_llm_client::FakeLlmClient;
pub use gemini_client::{GeminiClient, GeminiClientConfig};
pub use routing_gateway::{Provider, RoutingLlmGateway};
