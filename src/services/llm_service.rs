//! LLM 服务 - 业务能力层
//!
//! 只负责"把请求发给模型"这一能力，不关心评分流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Gemini 的 OpenAI 兼容端点）

use std::future::Future;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{CreateChatCompletionRequest, CreateChatCompletionResponse},
    Client,
};
use backoff::ExponentialBackoffBuilder;
use tracing::{debug, warn};

use crate::config::Config;

/// 模型调用端口
///
/// 评分流程只依赖这个 trait，测试中用假实现替换真实网络调用
pub trait CompletionBackend: Send + Sync {
    fn complete(
        &self,
        request: CreateChatCompletionRequest,
    ) -> impl Future<Output = Result<CreateChatCompletionResponse, OpenAIError>> + Send;
}

/// 基于 OpenAI 兼容接口的 LLM 服务
pub struct LlmService {
    client: Client<OpenAIConfig>,
}

impl LlmService {
    /// 创建新的 LLM 服务
    ///
    /// 请求失败不自动重试，由用户决定是否重新提交
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(std::time::Duration::ZERO))
            .build();

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(no_retry);

        Ok(Self { client })
    }
}

impl CompletionBackend for LlmService {
    async fn complete(
        &self,
        request: CreateChatCompletionRequest,
    ) -> Result<CreateChatCompletionResponse, OpenAIError> {
        debug!("调用 LLM API，模型: {}", request.model);

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            e
        })?;

        debug!("LLM API 调用成功，候选数: {}", response.choices.len());

        Ok(response)
    }
}
