//! 评分服务 - 业务能力层
//!
//! 负责一次完整的评分请求：
//! 1. 校验题型与图片组数量
//! 2. 构建系统提示词 + 有序的图文内容 + JSON Schema 约束
//! 3. 调用模型（只调用一次，不重试）
//! 4. 把返回内容解析为 [`GradingResult`]

use std::sync::OnceLock;

use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
    ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
    ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs, CreateChatCompletionResponse, ImageDetail, ImageUrl,
    ResponseFormat, ResponseFormatJsonSchema,
};
use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{GradingError, InputError};
use crate::models::{EncodedImage, GradingResult, ImagePair, TaskType};
use crate::services::llm_service::CompletionBackend;
use crate::services::{rubric, schema};
use crate::utils::logging::truncate_text;

/// 诊断日志中保留的原始响应长度
const RAW_LOG_LIMIT: usize = 500;

fn code_fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^```(?:json)?\s*(?P<body>.*?)\s*```$").expect("代码块正则表达式无效")
    })
}

/// 评分服务
///
/// 职责：
/// - 只处理一次评分请求
/// - 不持有任何请求之间的状态
/// - 不关心界面步骤和进度提示
pub struct GradingService<B> {
    backend: B,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
}

impl<B: CompletionBackend> GradingService<B> {
    /// 创建新的评分服务
    pub fn new(backend: B, config: &Config) -> Self {
        Self {
            backend,
            model_name: config.llm_model_name.clone(),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 对一组作文图片进行评分
    ///
    /// # 参数
    /// - `task_type`: 题型，决定需要几组图片
    /// - `images`: 按提交顺序排列的图片组
    ///
    /// # 返回
    /// 返回模型给出的评分结果；任何一步失败都不会返回部分结果
    pub async fn grade(
        &self,
        task_type: TaskType,
        images: &[ImagePair],
    ) -> Result<GradingResult, GradingError> {
        let request = self.build_request(task_type, images)?;

        info!(
            "🤖 开始评分: 题型 {}，{} 组图片，模型 {}",
            task_type,
            images.len(),
            self.model_name
        );

        let response = self
            .backend
            .complete(request)
            .await
            .map_err(|e| GradingError::transport(&self.model_name, e))?;

        let result = self.parse_response(response)?;

        if result.tasks.len() != images.len() {
            warn!(
                "⚠️ 模型返回了 {} 道题的评分，提交了 {} 组图片",
                result.tasks.len(),
                images.len()
            );
        }
        for task in result.tasks.iter().filter(|t| !t.scores.is_consistent()) {
            warn!(
                "⚠️ {} 的原始总分 {} 与三项之和 {} 不一致",
                task.task_name,
                task.scores.total_raw,
                task.scores.dimension_sum()
            );
        }

        info!(
            "✓ 评分完成: 量表分 {} ({})",
            result.total_scale_score, result.overall_cefr_level
        );

        Ok(result)
    }

    /// 构建请求
    ///
    /// 用户消息的内容顺序固定为：说明文字，然后每道题依次为
    /// `Task i Prompt:`、题目图片、`Task i Answer:`、作答图片
    pub fn build_request(
        &self,
        task_type: TaskType,
        images: &[ImagePair],
    ) -> Result<CreateChatCompletionRequest, GradingError> {
        validate_input(task_type, images)?;

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(rubric::system_instruction())
            .build()
            .map_err(GradingError::request_build)?;

        let mut parts = vec![text_part(rubric::lead_text(task_type))];
        for (idx, pair) in images.iter().enumerate() {
            let task_number = idx + 1;
            parts.push(text_part(format!("Task {} Prompt:", task_number)));
            parts.push(image_part(&pair.prompt_image));
            parts.push(text_part(format!("Task {} Answer:", task_number)));
            parts.push(image_part(&pair.answer_image));
        }

        debug!("用户消息包含 {} 个内容片段", parts.len());

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(parts))
            .build()
            .map_err(GradingError::request_build)?;

        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: Some("KET 写作批改结果".to_string()),
                name: schema::SCHEMA_NAME.to_string(),
                schema: Some(schema::grading_schema().clone()),
                strict: Some(true),
            },
        };

        CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .response_format(response_format)
            .temperature(self.temperature)
            .max_completion_tokens(self.max_tokens)
            .build()
            .map_err(GradingError::request_build)
    }

    /// 解析模型响应
    fn parse_response(
        &self,
        response: CreateChatCompletionResponse,
    ) -> Result<GradingResult, GradingError> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GradingError::NoCandidates {
                model: self.model_name.clone(),
            })?;

        if let Some(refusal) = &choice.message.refusal {
            warn!("模型拒绝了请求: {}", truncate_text(refusal, RAW_LOG_LIMIT));
        }

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| GradingError::EmptyResponse {
                model: self.model_name.clone(),
            })?;

        parse_grading_json(&content)
    }
}

/// 把模型返回的文本解析为评分结果
///
/// 允许外层包裹 markdown 代码块（`json` 标记可选）
pub fn parse_grading_json(content: &str) -> Result<GradingResult, GradingError> {
    let trimmed = content.trim();
    let body = code_fence_regex()
        .captures(trimmed)
        .and_then(|caps| caps.name("body"))
        .map_or(trimmed, |m| m.as_str());

    serde_json::from_str(body).map_err(|source| {
        error!(
            "评分结果解析失败: {}，原始内容: {}",
            source,
            truncate_text(content, RAW_LOG_LIMIT)
        );
        GradingError::MalformedResponse {
            raw: content.to_string(),
            source,
        }
    })
}

/// 校验图片组数量与题型一致，且每张图片都不为空
pub fn validate_input(task_type: TaskType, images: &[ImagePair]) -> Result<(), InputError> {
    let expected = task_type.required_pairs();
    if images.len() != expected {
        return Err(InputError::PairCountMismatch {
            task_type,
            expected,
            actual: images.len(),
        });
    }

    for (idx, pair) in images.iter().enumerate() {
        pair.ensure_non_empty(idx + 1)?;
    }

    Ok(())
}

fn text_part(text: impl Into<String>) -> ChatCompletionRequestUserMessageContentPart {
    ChatCompletionRequestUserMessageContentPart::Text(ChatCompletionRequestMessageContentPartText {
        text: text.into(),
    })
}

fn image_part(image: &EncodedImage) -> ChatCompletionRequestUserMessageContentPart {
    ChatCompletionRequestUserMessageContentPart::ImageUrl(
        ChatCompletionRequestMessageContentPartImage {
            image_url: ImageUrl {
                url: image.to_data_url(),
                detail: Some(ImageDetail::High),
            },
        },
    )
}
