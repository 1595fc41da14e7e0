//! 单元测试用的假模型后端

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_openai::error::{ApiError, OpenAIError};
use async_openai::types::chat::{CreateChatCompletionRequest, CreateChatCompletionResponse};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use crate::services::llm_service::CompletionBackend;

enum Reply {
    Choices(serde_json::Value),
    Failure(String),
}

/// 返回预设响应的后端，记录调用次数
pub struct MockBackend {
    reply: Reply,
    calls: Arc<AtomicUsize>,
}

impl MockBackend {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 第一个候选的内容为 `content`
    pub fn with_content(content: &str) -> Self {
        Self::new(Reply::Choices(json!([{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }])))
    }

    /// 候选存在但没有内容
    pub fn without_content() -> Self {
        Self::new(Reply::Choices(json!([{
            "index": 0,
            "message": { "role": "assistant", "content": null },
            "finish_reason": "stop"
        }])))
    }

    /// 模型拒绝作答：只有 refusal，没有内容
    pub fn refusal(reason: &str) -> Self {
        Self::new(Reply::Choices(json!([{
            "index": 0,
            "message": { "role": "assistant", "content": null, "refusal": reason },
            "finish_reason": "stop"
        }])))
    }

    /// 没有任何候选
    pub fn no_choices() -> Self {
        Self::new(Reply::Choices(json!([])))
    }

    /// 模拟网络/API 失败
    pub fn failing(message: &str) -> Self {
        Self::new(Reply::Failure(message.to_string()))
    }

    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl CompletionBackend for MockBackend {
    async fn complete(
        &self,
        request: CreateChatCompletionRequest,
    ) -> Result<CreateChatCompletionResponse, OpenAIError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.reply {
            Reply::Choices(choices) => Ok(response_with_choices(&request.model, choices.clone())),
            Reply::Failure(message) => Err(OpenAIError::ApiError(ApiError {
                message: message.clone(),
                r#type: Some("server_error".to_string()),
                param: None,
                code: None,
            })),
        }
    }
}

/// 用 JSON 构造一个完整的响应对象
pub fn response_with_choices(
    model: &str,
    choices: serde_json::Value,
) -> CreateChatCompletionResponse {
    serde_json::from_value(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000u32,
        "model": model,
        "choices": choices
    }))
    .expect("测试响应结构无效")
}

/// 生成包含 `task_count` 道题的评分结果 JSON
pub fn sample_result_json(task_count: usize) -> String {
    let tasks: Vec<serde_json::Value> = (0..task_count)
        .map(|idx| {
            json!({
                "taskName": format!("Part {}", 6 + idx),
                "scores": {
                    "content": 4, "organisation": 3, "language": 3,
                    "totalRaw": 10, "scaleScore": 124, "cefrLevel": "A2"
                },
                "feedback": [
                    { "dimension": "Content (C)", "score": 4, "comments": "✅ 要点齐全" }
                ],
                "corrections": [
                    { "original": "I go park.", "corrected": "I went to the park.", "explanation": "时态与介词" }
                ],
                "improvementSuggestions": ["注意动词过去式"]
            })
        })
        .collect();

    json!({
        "overallSummary": "整体表现良好。",
        "totalScaleScore": 124,
        "overallCefrLevel": "A2",
        "tasks": tasks
    })
    .to_string()
}

/// 本地 HTTP 桩服务：每个请求都返回同一个状态码和响应体
///
/// 每个连接只处理一个请求，记录收到的请求体
pub struct StubServer {
    pub addr: SocketAddr,
    bodies: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn start(status: &'static str, body: String) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let bodies = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&bodies);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                answer(stream, status, &body, &seen).await;
            }
        });

        Self { addr, bodies }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn request_count(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }

    pub fn request_bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }
}

async fn answer(stream: TcpStream, status: &str, body: &str, seen: &Mutex<Vec<String>>) {
    let mut reader = BufReader::new(stream);

    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await.unwrap() == 0 || line == "\r\n" {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap();
            }
        }
    }

    let mut request_body = vec![0u8; content_length];
    reader.read_exact(&mut request_body).await.unwrap();
    // 先记录再响应，客户端拿到响应时计数已经更新
    seen.lock()
        .unwrap()
        .push(String::from_utf8_lossy(&request_body).into_owned());

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// 完整的 chat completion 响应体
pub fn completion_body(model: &str, content: &str) -> String {
    json!({
        "id": "chatcmpl-stub",
        "object": "chat.completion",
        "created": 1_700_000_000u32,
        "model": model,
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}
