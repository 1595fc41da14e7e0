use thiserror::Error;

use crate::models::TaskType;

/// 评分过程中出现错误时展示给用户的统一提示
pub const USER_FACING_FAILURE: &str = "评分过程中出现错误，请检查网络或图片质量后重试。";

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 评分请求错误
    #[error("评分错误: {0}")]
    Grading(#[from] GradingError),
    /// 输入校验错误
    #[error("输入错误: {0}")]
    Input(#[from] InputError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 会话状态错误
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
}

/// 评分请求错误
///
/// 每一种失败都对应一条可直接展示给用户的提示，见 [`GradingError::user_message`]。
#[derive(Debug, Error)]
pub enum GradingError {
    /// 服务没有返回任何候选结果
    #[error("模型未返回候选结果 (模型: {model})")]
    NoCandidates { model: String },
    /// 候选结果中没有内容
    #[error("模型返回内容为空 (模型: {model})")]
    EmptyResponse { model: String },
    /// 返回内容无法解析为评分结果
    #[error("评分结果解析失败")]
    MalformedResponse {
        /// 原始返回内容，只用于诊断日志
        raw: String,
        #[source]
        source: serde_json::Error,
    },
    /// 网络或 API 调用失败
    #[error("LLM API 调用失败 (模型: {model})")]
    Transport {
        model: String,
        #[source]
        source: async_openai::error::OpenAIError,
    },
    /// 请求在发送前构建失败
    #[error("评分请求构建失败")]
    RequestBuild {
        #[source]
        source: async_openai::error::OpenAIError,
    },
    /// 请求在发送前被判定为无效
    #[error(transparent)]
    Input(#[from] InputError),
}

impl GradingError {
    /// 返回给最终用户看的提示，不包含原始响应内容
    pub fn user_message(&self) -> &'static str {
        match self {
            GradingError::NoCandidates { .. } => "AI 无法生成响应，请检查图片清晰度或重试。",
            GradingError::EmptyResponse { .. } => "AI 返回了空响应。",
            GradingError::MalformedResponse { .. } => "AI 返回的数据格式有误。",
            GradingError::Transport { .. } => USER_FACING_FAILURE,
            GradingError::RequestBuild { .. } => "评分请求构建失败，请重试。",
            GradingError::Input(_) => "请先上传每道题的题目图片和作答图片。",
        }
    }
}

/// 输入校验错误
#[derive(Debug, Error)]
pub enum InputError {
    /// 图片组数量与题型不符
    #[error("题型 {task_type} 需要 {expected} 组图片，实际提供了 {actual} 组")]
    PairCountMismatch {
        task_type: TaskType,
        expected: usize,
        actual: usize,
    },
    /// 图片数据为空
    #[error("第 {task_number} 题的{slot}图片为空")]
    EmptyImage { task_number: usize, slot: ImageSlot },
    /// data URL 格式不正确
    #[error("无法识别的图片 data URL: {preview}")]
    InvalidDataUrl { preview: String },
    /// 无法识别的题型
    #[error("无法识别的题型: {value}")]
    UnknownTaskType { value: String },
    /// 题目序号超出范围
    #[error("题目序号 {index} 超出范围 [0, {max_index}]")]
    TaskIndexOutOfRange { index: usize, max_index: usize },
}

/// 一组图片中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Prompt,
    Answer,
}

impl std::fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSlot::Prompt => write!(f, "题目"),
            ImageSlot::Answer => write!(f, "作答"),
        }
    }
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败: {path}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败: {path}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必填配置为空
    #[error("环境变量 {var_name} 不能为空")]
    Missing { var_name: String },
    /// 配置值不合法
    #[error("环境变量 {var_name} 的值 '{value}' 不合法: {reason}")]
    Invalid {
        var_name: String,
        value: String,
        reason: String,
    },
}

/// 会话状态错误
#[derive(Debug, Error)]
pub enum SessionError {
    /// 当前步骤不允许该操作
    #[error("当前步骤 {current} 不允许{action}")]
    WrongStep { current: String, action: String },
    /// 图片尚未上传完整
    #[error("图片尚未上传完整，无法开始批改")]
    NotReady,
    /// 题目序号等输入无效
    #[error(transparent)]
    InvalidTask(#[from] InputError),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source,
        })
    }

    /// 创建配置缺失错误
    pub fn config_missing(var_name: impl Into<String>) -> Self {
        AppError::Config(ConfigError::Missing {
            var_name: var_name.into(),
        })
    }
}

impl GradingError {
    /// 创建 API 调用失败错误
    pub fn transport(
        model: impl Into<String>,
        source: async_openai::error::OpenAIError,
    ) -> Self {
        GradingError::Transport {
            model: model.into(),
            source,
        }
    }

    /// 创建请求构建失败错误
    pub fn request_build(source: async_openai::error::OpenAIError) -> Self {
        GradingError::RequestBuild { source }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
