//! # KET Writing Examiner
//!
//! 剑桥 KET（A2 Key）写作 AI 批改工具：上传题目与作答图片，交给多模态模型评分，
//! 并展示结构化的评分结果。评分标准和手写识别全部由模型完成。
//!
//! ## 架构设计
//!
//! ### ① 数据模型（Models）
//! - `models/` - 题型、图片组、评分结果，以及提交清单加载
//!
//! ### ② 业务能力层（Services）
//! - `LlmService` - 调用 OpenAI 兼容接口的能力（`CompletionBackend`）
//! - `GradingService` - 构建请求、约束返回格式、解析评分结果
//! - `rubric` / `schema` - 评分标准提示词与返回 JSON Schema
//!
//! ### ③ 流程层（Workflow）
//! - `GradingSession` - upload → loading → result 三步状态机
//! - `progress` - 等待期间的轮换提示
//!
//! ### ④ 应用层（App）
//! - `App` - 读取清单、驱动会话、输出报告
//!
//! ## 模块结构

pub mod app;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{AppError, AppResult, GradingError};
pub use models::{GradingResult, ImagePair, TaskType};
pub use services::{CompletionBackend, GradingService, LlmService};
pub use workflow::{GradingSession, Step};
