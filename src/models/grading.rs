//! 评分结果数据模型
//!
//! 字段名与请求中的 JSON Schema 一一对应（camelCase）。

use serde::{Deserialize, Serialize};

/// 模型返回的完整评分结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingResult {
    /// 整体中文总结
    pub overall_summary: String,
    /// 剑桥英语量表分数 (82-140+)
    pub total_scale_score: u32,
    /// 整体 CEFR 等级
    pub overall_cefr_level: String,
    /// 每道题的评分，顺序与提交顺序一致
    pub tasks: Vec<TaskResult>,
}

/// 单道题的评分结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    /// 例如 "Part 6"
    pub task_name: String,
    pub scores: ScoreBreakdown,
    #[serde(default)]
    pub feedback: Vec<FeedbackSection>,
    #[serde(default)]
    pub corrections: Vec<Correction>,
    #[serde(default)]
    pub improvement_suggestions: Vec<String>,
}

/// 分数明细
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub content: u32,
    pub organisation: u32,
    pub language: u32,
    pub total_raw: u32,
    pub scale_score: u32,
    pub cefr_level: String,
}

impl ScoreBreakdown {
    /// 三个维度分数之和
    pub fn dimension_sum(&self) -> u32 {
        self.content + self.organisation + self.language
    }

    /// 模型给出的原始总分是否等于三个维度之和
    pub fn is_consistent(&self) -> bool {
        self.total_raw == self.dimension_sum()
    }
}

/// 单个维度的考官点评
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSection {
    /// Content (C) / Organisation (O) / Language (L)
    pub dimension: String,
    pub score: u32,
    pub comments: String,
}

/// 句子修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub original: String,
    pub corrected: String,
    pub explanation: String,
}
