//! 评分结果的 JSON Schema
//!
//! 作为 `response_format` 发送给模型。只构建一次，之后当作不可变配置使用。

use std::sync::OnceLock;

use serde_json::{json, Value};

/// `response_format.json_schema.name`
pub const SCHEMA_NAME: &str = "grading_result";

/// 返回共享的 Schema
pub fn grading_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(build_grading_schema)
}

fn build_grading_schema() -> Value {
    let scores = json!({
        "type": "object",
        "properties": {
            "content": { "type": "integer" },
            "organisation": { "type": "integer" },
            "language": { "type": "integer" },
            "totalRaw": { "type": "integer" },
            "scaleScore": { "type": "integer" },
            "cefrLevel": { "type": "string" }
        },
        "required": ["content", "organisation", "language", "totalRaw", "scaleScore", "cefrLevel"],
        "additionalProperties": false
    });

    let feedback = json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "dimension": { "type": "string", "description": "Content (C), Organisation (O), 或 Language (L)。" },
                "score": { "type": "integer" },
                "comments": { "type": "string", "description": "详细批改意见，必须使用中文。请使用 ✅ 表示优点，❌ 表示缺点或错误，并以分点列表形式呈现。" }
            },
            "required": ["dimension", "score", "comments"],
            "additionalProperties": false
        }
    });

    let corrections = json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "original": { "type": "string", "description": "学生写的原句。" },
                "corrected": { "type": "string", "description": "修改后的正确句子。" },
                "explanation": { "type": "string", "description": "为什么要这样修改的中文解释。" }
            },
            "required": ["original", "corrected", "explanation"],
            "additionalProperties": false
        }
    });

    json!({
        "type": "object",
        "properties": {
            "overallSummary": { "type": "string", "description": "对学生写作表现的整体中文总结。" },
            "totalScaleScore": { "type": "integer", "description": "最终的剑桥英语量表分数 (82-140+)。" },
            "overallCefrLevel": { "type": "string", "description": "整体 CEFR 等级 (Below A1, A1, A2, B1)。" },
            "tasks": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "taskName": { "type": "string", "description": "例如 'Part 6' 或 'Part 7'。" },
                        "scores": scores,
                        "feedback": feedback,
                        "corrections": corrections,
                        "improvementSuggestions": {
                            "type": "array",
                            "items": { "type": "string", "description": "中文撰写的针对性提升建议。" }
                        }
                    },
                    "required": ["taskName", "scores", "feedback", "corrections", "improvementSuggestions"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["overallSummary", "totalScaleScore", "overallCefrLevel", "tasks"],
        "additionalProperties": false
    })
}
