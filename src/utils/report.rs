//! 评分报告渲染
//!
//! 把 [`GradingResult`] 渲染为终端中阅读的纯文本报告。

use std::fmt::Write;

use crate::models::{GradingResult, TaskResult};

/// 单个维度满分
const DIMENSION_MAX: u32 = 5;
/// 单篇原始分满分
const TASK_RAW_MAX: u32 = 15;

/// 统一维度名称，模型可能只返回 "Content" 而不带缩写
pub fn normalize_dimension(dimension: &str) -> &str {
    match dimension.trim() {
        "Content" | "Content (C)" | "C" => "Content (C)",
        "Organisation" | "Organization" | "Organisation (O)" | "Organization (O)" | "O" => {
            "Organisation (O)"
        }
        "Language" | "Language (L)" | "L" => "Language (L)",
        other => other,
    }
}

/// 渲染完整报告
pub fn render_report(result: &GradingResult) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "KET Writing AI Examiner - 批改报告");
    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(
        out,
        "量表分: {}    CEFR 等级: {}",
        result.total_scale_score, result.overall_cefr_level
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "整体评价:");
    let _ = writeln!(out, "{}", result.overall_summary.trim());

    for task in &result.tasks {
        let _ = writeln!(out);
        out.push_str(&render_task(task));
    }

    out
}

/// 渲染单道题
pub fn render_task(task: &TaskResult) -> String {
    let mut out = String::new();
    let scores = &task.scores;

    let _ = writeln!(out, "{}", "─".repeat(60));
    let _ = writeln!(out, "【{}】", task.task_name);
    let _ = writeln!(
        out,
        "  Content (C): {}/{}   Organisation (O): {}/{}   Language (L): {}/{}",
        scores.content,
        DIMENSION_MAX,
        scores.organisation,
        DIMENSION_MAX,
        scores.language,
        DIMENSION_MAX
    );
    let _ = writeln!(
        out,
        "  原始总分: {}/{}   量表分: {}   等级: {}",
        scores.total_raw, TASK_RAW_MAX, scores.scale_score, scores.cefr_level
    );

    if !task.feedback.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  考官点评:");
        for item in &task.feedback {
            let _ = writeln!(
                out,
                "  ▸ {} {}/{}",
                normalize_dimension(&item.dimension),
                item.score,
                DIMENSION_MAX
            );
            for line in item.comments.lines().filter(|l| !l.trim().is_empty()) {
                let _ = writeln!(out, "      {}", line.trim());
            }
        }
    }

    if !task.corrections.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  句子修改:");
        for fix in &task.corrections {
            let _ = writeln!(out, "  ✗ {}", fix.original);
            let _ = writeln!(out, "  ✓ {}", fix.corrected);
            let _ = writeln!(out, "    {}", fix.explanation);
        }
    }

    if !task.improvement_suggestions.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  提升建议:");
        for (idx, suggestion) in task.improvement_suggestions.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", idx + 1, suggestion);
        }
    }

    out
}
