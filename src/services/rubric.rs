//! 评分标准
//!
//! 评分本身完全交给模型完成，这里只负责把官方标准组织成系统提示词。
//! 断点之间的换算规则由模型自行判断，本地不做计算。

use crate::models::TaskType;

/// 原始分断点 → 量表分 (等级)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleBand {
    pub raw_total: u32,
    pub scale_score: u32,
    pub level: &'static str,
}

const fn band(raw_total: u32, scale_score: u32, level: &'static str) -> ScaleBand {
    ScaleBand {
        raw_total,
        scale_score,
        level,
    }
}

/// 单篇满分 15
pub const SINGLE_TASK_BANDS: [ScaleBand; 4] = [
    band(13, 140, "B1"),
    band(9, 120, "A2"),
    band(6, 100, "A1"),
    band(4, 82, "Min"),
];

/// 两篇满分 30
pub const TWO_TASK_BANDS: [ScaleBand; 4] = [
    band(26, 140, "B1"),
    band(18, 120, "A2"),
    band(12, 100, "A1"),
    band(8, 82, "Min"),
];

/// 按提交题数选择换算表
pub fn bands_for(task_type: TaskType) -> &'static [ScaleBand; 4] {
    match task_type.required_pairs() {
        1 => &SINGLE_TASK_BANDS,
        _ => &TWO_TASK_BANDS,
    }
}

/// 把换算表格式化为 `13->140(B1), 9->120(A2), ...`
pub fn format_bands(bands: &[ScaleBand]) -> String {
    bands
        .iter()
        .map(|b| format!("{}->{}({})", b.raw_total, b.scale_score, b.level))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 构建系统提示词
///
/// 两张换算表都会写入，由模型根据实际题数选用
pub fn system_instruction() -> String {
    let single = TaskType::Part6;
    let combined = TaskType::Combined;
    format!(
        r#"你是一名资深的剑桥KET（A2 Key）写作考官。请对用户的作文进行批改和评分。

1. 评分维度：
   - Content (C)：内容覆盖、相关性。
   - Organisation (O)：逻辑、连接词、结构。
   - Language (L)：词汇、语法准确度。

2. 严格遵循官方评分标准：
   - 每个维度 0-5 分（整数）。
   - 换算规则（必须精准）：
     单篇满分 {}：{}.
     两篇满分 {}：{}.

3. 反馈要求：
   - 必须全部使用【中文】。
   - 在 comments 中，使用 ✅ 和 ❌ 作为前缀来区分优点和需要改进的点。
   - 排版要清晰，分条目陈述。
   - 语气应专业、严谨且具有建设性。"#,
        single.max_raw_total(),
        format_bands(bands_for(single)),
        combined.max_raw_total(),
        format_bands(bands_for(combined))
    )
}

/// 用户消息开头的说明文字
pub fn lead_text(task_type: TaskType) -> String {
    format!(
        "Task Type: {}. Analyze the provided images of prompts and student answers.",
        task_type.label()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bands_matches_official_table() {
        assert_eq!(
            format_bands(&SINGLE_TASK_BANDS),
            "13->140(B1), 9->120(A2), 6->100(A1), 4->82(Min)"
        );
        assert_eq!(
            format_bands(&TWO_TASK_BANDS),
            "26->140(B1), 18->120(A2), 12->100(A1), 8->82(Min)"
        );
    }

    #[test]
    fn test_system_instruction_contains_both_tables() {
        let text = system_instruction();
        assert!(text.contains("单篇满分 15：13->140(B1)"));
        assert!(text.contains("两篇满分 30：26->140(B1)"));
        assert!(text.contains("Content (C)"));
        assert!(text.contains("Organisation (O)"));
        assert!(text.contains("Language (L)"));
        assert!(text.contains("✅"));
        assert!(text.contains("❌"));
    }

    #[test]
    fn test_bands_for_task_type() {
        assert_eq!(bands_for(TaskType::Part6)[0].raw_total, 13);
        assert_eq!(bands_for(TaskType::Combined)[0].raw_total, 26);
    }

    #[test]
    fn test_lead_text_uses_label() {
        assert_eq!(
            lead_text(TaskType::Combined),
            "Task Type: Combined (Part 6 & 7). Analyze the provided images of prompts and student answers."
        );
    }
}
