/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

use crate::models::TaskType;

/// 记录程序启动信息
///
/// # 参数
/// - `model`: 模型名称
/// - `api_base`: API 地址
pub fn log_startup(model: &str, api_base: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 KET 写作 AI 考官启动");
    info!("🤖 模型: {}", model);
    info!("🌐 API: {}", api_base);
    info!("{}", "=".repeat(60));
}

/// 记录提交信息
pub fn log_submission(task_type: TaskType, pair_count: usize) {
    info!("📋 题型: {}，图片组数: {}", task_type, pair_count);
}

/// 打印评分完成信息
///
/// # 参数
/// - `scale_score`: 量表分
/// - `level`: CEFR 等级
/// - `elapsed_secs`: 耗时（秒）
pub fn log_grading_complete(scale_score: u32, level: &str, elapsed_secs: f64) {
    info!("\n{}", "─".repeat(60));
    info!("✅ 批改完成: 量表分 {} ({})", scale_score, level);
    info!("⏱️ 耗时: {:.1} 秒", elapsed_secs);
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
