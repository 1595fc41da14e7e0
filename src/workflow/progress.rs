//! 等待评分时的轮换提示
//!
//! 轮换只是本地定时器，对请求本身没有任何影响

use std::future::Future;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// 请求刚发出时显示的提示
pub const INITIAL_MESSAGE: &str = "AI 考官正在审阅你的作文...";

/// 轮换提示，按顺序循环
pub const ROTATING_MESSAGES: [&str; 5] = [
    "正在识别手写内容...",
    "正在分析语法结构...",
    "根据剑桥官方标准进行打分...",
    "正在生成针对性的修改建议...",
    "即将揭晓评分结果...",
];

/// 提示轮换器
#[derive(Debug, Clone, Default)]
pub struct ProgressRotator {
    index: usize,
}

impl ProgressRotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 切换到下一条提示并返回
    pub fn advance(&mut self) -> &'static str {
        self.index = (self.index + 1) % ROTATING_MESSAGES.len();
        ROTATING_MESSAGES[self.index]
    }
}

/// 等待 `future` 完成，期间每隔 `period` 轮换一次提示
///
/// 第一次轮换发生在 `period` 之后，`future` 完成后立即停止
pub async fn drive_with_progress<F, S>(
    future: F,
    period: Duration,
    rotator: &mut ProgressRotator,
    mut on_message: S,
) -> F::Output
where
    F: Future,
    S: FnMut(&'static str),
{
    tokio::pin!(future);

    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            output = &mut future => return output,
            _ = ticker.tick() => on_message(rotator.advance()),
        }
    }
}
