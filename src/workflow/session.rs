//! 批改会话 - 流程层
//!
//! 三个步骤的状态机：
//!
//! ```text
//! Upload ──开始批改──▶ Loading ──成功──▶ Result
//!   ▲                    │                 │
//!   └──────失败──────────┘                 │
//!   └──────────────────重新批改─────────────┘
//! ```
//!
//! 只有在 `Upload` 且图片齐全时才能开始批改，因此不会同时存在两个请求。

use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::error::{InputError, SessionError, USER_FACING_FAILURE};
use crate::models::{EncodedImage, GradingResult, ImagePair, TaskType};
use crate::services::{CompletionBackend, GradingService};
use crate::utils::logging::log_grading_complete;
use crate::workflow::progress::{drive_with_progress, ProgressRotator, INITIAL_MESSAGE};

/// 最多同时上传的题目数
const MAX_TASKS: usize = 2;

/// 当前步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Upload,
    Loading,
    Result,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::Upload => "upload",
            Step::Loading => "loading",
            Step::Result => "result",
        };
        write!(f, "{}", name)
    }
}

/// 尚未提交的一组图片
#[derive(Debug, Clone, Default)]
pub struct PendingPair {
    pub prompt: Option<EncodedImage>,
    pub answer: Option<EncodedImage>,
}

impl PendingPair {
    pub fn is_complete(&self) -> bool {
        matches!((&self.prompt, &self.answer), (Some(p), Some(a)) if !p.is_empty() && !a.is_empty())
    }

    fn to_pair(&self) -> Option<ImagePair> {
        if !self.is_complete() {
            return None;
        }
        match (&self.prompt, &self.answer) {
            (Some(prompt), Some(answer)) => Some(ImagePair::new(prompt.clone(), answer.clone())),
            _ => None,
        }
    }
}

/// 批改会话
#[derive(Debug)]
pub struct GradingSession {
    step: Step,
    task_type: TaskType,
    pending: [PendingPair; MAX_TASKS],
    progress_message: String,
    result: Option<GradingResult>,
    error: Option<String>,
}

impl Default for GradingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GradingSession {
    pub fn new() -> Self {
        Self {
            step: Step::Upload,
            task_type: TaskType::default(),
            pending: Default::default(),
            progress_message: INITIAL_MESSAGE.to_string(),
            result: None,
            error: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn task_type(&self) -> TaskType {
        self.task_type
    }

    pub fn progress_message(&self) -> &str {
        &self.progress_message
    }

    pub fn result(&self) -> Option<&GradingResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 选择题型
    pub fn select_task_type(&mut self, task_type: TaskType) -> Result<(), SessionError> {
        self.ensure_step(Step::Upload, "切换题型")?;
        self.task_type = task_type;
        Ok(())
    }

    /// 上传第 `task_index` 题（从 0 开始）的题目图片
    pub fn set_prompt_image(
        &mut self,
        task_index: usize,
        image: EncodedImage,
    ) -> Result<(), SessionError> {
        self.ensure_step(Step::Upload, "上传图片")?;
        self.pending_mut(task_index)?.prompt = Some(image);
        Ok(())
    }

    /// 上传第 `task_index` 题（从 0 开始）的作答图片
    pub fn set_answer_image(
        &mut self,
        task_index: usize,
        image: EncodedImage,
    ) -> Result<(), SessionError> {
        self.ensure_step(Step::Upload, "上传图片")?;
        self.pending_mut(task_index)?.answer = Some(image);
        Ok(())
    }

    /// 一次性放入一组图片
    pub fn set_pair(&mut self, task_index: usize, pair: ImagePair) -> Result<(), SessionError> {
        self.set_prompt_image(task_index, pair.prompt_image)?;
        self.set_answer_image(task_index, pair.answer_image)
    }

    /// 当前题型所需的图片是否全部就绪
    pub fn is_ready(&self) -> bool {
        self.pending[..self.task_type.required_pairs()]
            .iter()
            .all(PendingPair::is_complete)
    }

    /// 按提交顺序取出当前题型所需的图片组
    pub fn collect_pairs(&self) -> Option<Vec<ImagePair>> {
        self.pending[..self.task_type.required_pairs()]
            .iter()
            .map(PendingPair::to_pair)
            .collect()
    }

    /// 开始批改
    ///
    /// 图片不全或不在 `Upload` 步骤时直接返回错误，不会发出请求。
    /// 评分失败不作为错误返回：会话回到 `Upload` 并设置错误提示。
    ///
    /// # 返回
    /// 返回批改结束后的步骤
    pub async fn start_grading<B, S>(
        &mut self,
        grader: &GradingService<B>,
        progress_interval: Duration,
        mut on_progress: S,
    ) -> Result<Step, SessionError>
    where
        B: CompletionBackend,
        S: FnMut(&str),
    {
        self.ensure_step(Step::Upload, "开始批改")?;
        let pairs = self.collect_pairs().ok_or(SessionError::NotReady)?;
        let task_type = self.task_type;

        self.step = Step::Loading;
        self.error = None;
        self.result = None;
        self.progress_message = INITIAL_MESSAGE.to_string();
        on_progress(&self.progress_message);

        info!("⏳ 开始批改，题型: {}", task_type);
        let started = Instant::now();

        let mut rotator = ProgressRotator::new();
        let progress_message = &mut self.progress_message;
        let outcome = drive_with_progress(
            grader.grade(task_type, &pairs),
            progress_interval,
            &mut rotator,
            |msg| {
                *progress_message = msg.to_string();
                on_progress(msg);
            },
        )
        .await;

        match outcome {
            Ok(result) => {
                log_grading_complete(
                    result.total_scale_score,
                    &result.overall_cefr_level,
                    started.elapsed().as_secs_f64(),
                );
                self.result = Some(result);
                self.step = Step::Result;
            }
            Err(e) => {
                match std::error::Error::source(&e) {
                    Some(cause) => error!("❌ 批改失败: {}: {} ({})", e, cause, e.user_message()),
                    None => error!("❌ 批改失败: {} ({})", e, e.user_message()),
                }
                self.error = Some(USER_FACING_FAILURE.to_string());
                self.step = Step::Upload;
            }
        }

        Ok(self.step)
    }

    /// 重新批改：清空结果和错误，回到上传步骤
    ///
    /// 已上传的图片保留，方便直接重新提交
    pub fn reset(&mut self) -> Result<(), SessionError> {
        if self.step == Step::Loading {
            return Err(SessionError::WrongStep {
                current: self.step.to_string(),
                action: "重新批改".to_string(),
            });
        }
        self.result = None;
        self.error = None;
        self.progress_message = INITIAL_MESSAGE.to_string();
        self.step = Step::Upload;
        Ok(())
    }

    fn ensure_step(&self, expected: Step, action: &str) -> Result<(), SessionError> {
        if self.step != expected {
            return Err(SessionError::WrongStep {
                current: self.step.to_string(),
                action: action.to_string(),
            });
        }
        Ok(())
    }

    fn pending_mut(&mut self, task_index: usize) -> Result<&mut PendingPair, SessionError> {
        self.pending
            .get_mut(task_index)
            .ok_or(SessionError::InvalidTask(InputError::TaskIndexOutOfRange {
                index: task_index,
                max_index: MAX_TASKS - 1,
            }))
    }
}
