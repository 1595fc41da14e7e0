use std::str::FromStr;

use crate::error::InputError;

/// 题型枚举
///
/// 清单中的写法与 [`FromStr`] 一致：`part6`、`Part 7`、`combined`、`both` 等都可以
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum TaskType {
    /// Part 6：单篇短文
    #[default]
    Part6,
    /// Part 7：单篇看图写作
    Part7,
    /// Part 6 与 Part 7 合并批改
    Combined,
}

impl TaskType {
    /// 所有题型，按界面展示顺序
    pub const ALL: [TaskType; 3] = [TaskType::Part6, TaskType::Part7, TaskType::Combined];

    /// 发送给模型的题型标签
    pub fn label(self) -> &'static str {
        match self {
            TaskType::Part6 => "Part 6",
            TaskType::Part7 => "Part 7",
            TaskType::Combined => "Combined (Part 6 & 7)",
        }
    }

    /// 需要提交的图片组数量
    pub fn required_pairs(self) -> usize {
        match self {
            TaskType::Part6 | TaskType::Part7 => 1,
            TaskType::Combined => 2,
        }
    }

    /// 原始分满分
    pub fn max_raw_total(self) -> u32 {
        15 * self.required_pairs() as u32
    }

    /// 清单中使用的键
    pub fn key(self) -> &'static str {
        match self {
            TaskType::Part6 => "part6",
            TaskType::Part7 => "part7",
            TaskType::Combined => "combined",
        }
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

impl FromStr for TaskType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);

        let alias = match normalized.as_str() {
            "6" => Some(TaskType::Part6),
            "7" => Some(TaskType::Part7),
            "both" => Some(TaskType::Combined),
            _ => None,
        };

        alias
            .or_else(|| {
                TaskType::ALL
                    .into_iter()
                    .find(|t| normalized == t.key() || normalized == normalize(t.label()))
            })
            .ok_or_else(|| InputError::UnknownTaskType {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for TaskType {
    type Error = InputError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
