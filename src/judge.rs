//! 逐键判定：输入是还没打完、已经答对，还是不可能再答对。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Judgment {
    Pending,
    Correct,
    Incorrect,
}

/// 判定状态机所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeState {
    /// 没有正在出的题
    NoPrompt,
    /// 已出题，等待输入
    AwaitingInput,
    /// 已给出答错判定，等待调用方切到下一题
    Resolved,
}

pub fn normalize(input: &str) -> String {
    input.trim().to_lowercase()
}

/// 已归一化的输入是否仍可能打成某个读音（空串总是）
pub fn is_prefix_of_any(readings: &[&str], normalized: &str) -> bool {
    readings.iter().any(|r| r.starts_with(normalized))
}

/// 只做分类，不产生副作用。`normalized` 需先经过 [`normalize`]。
pub fn classify(readings: &[&str], normalized: &str) -> Judgment {
    if normalized.is_empty() {
        return Judgment::Pending;
    }
    if readings.iter().any(|r| *r == normalized) {
        return Judgment::Correct;
    }
    if is_prefix_of_any(readings, normalized) {
        return Judgment::Pending;
    }
    Judgment::Incorrect
}
