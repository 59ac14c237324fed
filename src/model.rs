use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{Group, KanaSet};

/// 每个假名最多保留的反应时间条数
pub const LATENCY_HISTORY: usize = 10;

// ---------------- 设置 ----------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    #[default]
    System,
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "system" => Some(Self::System),
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    /// system -> light -> dark -> system
    pub fn cycle(self) -> Self {
        match self {
            Self::System => Self::Light,
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub hiragana: bool,
    pub katakana: bool,
    pub groups: BTreeSet<Group>,
    pub theme: ThemePreference,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hiragana: true,
            katakana: false,
            groups: Group::ALL.into_iter().collect(),
            theme: ThemePreference::System,
        }
    }
}

impl Settings {
    pub fn set_enabled(&self, set: KanaSet) -> bool {
        match set {
            KanaSet::Hiragana => self.hiragana,
            KanaSet::Katakana => self.katakana,
        }
    }

    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.hiragana {
            self.hiragana = v;
        }
        if let Some(v) = patch.katakana {
            self.katakana = v;
        }
        if let Some(v) = patch.groups {
            self.groups = v;
        }
        if let Some(v) = patch.theme {
            self.theme = v;
        }
    }
}

/// 局部更新：None 的字段保持原值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub hiragana: Option<bool>,
    pub katakana: Option<bool>,
    pub groups: Option<BTreeSet<Group>>,
    pub theme: Option<ThemePreference>,
}

impl SettingsPatch {
    pub fn hiragana(v: bool) -> Self {
        Self {
            hiragana: Some(v),
            ..Default::default()
        }
    }

    pub fn katakana(v: bool) -> Self {
        Self {
            katakana: Some(v),
            ..Default::default()
        }
    }

    pub fn groups(v: impl IntoIterator<Item = Group>) -> Self {
        Self {
            groups: Some(v.into_iter().collect()),
            ..Default::default()
        }
    }

    pub fn theme(v: ThemePreference) -> Self {
        Self {
            theme: Some(v),
            ..Default::default()
        }
    }
}

// ---------------- 统计 ----------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub correct: u64,
    pub incorrect: u64,
    pub total_time_ms: u64,
    pub responses: u64,
}

impl SessionStats {
    pub fn record(&mut self, correct: bool, latency_ms: u64) {
        if correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
        self.total_time_ms = self.total_time_ms.saturating_add(latency_ms);
        self.responses += 1;
    }

    /// 正确率（百分比，四舍五入）；尚无作答时为 None
    pub fn accuracy(&self) -> Option<u64> {
        if self.responses == 0 {
            return None;
        }
        Some(((self.correct as f64 / self.responses as f64) * 100.0).round() as u64)
    }

    pub fn average_secs(&self) -> Option<f64> {
        if self.responses == 0 {
            return None;
        }
        Some(self.total_time_ms as f64 / self.responses as f64 / 1000.0)
    }
}

// ---------------- 记忆状态 ----------------
/// 单个假名的记忆状态。`card` 由调度器持有语义，这里只负责存取。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryState<C> {
    pub glyph: String,
    pub card: C,
    #[serde(default)]
    pub latencies: Vec<u64>,
}

impl<C> MemoryState<C> {
    pub fn new(glyph: impl Into<String>, card: C) -> Self {
        Self {
            glyph: glyph.into(),
            card,
            latencies: Vec::new(),
        }
    }

    pub fn push_latency(&mut self, ms: u64) {
        self.latencies.push(ms);
        if self.latencies.len() > LATENCY_HISTORY {
            let extra = self.latencies.len() - LATENCY_HISTORY;
            self.latencies.drain(..extra);
        }
    }
}
