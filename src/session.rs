//! 复习会话：持有设置、记忆状态、统计与当前题目，串起选题、判定与调度。

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;

use crate::active_set;
use crate::catalog::{self, CatalogItem};
use crate::clock::{Clock, SystemClock};
use crate::error::StoreError;
use crate::fsrs::FsrsScheduler;
use crate::judge::{self, JudgeState, Judgment};
use crate::model::{MemoryState, SessionStats, Settings, SettingsPatch};
use crate::scheduler::{format_interval, Grade, Scheduler};
use crate::selector;
use crate::store::{self, KvStore, CARDS_KEY, SETTINGS_KEY, STATS_KEY};

/// `next()` 给出的题目。读音只用于反馈展示，不应预填到输入框。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    pub glyph: &'static str,
    pub readings: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// 标准读音
    pub answer: &'static str,
    /// 下次复习间隔，如 "10m"
    pub interval: String,
    pub latency_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub judgment: Judgment,
    pub feedback: Option<Feedback>,
}

impl Verdict {
    fn pending() -> Self {
        Self {
            judgment: Judgment::Pending,
            feedback: None,
        }
    }
}

#[derive(Debug, Clone)]
struct Cursor<C> {
    item: &'static CatalogItem,
    memory: MemoryState<C>,
    shown_at: DateTime<Utc>,
    resolved: bool,
}

pub struct Session<S: Scheduler = FsrsScheduler> {
    catalog: &'static [CatalogItem],
    scheduler: S,
    store: Box<dyn KvStore>,
    clock: Box<dyn Clock>,
    rng: Box<dyn RngCore>,
    cards: BTreeMap<String, MemoryState<S::Card>>,
    settings: Settings,
    stats: SessionStats,
    cursor: Option<Cursor<S::Card>>,
}

impl<S: Scheduler> Session<S> {
    pub fn new(scheduler: S, store: impl KvStore + 'static) -> Self {
        Self {
            catalog: catalog::all(),
            scheduler,
            store: Box::new(store),
            clock: Box::new(SystemClock),
            rng: Box::new(StdRng::from_entropy()),
            cards: BTreeMap::new(),
            settings: Settings::default(),
            stats: SessionStats::default(),
            cursor: None,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// 从存储载入全部状态，并为新进入范围的假名补建记忆状态。可重复调用。
    pub fn init(&mut self) {
        self.cards = store::load_cards(self.store.as_ref()).into_inner();
        self.settings = store::load_settings(self.store.as_ref()).into_inner();
        self.stats = store::load_stats(self.store.as_ref()).into_inner();
        if self.ensure_cards() {
            self.persist_cards();
        }
        log::info!(
            "会话初始化：{} 张卡片，{} 个在练习范围内",
            self.cards.len(),
            self.active_items().len()
        );
    }

    /// 选出下一题并开始计时；练习范围为空时返回 None
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Prompt> {
        let active = self.active_items();
        let now = self.clock.now();
        let states: Vec<&MemoryState<S::Card>> = active
            .iter()
            .filter_map(|item| self.cards.get(item.glyph))
            .collect();

        let scheduler = &self.scheduler;
        let picked = selector::select_next(
            &states,
            now,
            |m| scheduler.due(&m.card),
            self.rng.as_mut(),
        );
        let Some(memory) = picked.cloned() else {
            self.cursor = None;
            log::debug!("没有可出的题");
            return None;
        };
        let Some(item) = active.iter().copied().find(|i| i.glyph == memory.glyph) else {
            self.cursor = None;
            return None;
        };

        log::debug!("出题 {}", item.glyph);
        self.cursor = Some(Cursor {
            item,
            memory,
            shown_at: now,
            resolved: false,
        });
        Some(Prompt {
            glyph: item.glyph,
            readings: item.readings,
        })
    }

    /// 判定一次输入。答对后清空当前题；答错后保留，直到调用方再次 `next()`。
    pub fn attempt(&mut self, input: &str) -> Verdict {
        let Some(cursor) = self.cursor.as_ref() else {
            return Verdict::pending();
        };
        if cursor.resolved {
            return Verdict::pending();
        }

        let judgment = judge::classify(cursor.item.readings, &judge::normalize(input));
        match judgment {
            Judgment::Pending => Verdict::pending(),
            Judgment::Correct => Verdict {
                judgment,
                feedback: self.grade(Grade::Good),
            },
            Judgment::Incorrect => Verdict {
                judgment,
                feedback: self.grade(Grade::Again),
            },
        }
    }

    fn grade(&mut self, grade: Grade) -> Option<Feedback> {
        let now = self.clock.now();
        let cursor = self.cursor.as_mut()?;
        let latency_ms = (now - cursor.shown_at).num_milliseconds().max(0) as u64;

        let mut memory = cursor.memory.clone();
        memory.card = self.scheduler.advance(&memory.card, grade, now);
        memory.push_latency(latency_ms);
        let interval = self
            .scheduler
            .due(&memory.card)
            .map(|due| format_interval(due, now))
            .unwrap_or_else(|| "now".to_string());
        let answer = cursor.item.canonical();
        let glyph = cursor.item.glyph;

        let correct = grade == Grade::Good;
        if correct {
            self.cursor = None;
        } else {
            cursor.resolved = true;
        }

        log::debug!(
            "{} 判定 {}，用时 {}ms，下次 {}",
            glyph,
            grade.as_str(),
            latency_ms,
            interval
        );
        self.cards.insert(glyph.to_string(), memory);
        self.stats.record(correct, latency_ms);
        self.persist_cards();
        self.persist_stats();

        Some(Feedback {
            answer,
            interval,
            latency_ms,
        })
    }

    /// 与判定相同的前缀检查，但不消耗作答；没有当前题时为 false
    pub fn is_valid_prefix(&self, input: &str) -> bool {
        match &self.cursor {
            Some(c) => judge::is_prefix_of_any(c.item.readings, &judge::normalize(input)),
            None => false,
        }
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.settings.apply(patch);
        self.persist_settings();
        if self.ensure_cards() {
            self.persist_cards();
        }
        log::info!(
            "设置已更新：hiragana={} katakana={} groups={} theme={}",
            self.settings.hiragana,
            self.settings.katakana,
            self.settings.groups.len(),
            self.settings.theme.as_str()
        );
    }

    /// 清空全部记忆状态与统计，不可恢复
    pub fn reset_progress(&mut self) {
        self.cards.clear();
        self.stats = SessionStats::default();
        self.cursor = None;
        self.ensure_cards();
        self.persist_cards();
        self.persist_stats();
        self.persist_settings();
        log::info!("进度已重置，重建 {} 张卡片", self.cards.len());
    }

    // ---------------- 查询 ----------------
    pub fn state(&self) -> JudgeState {
        match &self.cursor {
            None => JudgeState::NoPrompt,
            Some(c) if c.resolved => JudgeState::Resolved,
            Some(_) => JudgeState::AwaitingInput,
        }
    }

    pub fn current(&self) -> Option<Prompt> {
        self.cursor.as_ref().map(|c| Prompt {
            glyph: c.item.glyph,
            readings: c.item.readings,
        })
    }

    pub fn current_readings(&self) -> Option<&'static [&'static str]> {
        self.cursor.as_ref().map(|c| c.item.readings)
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn memory(&self, glyph: &str) -> Option<&MemoryState<S::Card>> {
        self.cards.get(glyph)
    }

    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn active_items(&self) -> Vec<&'static CatalogItem> {
        active_set::resolve(self.catalog, &self.settings)
    }

    /// 练习范围内已到期的数量
    pub fn due_count(&self) -> usize {
        let now = self.clock.now();
        self.active_items()
            .iter()
            .filter_map(|item| self.cards.get(item.glyph))
            .filter(|m| {
                self.scheduler
                    .due(&m.card)
                    .map(|d| d <= now)
                    .unwrap_or(false)
            })
            .count()
    }

    // ---------------- 内部 ----------------
    /// 为练习范围内缺少记忆状态、或到期时间读不出来的假名重建；返回是否有改动
    fn ensure_cards(&mut self) -> bool {
        let now = self.clock.now();
        let mut created = 0;
        for item in active_set::resolve(self.catalog, &self.settings) {
            match self.cards.get_mut(item.glyph) {
                Some(m) if self.scheduler.due(&m.card).is_some() => {}
                Some(m) => {
                    log::warn!("{} 的到期时间无法读取，重建卡片", item.glyph);
                    m.card = self.scheduler.new_card(now);
                    created += 1;
                }
                None => {
                    let card = self.scheduler.new_card(now);
                    self.cards
                        .insert(item.glyph.to_string(), MemoryState::new(item.glyph, card));
                    created += 1;
                }
            }
        }
        if created > 0 {
            log::debug!("新建 {} 张卡片", created);
        }
        created > 0
    }

    fn persist_cards(&mut self) {
        write_record(self.store.as_mut(), CARDS_KEY, &self.cards);
    }

    fn persist_stats(&mut self) {
        write_record(self.store.as_mut(), STATS_KEY, &self.stats);
    }

    fn persist_settings(&mut self) {
        write_record(self.store.as_mut(), SETTINGS_KEY, &self.settings);
    }
}

/// 写失败只记日志，不重试
fn write_record<T: Serialize>(store: &mut dyn KvStore, key: &str, value: &T) {
    let res = serde_json::to_string_pretty(value)
        .map_err(StoreError::from)
        .and_then(|json| store.set(key, &json));
    if let Err(e) = res {
        log::warn!("写入 {} 失败: {}", key, e);
    }
}
