//! 持久化边界：键值存储 + 读取时的结构校验。
//!
//! 读取永远不会把错误抛给会话：缺失、读失败、格式错误都会退回默认值，
//! 并通过 [`Loaded`] 标明来源。

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::catalog::Group;
use crate::error::Result;
use crate::model::{MemoryState, SessionStats, Settings, ThemePreference, LATENCY_HISTORY};

pub const CARDS_KEY: &str = "cards";
pub const SETTINGS_KEY: &str = "settings";
pub const STATS_KEY: &str = "stats";

pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

// ---------------- JSON 目录存储 ----------------
/// 每个键对应目录下的一个 `<key>.json` 文件
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
}

impl JsonDirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KvStore for JsonDirStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

// ---------------- 内存存储 ----------------
/// clone 出来的句柄共享同一份数据
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.borrow().contains_key(key)
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.inner
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ---------------- 读取与校验 ----------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    Missing,
    Unreadable(String),
    Malformed(String),
}

/// 读取结果：要么是校验通过的值，要么是退回的默认值及原因
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    Valid(T),
    Defaulted(T, Fallback),
}

impl<T> Loaded<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Valid(v) | Self::Defaulted(v, _) => v,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

fn read_json(store: &dyn KvStore, key: &str) -> std::result::Result<Value, Fallback> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Err(Fallback::Missing),
        Err(e) => return Err(Fallback::Unreadable(e.to_string())),
    };
    serde_json::from_str(&raw).map_err(|e| Fallback::Malformed(e.to_string()))
}

fn fallback<T>(key: &str, value: T, why: Fallback) -> Loaded<T> {
    match &why {
        Fallback::Missing => log::debug!("{} 不存在，使用默认值", key),
        other => log::warn!("{} 读取失败，使用默认值: {:?}", key, other),
    }
    Loaded::Defaulted(value, why)
}

/// 逐条校验卡片；单条损坏只丢弃该条，之后由会话重新创建
pub fn load_cards<C: DeserializeOwned>(
    store: &dyn KvStore,
) -> Loaded<BTreeMap<String, MemoryState<C>>> {
    let value = match read_json(store, CARDS_KEY) {
        Ok(v) => v,
        Err(why) => return fallback(CARDS_KEY, BTreeMap::new(), why),
    };
    let Value::Object(entries) = value else {
        return fallback(
            CARDS_KEY,
            BTreeMap::new(),
            Fallback::Malformed("expected an object".into()),
        );
    };

    let mut cards = BTreeMap::new();
    for (glyph, entry) in entries {
        match serde_json::from_value::<MemoryState<C>>(entry) {
            Ok(mut state) => {
                state.glyph = glyph.clone();
                if state.latencies.len() > LATENCY_HISTORY {
                    let extra = state.latencies.len() - LATENCY_HISTORY;
                    state.latencies.drain(..extra);
                }
                cards.insert(glyph, state);
            }
            Err(e) => log::warn!("丢弃损坏的卡片 {}: {}", glyph, e),
        }
    }
    Loaded::Valid(cards)
}

/// 字段级校验：缺失或类型不对的字段取默认值
pub fn load_settings(store: &dyn KvStore) -> Loaded<Settings> {
    let value = match read_json(store, SETTINGS_KEY) {
        Ok(v) => v,
        Err(why) => return fallback(SETTINGS_KEY, Settings::default(), why),
    };
    let Value::Object(obj) = value else {
        return fallback(
            SETTINGS_KEY,
            Settings::default(),
            Fallback::Malformed("expected an object".into()),
        );
    };

    let defaults = Settings::default();
    let groups = match obj.get("groups") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().and_then(Group::parse))
            .collect::<BTreeSet<_>>(),
        _ => defaults.groups,
    };
    Loaded::Valid(Settings {
        hiragana: obj.get("hiragana").and_then(Value::as_bool) == Some(true),
        katakana: obj.get("katakana").and_then(Value::as_bool) == Some(true),
        groups,
        theme: obj
            .get("theme")
            .and_then(Value::as_str)
            .and_then(ThemePreference::parse)
            .unwrap_or_default(),
    })
}

pub fn load_stats(store: &dyn KvStore) -> Loaded<SessionStats> {
    let value = match read_json(store, STATS_KEY) {
        Ok(v) => v,
        Err(why) => return fallback(STATS_KEY, SessionStats::default(), why),
    };
    let Value::Object(obj) = value else {
        return fallback(
            STATS_KEY,
            SessionStats::default(),
            Fallback::Malformed("expected an object".into()),
        );
    };

    let counter = |name: &str| -> u64 {
        obj.get(name)
            .and_then(Value::as_f64)
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n.round() as u64)
            .unwrap_or(0)
    };
    Loaded::Valid(SessionStats {
        correct: counter("correct"),
        incorrect: counter("incorrect"),
        total_time_ms: counter("total_time_ms"),
        responses: counter("responses"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ReviewCard;
    use tempfile::TempDir;

    #[test]
    fn missing_records_fall_back() {
        let store = MemoryStore::new();
        assert_eq!(
            load_settings(&store),
            Loaded::Defaulted(Settings::default(), Fallback::Missing)
        );
        assert_eq!(load_stats(&store).into_inner(), SessionStats::default());
        assert!(load_cards::<ReviewCard>(&store).into_inner().is_empty());
    }

    #[test]
    fn garbage_falls_back() {
        let mut store = MemoryStore::new();
        store.set(SETTINGS_KEY, "{not json").unwrap();
        store.set(STATS_KEY, "[1,2,3]").unwrap();
        store.set(CARDS_KEY, "\"hello\"").unwrap();

        assert!(matches!(
            load_settings(&store),
            Loaded::Defaulted(_, Fallback::Malformed(_))
        ));
        assert!(!load_stats(&store).is_valid());
        assert!(!load_cards::<ReviewCard>(&store).is_valid());
    }

    #[test]
    fn settings_fields_are_checked_one_by_one() {
        let mut store = MemoryStore::new();
        store
            .set(
                SETTINGS_KEY,
                r#"{"hiragana": "yes", "katakana": true, "groups": ["a", "zz", 3, "combo"], "theme": "dark"}"#,
            )
            .unwrap();
        let s = load_settings(&store).into_inner();
        assert!(!s.hiragana);
        assert!(s.katakana);
        assert_eq!(
            s.groups,
            [Group::A, Group::Combo].into_iter().collect::<BTreeSet<_>>()
        );
        assert_eq!(s.theme, ThemePreference::Dark);
    }

    #[test]
    fn settings_without_groups_keep_every_group() {
        let mut store = MemoryStore::new();
        store.set(SETTINGS_KEY, r#"{"hiragana": true}"#).unwrap();
        let s = load_settings(&store).into_inner();
        assert_eq!(s.groups.len(), Group::ALL.len());
        assert_eq!(s.theme, ThemePreference::System);
    }

    #[test]
    fn stats_accept_floats_and_reject_negatives() {
        let mut store = MemoryStore::new();
        store
            .set(
                STATS_KEY,
                r#"{"correct": 3, "incorrect": -2, "total_time_ms": 1234.6, "responses": "x"}"#,
            )
            .unwrap();
        let st = load_stats(&store).into_inner();
        assert_eq!(st.correct, 3);
        assert_eq!(st.incorrect, 0);
        assert_eq!(st.total_time_ms, 1235);
        assert_eq!(st.responses, 0);
    }

    #[test]
    fn broken_card_entries_are_dropped() {
        let mut store = MemoryStore::new();
        store
            .set(
                CARDS_KEY,
                r#"{
                    "あ": {"glyph": "あ", "card": {"stage": 1, "due": "2024-01-01T00:00:00Z"}, "latencies": [1,2,3,4,5,6,7,8,9,10,11,12]},
                    "い": {"glyph": "い", "card": 42},
                    "う": {"glyph": "wrong", "card": {}}
                }"#,
            )
            .unwrap();
        let cards = load_cards::<ReviewCard>(&store).into_inner();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards["あ"].card.stage, 1);
        assert_eq!(cards["あ"].latencies, vec![3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        assert_eq!(cards["う"].glyph, "う");
    }

    #[test]
    fn json_dir_store_round_trip() {
        let tmp = TempDir::new().unwrap();
        let mut store = JsonDirStore::new(tmp.path().join("nested"));
        assert_eq!(store.get(STATS_KEY).unwrap(), None);

        store.set(STATS_KEY, r#"{"correct": 1}"#).unwrap();
        assert!(tmp.path().join("nested/stats.json").exists());
        assert_eq!(load_stats(&store).into_inner().correct, 1);
    }

    #[test]
    fn memory_store_clones_share_data() {
        let a = MemoryStore::new();
        let mut b = a.clone();
        b.set("k", "v").unwrap();
        assert!(a.contains("k"));
        assert_eq!(a.get("k").unwrap().as_deref(), Some("v"));
    }
}
