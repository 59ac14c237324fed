//! FSRS 调度：记忆强度模型，按目标保持率安排下次复习。
//!
//! 持久化用自己的 [`FsrsCard`]，每次推进时与 `rs_fsrs::Card` 互转，
//! 存储格式不受上游结构变动影响。

use chrono::{DateTime, Utc};
use rs_fsrs::{Parameters, Rating, State, FSRS};
use serde::{Deserialize, Serialize};

use crate::scheduler::{parse_rfc3339, to_rfc3339, Grade, Scheduler};

pub const DEFAULT_RETENTION: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardState {
    #[default]
    New,
    Learning,
    Review,
    Relearning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FsrsCard {
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub stability: f64,
    #[serde(default)]
    pub difficulty: f64,
    #[serde(default)]
    pub elapsed_days: i64,
    #[serde(default)]
    pub scheduled_days: i64,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub lapses: u32,
    #[serde(default)]
    pub state: CardState,
    #[serde(default)]
    pub last_review: Option<String>,
}

pub struct FsrsScheduler {
    fsrs: FSRS,
    retention: f64,
}

impl Default for FsrsScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

impl std::fmt::Debug for FsrsScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsrsScheduler")
            .field("retention", &self.retention)
            .finish()
    }
}

impl FsrsScheduler {
    /// 保持率需在 (0, 1) 之间，否则用默认值
    pub fn new(retention: f64) -> Self {
        let retention = if retention.is_finite() && retention > 0.0 && retention < 1.0 {
            retention
        } else {
            log::warn!("保持率 {} 无效，使用 {}", retention, DEFAULT_RETENTION);
            DEFAULT_RETENTION
        };
        Self {
            fsrs: FSRS::new(Parameters {
                request_retention: retention,
                ..Default::default()
            }),
            retention,
        }
    }

    pub fn retention(&self) -> f64 {
        self.retention
    }
}

/// 已复习过的卡片必须带有正的稳定度，否则按新卡处理
fn to_upstream(card: &FsrsCard, now: DateTime<Utc>) -> rs_fsrs::Card {
    let mut out = rs_fsrs::Card {
        due: now,
        last_review: now,
        ..rs_fsrs::Card::new()
    };
    let usable = card.state == CardState::New
        || (card.stability.is_finite()
            && card.stability > 0.0
            && card.difficulty.is_finite());
    out.due = card.due.as_deref().and_then(parse_rfc3339).unwrap_or(now);
    if !usable {
        return out;
    }
    out.stability = card.stability as _;
    out.difficulty = card.difficulty as _;
    out.elapsed_days = card.elapsed_days as _;
    out.scheduled_days = card.scheduled_days as _;
    out.reps = card.reps as _;
    out.lapses = card.lapses as _;
    out.state = match card.state {
        CardState::New => State::New,
        CardState::Learning => State::Learning,
        CardState::Review => State::Review,
        CardState::Relearning => State::Relearning,
    };
    if let Some(t) = card.last_review.as_deref().and_then(parse_rfc3339) {
        out.last_review = t;
    }
    out
}

fn from_upstream(card: &rs_fsrs::Card) -> FsrsCard {
    FsrsCard {
        due: Some(to_rfc3339(card.due)),
        stability: card.stability as f64,
        difficulty: card.difficulty as f64,
        elapsed_days: card.elapsed_days as i64,
        scheduled_days: card.scheduled_days as i64,
        reps: card.reps.max(0) as u32,
        lapses: card.lapses.max(0) as u32,
        state: match card.state {
            State::New => CardState::New,
            State::Learning => CardState::Learning,
            State::Review => CardState::Review,
            State::Relearning => CardState::Relearning,
        },
        last_review: Some(to_rfc3339(card.last_review)),
    }
}

impl Scheduler for FsrsScheduler {
    type Card = FsrsCard;

    fn new_card(&self, now: DateTime<Utc>) -> FsrsCard {
        FsrsCard {
            due: Some(to_rfc3339(now)),
            ..Default::default()
        }
    }

    fn advance(&self, card: &FsrsCard, grade: Grade, now: DateTime<Utc>) -> FsrsCard {
        let rating = match grade {
            Grade::Good => Rating::Good,
            Grade::Again => Rating::Again,
        };
        let next = self.fsrs.next(to_upstream(card, now), now, rating).card;
        from_upstream(&next)
    }

    fn due(&self, card: &FsrsCard) -> Option<DateTime<Utc>> {
        card.due.as_deref().and_then(parse_rfc3339)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_card_is_due_now() {
        let s = FsrsScheduler::default();
        let now = Utc::now();
        let card = s.new_card(now);
        assert_eq!(s.due(&card), Some(now));
        assert_eq!(card.state, CardState::New);
        assert_eq!(card.reps, 0);
    }

    #[test]
    fn again_comes_back_sooner_than_good() {
        let s = FsrsScheduler::default();
        let now = Utc::now();
        let fresh = s.new_card(now);

        let good = s.advance(&fresh, Grade::Good, now);
        let again = s.advance(&fresh, Grade::Again, now);
        let good_due = s.due(&good).unwrap();
        let again_due = s.due(&again).unwrap();

        assert!(again_due > now);
        assert!(again_due < good_due);
        assert_ne!(good.state, CardState::New);
        assert_eq!(good.reps, 1);
        assert_eq!(again.reps, 1);
    }

    #[test]
    fn repeated_good_stretches_the_interval() {
        let s = FsrsScheduler::default();
        let t0 = Utc::now();
        let c1 = s.advance(&s.new_card(t0), Grade::Good, t0);
        let t1 = s.due(&c1).unwrap();
        let c2 = s.advance(&c1, Grade::Good, t1);
        let t2 = s.due(&c2).unwrap();

        assert!(t2 - t1 > t1 - t0);
        assert_eq!(c2.reps, 2);
    }

    #[test]
    fn survives_a_json_round_trip() {
        let s = FsrsScheduler::default();
        let now = Utc::now();
        let card = s.advance(&s.new_card(now), Grade::Good, now);

        let json = serde_json::to_string(&card).unwrap();
        let back: FsrsCard = serde_json::from_str(&json).unwrap();
        assert_eq!(s.due(&back), s.due(&card));
        assert_eq!(back.state, card.state);

        let later = s.due(&back).unwrap();
        let next = s.advance(&back, Grade::Good, later);
        assert_eq!(next.reps, 2);
        assert!(s.due(&next).unwrap() > later);
    }

    #[test]
    fn ladder_records_load_as_new_cards() {
        let s = FsrsScheduler::default();
        let card: FsrsCard =
            serde_json::from_str(r#"{"stage": 3, "due": "2024-01-01T00:00:00Z"}"#).unwrap();
        assert_eq!(card.state, CardState::New);
        assert!(s.due(&card).is_some());
    }

    #[test]
    fn broken_review_state_is_treated_as_new() {
        let s = FsrsScheduler::default();
        let now = Utc::now();
        let broken = FsrsCard {
            due: Some("garbage".into()),
            stability: -1.0,
            state: CardState::Review,
            reps: 9,
            ..Default::default()
        };
        assert_eq!(s.due(&broken), None);
        let next = s.advance(&broken, Grade::Good, now);
        assert!(s.due(&next).unwrap() > now);
        assert_eq!(next.reps, 1);
    }

    #[test]
    fn invalid_retention_uses_default() {
        assert_eq!(FsrsScheduler::new(1.5).retention(), DEFAULT_RETENTION);
        assert_eq!(FsrsScheduler::new(f64::NAN).retention(), DEFAULT_RETENTION);
        assert_eq!(FsrsScheduler::new(0.9).retention(), 0.9);
    }
}
