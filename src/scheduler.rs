//! 复习间隔调度。
//!
//! 会话只通过 [`Scheduler`] 调用调度逻辑：新建卡片、按评分推进、读取到期时间。
//! 卡片内容对会话是不透明的，只会原样存取。

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grade {
    Good,
    Again,
}

impl Grade {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Again => "again",
        }
    }
}

pub trait Scheduler {
    type Card: Clone + std::fmt::Debug + Serialize + DeserializeOwned;

    /// 新卡片，立即到期
    fn new_card(&self, now: DateTime<Utc>) -> Self::Card;

    fn advance(&self, card: &Self::Card, grade: Grade, now: DateTime<Utc>) -> Self::Card;

    /// 到期时间；缺失或无法解析时返回 None
    fn due(&self, card: &Self::Card) -> Option<DateTime<Utc>>;
}

// ---------------- 阶梯式调度 ----------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ReviewCard {
    #[serde(default)]
    pub stage: u8,
    #[serde(default)]
    pub again_streak: u8,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub lapses: u32,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub last_review: Option<String>,
}

pub const DEFAULT_AGAIN_MINUTES: [f64; 3] = [1.0, 10.0, 60.0];
pub const DEFAULT_GOOD_MINUTES: [f64; 7] = [
    10.0,
    1440.0,
    3.0 * 1440.0,
    7.0 * 1440.0,
    16.0 * 1440.0,
    35.0 * 1440.0,
    90.0 * 1440.0,
];
/// 单级间隔上限：100 年
pub const MAX_LADDER_MINUTES: f64 = 100.0 * 365.0 * 1440.0;

/// Good 沿阶梯上升一级；Again 退一级，并按连续答错次数安排短间隔重学。
#[derive(Debug, Clone)]
pub struct LadderScheduler {
    again_minutes: Vec<f64>,
    good_minutes: Vec<f64>,
}

impl Default for LadderScheduler {
    fn default() -> Self {
        Self {
            again_minutes: DEFAULT_AGAIN_MINUTES.to_vec(),
            good_minutes: DEFAULT_GOOD_MINUTES.to_vec(),
        }
    }
}

impl LadderScheduler {
    /// 空阶梯、非正数或超过 100 年的间隔会退回默认值
    pub fn new(again_minutes: Vec<f64>, good_minutes: Vec<f64>) -> Self {
        let valid = |v: &Vec<f64>| {
            !v.is_empty()
                && v
                    .iter()
                    .all(|m| m.is_finite() && *m > 0.0 && *m <= MAX_LADDER_MINUTES)
        };
        Self {
            again_minutes: if valid(&again_minutes) {
                again_minutes
            } else {
                DEFAULT_AGAIN_MINUTES.to_vec()
            },
            good_minutes: if valid(&good_minutes) {
                good_minutes
            } else {
                DEFAULT_GOOD_MINUTES.to_vec()
            },
        }
    }
}

impl Scheduler for LadderScheduler {
    type Card = ReviewCard;

    fn new_card(&self, now: DateTime<Utc>) -> ReviewCard {
        ReviewCard {
            due: Some(to_rfc3339(now)),
            ..Default::default()
        }
    }

    fn advance(&self, card: &ReviewCard, grade: Grade, now: DateTime<Utc>) -> ReviewCard {
        let mut next = card.clone();
        let minutes = match grade {
            Grade::Again => {
                next.again_streak = next
                    .again_streak
                    .saturating_add(1)
                    .min(self.again_minutes.len() as u8);
                next.stage = next.stage.saturating_sub(1);
                next.lapses = next.lapses.saturating_add(1);
                self.again_minutes[(next.again_streak as usize).saturating_sub(1)]
            }
            Grade::Good => {
                next.again_streak = 0;
                let i = (next.stage as usize).min(self.good_minutes.len() - 1);
                next.stage = next.stage.saturating_add(1);
                self.good_minutes[i]
            }
        };
        next.reps = next.reps.saturating_add(1);
        next.due = Some(to_rfc3339(due_after(now, minutes)));
        next.last_review = Some(to_rfc3339(now));
        next
    }

    fn due(&self, card: &ReviewCard) -> Option<DateTime<Utc>> {
        card.due.as_deref().and_then(parse_rfc3339)
    }
}

pub fn parse_rfc3339(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn to_rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// 超出 chrono 可表示范围时退回 `now`
fn due_after(now: DateTime<Utc>, minutes: f64) -> DateTime<Utc> {
    let secs = (minutes.min(MAX_LADDER_MINUTES) * 60.0).max(0.0);
    chrono::Duration::try_seconds(secs as i64)
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(now)
}

/// 把下次到期时间格式化成简短文本：now / 5m / 3h / 2d / 1w / 4mo / 1y
pub fn format_interval(due: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let ms = (due - now).num_milliseconds() as f64;
    let minutes = (ms / 60_000.0).round();
    let hours = (ms / 3_600_000.0).round();
    let days = (ms / 86_400_000.0).round();
    let weeks = (ms / (86_400_000.0 * 7.0)).round();
    let months = (ms / (86_400_000.0 * 30.0)).round();

    if minutes < 1.0 {
        "now".to_string()
    } else if minutes < 60.0 {
        format!("{}m", minutes)
    } else if hours < 24.0 {
        format!("{}h", hours)
    } else if days < 7.0 {
        format!("{}d", days)
    } else if weeks < 4.0 {
        format!("{}w", weeks)
    } else if months < 12.0 {
        format!("{}mo", months)
    } else {
        format!("{}y", (ms / (86_400_000.0 * 365.0)).round())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn new_card_is_due_immediately() {
        let s = LadderScheduler::default();
        let now = Utc::now();
        let card = s.new_card(now);
        let due = s.due(&card).unwrap();
        assert!(due <= now);
        assert_eq!(card.reps, 0);
    }

    #[test]
    fn good_climbs_the_ladder() {
        let s = LadderScheduler::default();
        let now = Utc::now();
        let c1 = s.advance(&s.new_card(now), Grade::Good, now);
        assert_eq!(c1.stage, 1);
        assert_eq!(s.due(&c1).unwrap() - now, Duration::minutes(10));

        let c2 = s.advance(&c1, Grade::Good, now);
        assert_eq!(c2.stage, 2);
        assert_eq!(s.due(&c2).unwrap() - now, Duration::days(1));
        assert_eq!(c2.reps, 2);
    }

    #[test]
    fn top_of_ladder_repeats_last_interval() {
        let s = LadderScheduler::new(vec![1.0], vec![5.0, 30.0]);
        let now = Utc::now();
        let mut c = s.new_card(now);
        for _ in 0..5 {
            c = s.advance(&c, Grade::Good, now);
        }
        assert_eq!(s.due(&c).unwrap() - now, Duration::minutes(30));
    }

    #[test]
    fn again_drops_a_stage_and_escalates_relearn_step() {
        let s = LadderScheduler::default();
        let now = Utc::now();
        let mut c = s.new_card(now);
        c = s.advance(&c, Grade::Good, now);
        c = s.advance(&c, Grade::Good, now);
        assert_eq!(c.stage, 2);

        let a1 = s.advance(&c, Grade::Again, now);
        assert_eq!(a1.stage, 1);
        assert_eq!(a1.lapses, 1);
        assert_eq!(s.due(&a1).unwrap() - now, Duration::minutes(1));

        let a2 = s.advance(&a1, Grade::Again, now);
        assert_eq!(a2.again_streak, 2);
        assert_eq!(s.due(&a2).unwrap() - now, Duration::minutes(10));

        let a4 = s.advance(&s.advance(&a2, Grade::Again, now), Grade::Again, now);
        assert_eq!(a4.again_streak, 3);
        assert_eq!(s.due(&a4).unwrap() - now, Duration::minutes(60));

        let g = s.advance(&a4, Grade::Good, now);
        assert_eq!(g.again_streak, 0);
    }

    #[test]
    fn malformed_due_reads_as_none() {
        let s = LadderScheduler::default();
        let card = ReviewCard {
            due: Some("not a date".into()),
            ..Default::default()
        };
        assert_eq!(s.due(&card), None);
        assert_eq!(s.due(&ReviewCard::default()), None);
    }

    #[test]
    fn invalid_ladders_fall_back_to_defaults() {
        let s = LadderScheduler::new(vec![], vec![-1.0]);
        let now = Utc::now();
        let c = s.advance(&s.new_card(now), Grade::Good, now);
        assert_eq!(s.due(&c).unwrap() - now, Duration::minutes(10));
    }

    #[test]
    fn oversized_rungs_fall_back_to_defaults() {
        let s = LadderScheduler::new(vec![1.0], vec![1e13]);
        let now = Utc::now();
        let c = s.advance(&s.new_card(now), Grade::Good, now);
        assert_eq!(s.due(&c).unwrap() - now, Duration::minutes(10));

        let s = LadderScheduler::new(vec![f64::MAX], vec![MAX_LADDER_MINUTES]);
        let c = s.advance(&s.new_card(now), Grade::Again, now);
        assert_eq!(s.due(&c).unwrap() - now, Duration::minutes(1));
    }

    #[test]
    fn due_never_overflows_near_the_end_of_time() {
        let late = DateTime::<Utc>::MAX_UTC - Duration::days(1);
        assert_eq!(due_after(late, MAX_LADDER_MINUTES), late);
        assert_eq!(due_after(late, f64::INFINITY), late);
    }

    #[test]
    fn interval_text() {
        let now = Utc::now();
        assert_eq!(format_interval(now, now), "now");
        assert_eq!(format_interval(now - Duration::hours(1), now), "now");
        assert_eq!(format_interval(now + Duration::minutes(10), now), "10m");
        assert_eq!(format_interval(now + Duration::hours(3), now), "3h");
        assert_eq!(format_interval(now + Duration::days(2), now), "2d");
        assert_eq!(format_interval(now + Duration::days(14), now), "2w");
        assert_eq!(format_interval(now + Duration::days(90), now), "3mo");
        assert_eq!(format_interval(now + Duration::days(800), now), "2y");
    }
}
