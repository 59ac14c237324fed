use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

/// 选出下一张要出的卡片。
///
/// - 有到期卡片时，在所有到期卡片中等概率随机挑选；
/// - 否则在最早到期的那一批（到期时间完全相同）中随机挑选；
/// - `due_of` 返回 None（到期时间缺失或无法解析）的卡片视为未到期，
///   只有在所有卡片都没有可用到期时间时才会作为候选。
pub fn select_next<'a, T, R>(
    items: &[&'a T],
    now: DateTime<Utc>,
    due_of: impl Fn(&T) -> Option<DateTime<Utc>>,
    rng: &mut R,
) -> Option<&'a T>
where
    R: Rng + ?Sized,
{
    if items.is_empty() {
        return None;
    }

    let dated: Vec<(&'a T, Option<DateTime<Utc>>)> =
        items.iter().map(|&it| (it, due_of(it))).collect();

    let due_now: Vec<&'a T> = dated
        .iter()
        .filter(|(_, due)| due.map(|d| d <= now).unwrap_or(false))
        .map(|(it, _)| *it)
        .collect();
    if !due_now.is_empty() {
        return due_now.choose(rng).copied();
    }

    let soonest = dated.iter().filter_map(|(_, due)| *due).min();
    let candidates: Vec<&'a T> = match soonest {
        Some(min) => dated
            .iter()
            .filter(|(_, due)| *due == Some(min))
            .map(|(it, _)| *it)
            .collect(),
        None => dated.iter().map(|(it, _)| *it).collect(),
    };
    candidates.choose(rng).copied()
}
