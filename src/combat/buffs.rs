//! Buff intervals and the reapplication merge.
//!
//! The same buff (same stat, same amount) reapplied before it expires extends
//! the running interval instead of stacking a second copy.

use serde::{Deserialize, Serialize};

use crate::config::stats::{CharacterStats, Stat};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuffInterval {
    pub stat: Stat,
    pub amount: f64,
    /// Seconds.
    pub start: f64,
    pub end: f64,
}

impl BuffInterval {
    pub fn covers(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }

    fn key(&self) -> (Stat, u64) {
        (self.stat, self.amount.to_bits())
    }
}

/// Merge overlapping or touching intervals of the same `(stat, amount)`.
/// Output is sorted by `(start, end)`. Idempotent.
pub fn merge_buffs(intervals: &[BuffInterval]) -> Vec<BuffInterval> {
    let mut sorted = intervals.to_vec();
    sorted.sort_by(|a, b| {
        a.key()
            .cmp(&b.key())
            .then(a.start.total_cmp(&b.start))
            .then(a.end.total_cmp(&b.end))
    });

    let mut merged: Vec<BuffInterval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(prev) if prev.key() == interval.key() && interval.start <= prev.end => {
                prev.end = prev.end.max(interval.end);
            }
            _ => merged.push(interval),
        }
    }

    merged.sort_by(|a, b| a.start.total_cmp(&b.start).then(a.end.total_cmp(&b.end)));
    merged
}

/// Base stats plus every merged buff active at `time`.
pub fn stats_at(base: &CharacterStats, buffs: &[BuffInterval], time: f64) -> CharacterStats {
    let mut stats = *base;
    for buff in buffs.iter().filter(|b| b.covers(time)) {
        stats.add(buff.stat, buff.amount);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buff(stat: Stat, amount: f64, start: f64, end: f64) -> BuffInterval {
        BuffInterval {
            stat,
            amount,
            start,
            end,
        }
    }

    #[test]
    fn overlapping_reapplications_merge() {
        let merged = merge_buffs(&[
            buff(Stat::Attack, 10.0, 0.0, 5.0),
            buff(Stat::Attack, 10.0, 3.0, 8.0),
            buff(Stat::Attack, 10.0, 8.0, 9.0),
            buff(Stat::Attack, 10.0, 12.0, 13.0),
        ]);
        assert_eq!(
            merged,
            vec![
                buff(Stat::Attack, 10.0, 0.0, 9.0),
                buff(Stat::Attack, 10.0, 12.0, 13.0),
            ]
        );
    }

    #[test]
    fn different_amounts_or_stats_do_not_merge() {
        let merged = merge_buffs(&[
            buff(Stat::Attack, 10.0, 0.0, 5.0),
            buff(Stat::Attack, 20.0, 1.0, 5.0),
            buff(Stat::CritRate, 10.0, 2.0, 5.0),
        ]);
        assert_eq!(merged.len(), 3);
        assert!(merged.windows(2).all(|w| w[0].start <= w[1].start));
    }

    #[test]
    fn merge_is_idempotent() {
        let once = merge_buffs(&[
            buff(Stat::Power, 5.0, 4.0, 6.0),
            buff(Stat::Power, 5.0, 0.0, 4.5),
            buff(Stat::Strength, 3.0, 1.0, 2.0),
            buff(Stat::Power, 5.0, 7.0, 7.5),
        ]);
        assert_eq!(merge_buffs(&once), once);
    }

    #[test]
    fn stats_at_sums_covering_buffs() {
        let base = CharacterStats::default().with(Stat::Attack, 100.0);
        let buffs = [
            buff(Stat::Attack, 10.0, 0.0, 5.0),
            buff(Stat::Attack, 20.0, 5.0, 6.0),
        ];
        assert_eq!(stats_at(&base, &buffs, 5.0)[Stat::Attack], 130.0);
        assert_eq!(stats_at(&base, &buffs, 5.5)[Stat::Attack], 120.0);
        assert_eq!(stats_at(&base, &buffs, 7.0)[Stat::Attack], 100.0);
    }
}
