//! Consecutive-day streak tracking and the streak bonus tiers.
//!
//! A streak counts distinct calendar days with at least one completed
//! activity. Multiple completions on the same day count that day once.
//! Bonus tiers are not cumulative: only the highest tier at or below the
//! current streak applies.

use serde::{Deserialize, Serialize};

/// A streak bonus tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreakBonus {
    /// Streak length at which this tier activates.
    pub days: u32,
    /// Reward multiplier applied to earned minutes (> 1.0).
    pub multiplier: f64,
    pub description: String,
}

/// The fixed bonus tier table, sorted ascending by days.
pub fn streak_bonuses() -> Vec<StreakBonus> {
    vec![
        StreakBonus {
            days: 3,
            multiplier: 1.1,
            description: "10% bonus for 3 consecutive days".to_string(),
        },
        StreakBonus {
            days: 7,
            multiplier: 1.25,
            description: "25% bonus for 1 week".to_string(),
        },
        StreakBonus {
            days: 14,
            multiplier: 1.5,
            description: "50% bonus for 2 weeks".to_string(),
        },
        StreakBonus {
            days: 30,
            multiplier: 2.0,
            description: "100% bonus for 1 month".to_string(),
        },
    ]
}

/// Result of applying a completion or reconciliation to the streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakUpdate {
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Whether this update changed the current streak.
    pub changed: bool,
}

/// Pure streak arithmetic over calendar-day completion facts.
///
/// The caller supplies what the persistence layer knows: whether any
/// completion already existed today and whether one existed yesterday.
/// Day boundaries are the caller's responsibility (user-local time).
#[derive(Debug, Clone, Default)]
pub struct StreakTracker {
    bonuses: Vec<StreakBonus>,
}

impl StreakTracker {
    pub fn new() -> Self {
        Self {
            bonuses: streak_bonuses(),
        }
    }

    /// Apply a completion that just happened today.
    ///
    /// Extends the streak when yesterday also had a completion, or starts a
    /// fresh streak at 1 when the current streak is 0. A day is counted at
    /// most once: if today already had a completion before this one, the
    /// streak is unchanged. The longest streak never decreases.
    pub fn on_completion(
        &self,
        current_streak: u32,
        longest_streak: u32,
        completed_yesterday: bool,
        already_completed_today: bool,
    ) -> StreakUpdate {
        if already_completed_today {
            return StreakUpdate {
                current_streak,
                longest_streak,
                changed: false,
            };
        }

        let new_current = if completed_yesterday || current_streak == 0 {
            current_streak + 1
        } else {
            // Gap since the last counted day: today restarts the streak.
            1
        };

        StreakUpdate {
            current_streak: new_current,
            longest_streak: longest_streak.max(new_current),
            changed: new_current != current_streak,
        }
    }

    /// Reconcile the streak on a read path without a new completion.
    ///
    /// When neither today nor yesterday has a completion the streak is
    /// broken and resets to 0. Otherwise it is left as-is.
    pub fn reconcile(
        &self,
        current_streak: u32,
        longest_streak: u32,
        completed_today: bool,
        completed_yesterday: bool,
    ) -> StreakUpdate {
        if !completed_today && !completed_yesterday && current_streak != 0 {
            StreakUpdate {
                current_streak: 0,
                longest_streak,
                changed: true,
            }
        } else {
            StreakUpdate {
                current_streak,
                longest_streak,
                changed: false,
            }
        }
    }

    /// The bonus tier for a streak, if any.
    ///
    /// Selects the tier with the largest threshold at or below the streak;
    /// below the first tier there is no bonus.
    pub fn bonus_for(&self, streak_days: u32) -> Option<&StreakBonus> {
        self.bonuses
            .iter()
            .filter(|b| streak_days >= b.days)
            .last()
    }

    /// All bonus tiers, ascending by threshold.
    pub fn bonuses(&self) -> &[StreakBonus] {
        &self.bonuses
    }

    /// Apply the streak multiplier to a base amount of minutes.
    ///
    /// Returns `(final_amount, bonus_applied)` with the final amount floored
    /// per tier policy; without an applicable tier the amount is unchanged.
    pub fn apply_bonus(&self, minutes: u32, streak_days: u32) -> (u32, u32) {
        match self.bonus_for(streak_days) {
            Some(bonus) => {
                let final_amount = (minutes as f64 * bonus.multiplier).floor() as u32;
                (final_amount, final_amount - minutes)
            }
            None => (minutes, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_completion_starts_streak_at_one() {
        let tracker = StreakTracker::new();
        let update = tracker.on_completion(0, 0, false, false);
        assert_eq!(update.current_streak, 1);
        assert_eq!(update.longest_streak, 1);
        assert!(update.changed);
    }

    #[test]
    fn consecutive_days_extend() {
        let tracker = StreakTracker::new();
        let mut current = 0;
        let mut longest = 0;
        for day in 1..=10u32 {
            let update = tracker.on_completion(current, longest, day > 1, false);
            current = update.current_streak;
            longest = update.longest_streak;
            assert_eq!(current, day);
        }
        assert_eq!(longest, 10);
    }

    #[test]
    fn second_completion_same_day_counts_once() {
        let tracker = StreakTracker::new();
        let first = tracker.on_completion(4, 6, true, false);
        assert_eq!(first.current_streak, 5);

        let second = tracker.on_completion(
            first.current_streak,
            first.longest_streak,
            true,
            true,
        );
        assert_eq!(second.current_streak, 5);
        assert!(!second.changed);
    }

    #[test]
    fn missed_day_restarts_at_one() {
        let tracker = StreakTracker::new();
        // Streak of 6, but yesterday had no completion.
        let update = tracker.on_completion(6, 6, false, false);
        assert_eq!(update.current_streak, 1);
        assert_eq!(update.longest_streak, 6);
    }

    #[test]
    fn reconcile_resets_after_gap() {
        let tracker = StreakTracker::new();
        let update = tracker.reconcile(5, 8, false, false);
        assert_eq!(update.current_streak, 0);
        assert_eq!(update.longest_streak, 8);
        assert!(update.changed);

        let kept = tracker.reconcile(5, 8, false, true);
        assert_eq!(kept.current_streak, 5);
        assert!(!kept.changed);
    }

    #[test]
    fn longest_streak_never_decreases() {
        let tracker = StreakTracker::new();
        let mut longest = 0;
        let mut current = 0;
        for (yesterday, today) in [(false, false), (true, false), (false, false), (true, false)] {
            let update = tracker.on_completion(current, longest, yesterday, today);
            assert!(update.longest_streak >= longest);
            current = update.current_streak;
            longest = update.longest_streak;
        }
    }

    #[test]
    fn bonus_tiers_select_highest_applicable() {
        let tracker = StreakTracker::new();
        assert!(tracker.bonus_for(0).is_none());
        assert!(tracker.bonus_for(2).is_none());
        assert_eq!(tracker.bonus_for(3).unwrap().multiplier, 1.1);
        assert_eq!(tracker.bonus_for(6).unwrap().multiplier, 1.1);
        assert_eq!(tracker.bonus_for(7).unwrap().multiplier, 1.25);
        assert_eq!(tracker.bonus_for(14).unwrap().multiplier, 1.5);
        assert_eq!(tracker.bonus_for(29).unwrap().multiplier, 1.5);
        assert_eq!(tracker.bonus_for(30).unwrap().multiplier, 2.0);
        assert_eq!(tracker.bonus_for(365).unwrap().multiplier, 2.0);
    }

    #[test]
    fn bonus_application_floors() {
        let tracker = StreakTracker::new();
        // 20 * 1.25 = 25 exactly
        assert_eq!(tracker.apply_bonus(20, 7), (25, 5));
        // 25 * 1.1 = 27.5 -> 27
        assert_eq!(tracker.apply_bonus(25, 3), (27, 2));
        // Below the first tier: unchanged
        assert_eq!(tracker.apply_bonus(30, 1), (30, 0));
    }
}
