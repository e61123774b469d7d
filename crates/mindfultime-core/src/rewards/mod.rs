//! Reward accounting: ledger, streaks, bonuses, achievements, allocation.
//!
//! A task completion flows through one ordered pipeline:
//! streak update -> ledger earn (with streak multiplier) -> achievement
//! pass -> allocation into app limits. [`RewardService`] owns that pipeline;
//! the pieces are independently usable and independently tested.

mod achievements;
mod allocation;
mod ledger;
mod service;
mod streak;

pub use achievements::{
    default_achievements, Achievement, AchievementEngine, AchievementKind, EvaluationOutcome,
};
pub use allocation::{AllocationDistributor, AllocationShare};
pub use ledger::{
    BalanceLedger, EarnOutcome, RewardAllocation, RewardBalance, RewardTransaction,
    TransactionKind,
};
pub use service::{CompletionOutcome, RewardService, RewardsSummary};
pub use streak::{streak_bonuses, StreakBonus, StreakTracker, StreakUpdate};
