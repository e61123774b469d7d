use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every state change in the system produces an Event.
/// Display surfaces consume the events returned by mutating operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TaskCompleted {
        task_id: String,
        completion_id: String,
        time_earned: u32,
        at: DateTime<Utc>,
    },
    TimeEarned {
        minutes: u32,
        bonus_applied: u32,
        transaction_id: String,
        at: DateTime<Utc>,
    },
    TimeSpent {
        app_id: String,
        minutes: u32,
        at: DateTime<Utc>,
    },
    /// A spend was rejected because the available balance was too low.
    SpendRejected {
        app_id: String,
        minutes: u32,
        available: u32,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        achievement_id: String,
        title: String,
        reward_bonus: u32,
        at: DateTime<Utc>,
    },
    StreakChanged {
        current_streak: u32,
        longest_streak: u32,
        at: DateTime<Utc>,
    },
    /// Earned minutes were distributed into an app's daily limit.
    TimeAllocated {
        app_id: String,
        minutes: u32,
        at: DateTime<Utc>,
    },
    AppBlocked {
        app_id: String,
        at: DateTime<Utc>,
    },
    AppUnblocked {
        app_id: String,
        at: DateTime<Utc>,
    },
}
