//! The reward balance ledger.
//!
//! An append-only log of reward transactions with a balance that is derived
//! from the log on every read. Nothing caches the balance: `totalEarned`,
//! `spent`, and `pendingAllocation` are SQL aggregates, and
//! `available = max(0, totalEarned - spent - pendingAllocation)`.
//!
//! Spending is overdraft-protected: a spend that exceeds the available
//! balance returns `false` without mutating anything. That outcome is an
//! expected result, not an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::limits::App;
use crate::rewards::streak::StreakTracker;
use crate::storage::Database;
use crate::task::MindfulTask;

/// Kind of ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Minutes earned by completing a task (streak bonus folded in).
    Earned,
    /// Minutes spent into an app's allowance.
    Spent,
    /// Minutes granted by an achievement unlock.
    Bonus,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Earned => "earned",
            TransactionKind::Spent => "spent",
            TransactionKind::Bonus => "bonus",
        }
    }

    pub fn parse(s: &str) -> TransactionKind {
        match s {
            "spent" => TransactionKind::Spent,
            "bonus" => TransactionKind::Bonus,
            _ => TransactionKind::Earned,
        }
    }
}

/// One immutable entry in the reward ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardTransaction {
    pub id: String,
    pub kind: TransactionKind,
    /// Minutes, always non-negative.
    pub amount: u32,
    pub reason: String,
    pub task_id: Option<String>,
    pub app_id: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

/// Derived balance over the transaction log and open allocations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardBalance {
    /// Sum of earned and bonus transactions.
    pub total_earned: u32,
    /// Minutes ready to spend.
    pub available: u32,
    /// Sum of spent transactions.
    pub spent: u32,
    /// Minutes in open allocations, not yet consumed by usage.
    pub pending_allocation: u32,
}

/// Minutes granted to an app, pending consumption by real usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardAllocation {
    pub app_id: String,
    pub minutes: u32,
    pub allocated_at: DateTime<Utc>,
}

/// Result of an earn operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EarnOutcome {
    /// Minutes credited, after the streak multiplier.
    pub final_amount: u32,
    /// Portion of `final_amount` contributed by the streak bonus.
    pub bonus_applied: u32,
    pub transaction: RewardTransaction,
}

/// Append-only reward ledger scoped to one user.
pub struct BalanceLedger<'a> {
    db: &'a Database,
    user_id: String,
    streaks: StreakTracker,
}

impl<'a> BalanceLedger<'a> {
    pub fn new(db: &'a Database, user_id: impl Into<String>) -> Self {
        Self {
            db,
            user_id: user_id.into(),
            streaks: StreakTracker::new(),
        }
    }

    /// Credit minutes earned by completing `task`.
    ///
    /// With `apply_streak_bonus` the user's current streak selects a bonus
    /// tier and the credited amount becomes `floor(minutes * multiplier)`.
    /// Appends a single earned transaction.
    pub fn earn(
        &self,
        minutes: u32,
        task: &MindfulTask,
        apply_streak_bonus: bool,
    ) -> Result<EarnOutcome> {
        let (final_amount, bonus_applied) = if apply_streak_bonus {
            let stats = self.db.user_stats(&self.user_id)?;
            self.streaks.apply_bonus(minutes, stats.current_streak)
        } else {
            (minutes, 0)
        };

        let description = if bonus_applied > 0 {
            format!("{minutes} minutes + {bonus_applied} streak bonus")
        } else {
            format!("{minutes} minutes")
        };

        let transaction = RewardTransaction {
            id: Uuid::new_v4().to_string(),
            kind: TransactionKind::Earned,
            amount: final_amount,
            reason: format!("Completed: {}", task.title),
            task_id: Some(task.id.clone()),
            app_id: None,
            timestamp: Utc::now(),
            description,
        };
        self.db.insert_transaction(&self.user_id, &transaction)?;

        debug!(
            user = %self.user_id,
            task = %task.id,
            final_amount,
            bonus_applied,
            "earned reward minutes"
        );

        Ok(EarnOutcome {
            final_amount,
            bonus_applied,
            transaction,
        })
    }

    /// Spend minutes into `app`'s allowance.
    ///
    /// Returns `Ok(false)` without mutating anything when the available
    /// balance is below `minutes`. On success appends a spent transaction
    /// and consumes open allocations oldest-first, so the pending total
    /// drops by `min(pending, minutes)` and never goes negative.
    pub fn spend(&self, app: &App, minutes: u32) -> Result<bool> {
        let balance = self.balance()?;
        if balance.available < minutes {
            debug!(
                user = %self.user_id,
                app = %app.id,
                minutes,
                available = balance.available,
                "spend rejected: insufficient balance"
            );
            return Ok(false);
        }

        let transaction = RewardTransaction {
            id: Uuid::new_v4().to_string(),
            kind: TransactionKind::Spent,
            amount: minutes,
            reason: format!("Allocated to {}", app.name),
            task_id: None,
            app_id: Some(app.id.clone()),
            timestamp: Utc::now(),
            description: format!("{minutes} minutes allocated"),
        };
        self.db.insert_transaction(&self.user_id, &transaction)?;
        self.db.consume_allocations(&self.user_id, minutes)?;

        debug!(user = %self.user_id, app = %app.id, minutes, "spent reward minutes");
        Ok(true)
    }

    /// Record a bonus credit from an achievement unlock.
    pub fn credit_bonus(&self, amount: u32, achievement_title: &str) -> Result<RewardTransaction> {
        let transaction = RewardTransaction {
            id: Uuid::new_v4().to_string(),
            kind: TransactionKind::Bonus,
            amount,
            reason: format!("Achievement unlocked: {achievement_title}"),
            task_id: None,
            app_id: None,
            timestamp: Utc::now(),
            description: format!("Bonus {amount} minutes"),
        };
        self.db.insert_transaction(&self.user_id, &transaction)?;
        Ok(transaction)
    }

    /// The derived balance, recomputed from the log and open allocations.
    pub fn balance(&self) -> Result<RewardBalance> {
        let total_earned = self.db.sum_earned(&self.user_id)?;
        let spent = self.db.sum_spent(&self.user_id)?;
        let pending_allocation = self.db.sum_pending_allocations(&self.user_id)?;

        let available =
            (total_earned as i64 - spent as i64 - pending_allocation as i64).max(0) as u32;

        Ok(RewardBalance {
            total_earned,
            available,
            spent,
            pending_allocation,
        })
    }

    /// Balance for passive reads: degrades to a zero balance on failure.
    pub fn balance_or_zero(&self) -> RewardBalance {
        match self.balance() {
            Ok(balance) => balance,
            Err(err) => {
                warn!(user = %self.user_id, error = %err, "balance read failed, returning zero");
                RewardBalance::default()
            }
        }
    }

    /// Transaction history, most recent first.
    ///
    /// The log itself is unbounded; `limit` paginates display and defaults
    /// to the last 100 entries.
    pub fn history(&self, limit: Option<u32>) -> Result<Vec<RewardTransaction>> {
        self.db
            .transactions(&self.user_id, Some(limit.unwrap_or(100)))
            .map_err(Into::into)
    }

    /// Open allocations, most recent first.
    pub fn allocations(&self) -> Result<Vec<RewardAllocation>> {
        self.db.allocations(&self.user_id).map_err(Into::into)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::AppCategory;
    use crate::storage::UserStats;
    use crate::task::TaskCategory;

    fn sample_task() -> MindfulTask {
        MindfulTask {
            id: "reading_book".to_string(),
            title: "Read a Book".to_string(),
            description: "Read for 30 minutes".to_string(),
            category: TaskCategory::Reading,
            time_reward: 30,
            icon: "book".to_string(),
            requires_photo: false,
        }
    }

    fn sample_app() -> App {
        App {
            id: "app-1".to_string(),
            name: "ChatterBox".to_string(),
            package_name: "com.example.chatterbox".to_string(),
            category: AppCategory::SocialMedia,
            daily_limit: 60,
            used_time: 0,
            is_blocked: false,
        }
    }

    #[test]
    fn earn_without_streak_credits_base_amount() {
        let db = Database::open_memory().unwrap();
        let ledger = BalanceLedger::new(&db, "u1");

        let outcome = ledger.earn(30, &sample_task(), true).unwrap();
        assert_eq!(outcome.final_amount, 30);
        assert_eq!(outcome.bonus_applied, 0);

        let balance = ledger.balance().unwrap();
        assert_eq!(balance.total_earned, 30);
        assert_eq!(balance.available, 30);
    }

    #[test]
    fn earn_applies_streak_multiplier() {
        let db = Database::open_memory().unwrap();
        let mut stats = UserStats::default();
        stats.current_streak = 7;
        db.update_user_stats("u1", &stats).unwrap();

        let ledger = BalanceLedger::new(&db, "u1");
        let outcome = ledger.earn(20, &sample_task(), true).unwrap();
        assert_eq!(outcome.final_amount, 25);
        assert_eq!(outcome.bonus_applied, 5);
        assert_eq!(ledger.balance().unwrap().available, 25);
    }

    #[test]
    fn spend_rejects_overdraft_without_mutation() {
        let db = Database::open_memory().unwrap();
        let ledger = BalanceLedger::new(&db, "u1");
        ledger.earn(10, &sample_task(), false).unwrap();

        assert!(!ledger.spend(&sample_app(), 15).unwrap());
        let balance = ledger.balance().unwrap();
        assert_eq!(balance.available, 10);
        assert_eq!(balance.spent, 0);
        assert_eq!(ledger.history(None).unwrap().len(), 1);
    }

    #[test]
    fn spend_decrements_available_exactly() {
        let db = Database::open_memory().unwrap();
        let ledger = BalanceLedger::new(&db, "u1");
        ledger.earn(40, &sample_task(), false).unwrap();

        assert!(ledger.spend(&sample_app(), 15).unwrap());
        let balance = ledger.balance().unwrap();
        assert_eq!(balance.available, 25);
        assert_eq!(balance.spent, 15);
    }

    #[test]
    fn spend_consumes_pending_allocations_floored_at_zero() {
        let db = Database::open_memory().unwrap();
        let ledger = BalanceLedger::new(&db, "u1");
        ledger.earn(100, &sample_task(), false).unwrap();

        db.add_allocation(
            "u1",
            &RewardAllocation {
                app_id: "app-1".to_string(),
                minutes: 10,
                allocated_at: Utc::now(),
            },
        )
        .unwrap();
        assert_eq!(ledger.balance().unwrap().pending_allocation, 10);

        assert!(ledger.spend(&sample_app(), 30).unwrap());
        let balance = ledger.balance().unwrap();
        assert_eq!(balance.pending_allocation, 0);
        assert_eq!(balance.spent, 30);
        assert_eq!(balance.available, 70);
    }

    #[test]
    fn history_is_most_recent_first() {
        let db = Database::open_memory().unwrap();
        let ledger = BalanceLedger::new(&db, "u1");
        for _ in 0..3 {
            ledger.earn(5, &sample_task(), false).unwrap();
        }
        let history = ledger.history(Some(2)).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].timestamp >= history[1].timestamp);
    }

    #[test]
    fn users_are_isolated() {
        let db = Database::open_memory().unwrap();
        let a = BalanceLedger::new(&db, "alice");
        let b = BalanceLedger::new(&db, "bob");
        a.earn(30, &sample_task(), false).unwrap();

        assert_eq!(a.balance().unwrap().available, 30);
        assert_eq!(b.balance().unwrap().available, 0);
    }
}
