//! The reward service: one entry point for task completion and the read
//! accessors display surfaces use.
//!
//! `complete_task` runs an explicit ordered pipeline:
//!
//! 1. validate the task and gather calendar-day completion facts
//! 2. update the streak and stats
//! 3. earn minutes through the ledger (streak multiplier applied)
//! 4. record the completion (category snapshotted)
//! 5. run one achievement pass (bonus payouts append to the ledger)
//! 6. distribute the earned minutes into app limits
//!
//! Steps run in that order inside a per-service mutex; a failing step
//! propagates its error and earlier steps stay committed (no rollback).

use std::sync::Mutex;

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::rewards::achievements::{Achievement, AchievementEngine};
use crate::rewards::allocation::{AllocationDistributor, AllocationShare};
use crate::rewards::ledger::{BalanceLedger, RewardBalance, RewardTransaction};
use crate::rewards::streak::{StreakBonus, StreakTracker, StreakUpdate};
use crate::storage::{Database, UserStats};
use crate::task::{CompletedTask, TaskCatalog};

/// Everything a completion produced, for display surfaces.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub completion: CompletedTask,
    pub streak: StreakUpdate,
    /// Minutes credited, after the streak multiplier.
    pub final_amount: u32,
    /// Portion of `final_amount` contributed by the streak bonus.
    pub bonus_applied: u32,
    pub newly_unlocked: Vec<Achievement>,
    pub allocations: Vec<AllocationShare>,
    pub events: Vec<Event>,
}

/// Snapshot of reward state for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsSummary {
    pub balance: RewardBalance,
    pub recent_transactions: Vec<RewardTransaction>,
    pub unlocked_achievements: Vec<Achievement>,
    pub current_streak_bonus: Option<StreakBonus>,
    pub stats: UserStats,
}

/// Reward operations scoped to one user, over an injected database handle.
pub struct RewardService<'a> {
    db: &'a Database,
    user_id: String,
    catalog: TaskCatalog,
    streaks: StreakTracker,
    // Serializes the completion pipeline: the stats update is a
    // read-modify-write and two in-flight completions would lose one.
    pipeline: Mutex<()>,
}

impl<'a> RewardService<'a> {
    pub fn new(db: &'a Database, user_id: impl Into<String>) -> Self {
        Self {
            db,
            user_id: user_id.into(),
            catalog: TaskCatalog::new(),
            streaks: StreakTracker::new(),
            pipeline: Mutex::new(()),
        }
    }

    /// Replace the default catalog (custom tasks, tests).
    pub fn with_catalog(mut self, catalog: TaskCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Seed per-user state (achievement catalog) if absent.
    pub fn initialize(&self) -> Result<()> {
        AchievementEngine::new(self.db, &self.user_id).initialize()
    }

    pub fn catalog(&self) -> &TaskCatalog {
        &self.catalog
    }

    fn ledger(&self) -> BalanceLedger<'a> {
        BalanceLedger::new(self.db, self.user_id.clone())
    }

    /// Count completions during one user-local calendar day.
    fn completions_on(&self, date: NaiveDate) -> Result<u32> {
        let Some(midnight) = date.and_hms_opt(0, 0, 0) else {
            return Ok(0);
        };
        // DST gaps at midnight fall back to treating the naive time as UTC.
        let start = match midnight.and_local_timezone(Local).earliest() {
            Some(dt) => dt.with_timezone(&Utc),
            None => DateTime::<Utc>::from_naive_utc_and_offset(midnight, Utc),
        };
        let end = start + Duration::days(1);
        self.db
            .count_completions_in_range(&self.user_id, start, end)
            .map_err(Into::into)
    }

    /// Complete a mindful task and run the full reward pipeline.
    #[instrument(skip(self, photo_uri, notes), fields(user = %self.user_id))]
    pub fn complete_task(
        &self,
        task_id: &str,
        photo_uri: Option<String>,
        notes: Option<String>,
    ) -> Result<CompletionOutcome> {
        let _guard = self.pipeline.lock().unwrap_or_else(|e| e.into_inner());

        let task = self
            .catalog
            .get(task_id)
            .ok_or_else(|| ValidationError::UnknownTask(task_id.to_string()))?
            .clone();
        task.validate_completion(photo_uri.as_deref())?;

        // Day facts must be read before this completion is recorded.
        let today = Local::now().date_naive();
        let had_completion_today = self.completions_on(today)? > 0;
        let had_completion_yesterday = self.completions_on(today - Duration::days(1))? > 0;

        let mut events = Vec::new();
        let now = Utc::now();
        let mut stats = self.db.user_stats(&self.user_id)?;

        // Streak first: the earn step reads the updated streak.
        let streak = self.streaks.on_completion(
            stats.current_streak,
            stats.longest_streak,
            had_completion_yesterday,
            had_completion_today,
        );
        stats.current_streak = streak.current_streak;
        stats.longest_streak = streak.longest_streak;
        stats.total_tasks_completed += 1;
        stats.tasks_completed_today += 1;
        self.db.update_user_stats(&self.user_id, &stats)?;
        if streak.changed {
            events.push(Event::StreakChanged {
                current_streak: streak.current_streak,
                longest_streak: streak.longest_streak,
                at: now,
            });
        }

        let ledger = self.ledger();
        let earn = ledger.earn(task.time_reward, &task, true)?;
        events.push(Event::TimeEarned {
            minutes: earn.final_amount,
            bonus_applied: earn.bonus_applied,
            transaction_id: earn.transaction.id.clone(),
            at: now,
        });

        let completion = CompletedTask {
            id: Uuid::new_v4().to_string(),
            task_id: task.id.clone(),
            category: task.category,
            completed_at: now,
            time_earned: earn.final_amount,
            photo_uri,
            notes,
        };
        self.db.insert_completed_task(&self.user_id, &completion)?;
        events.push(Event::TaskCompleted {
            task_id: task.id.clone(),
            completion_id: completion.id.clone(),
            time_earned: earn.final_amount,
            at: now,
        });

        stats.total_time_earned += earn.final_amount;
        self.db.update_user_stats(&self.user_id, &stats)?;

        // One achievement pass; a bonus crossing another threshold unlocks
        // on the next completion, not within this call.
        let engine = AchievementEngine::new(self.db, &self.user_id);
        let evaluation = engine.evaluate(&stats, &ledger)?;
        for unlocked in &evaluation.newly_unlocked {
            events.push(Event::AchievementUnlocked {
                achievement_id: unlocked.id.clone(),
                title: unlocked.title.clone(),
                reward_bonus: unlocked.reward_bonus,
                at: now,
            });
        }
        if evaluation.bonus_minutes > 0 {
            stats.total_time_earned += evaluation.bonus_minutes;
            self.db.update_user_stats(&self.user_id, &stats)?;
        }

        let distributor = AllocationDistributor::new(self.db, &self.user_id);
        let allocations = distributor.distribute(earn.final_amount)?;
        for share in &allocations {
            events.push(Event::TimeAllocated {
                app_id: share.app_id.clone(),
                minutes: share.minutes,
                at: now,
            });
            if share.unblocked {
                events.push(Event::AppUnblocked {
                    app_id: share.app_id.clone(),
                    at: now,
                });
            }
        }

        info!(
            task = %task.id,
            earned = earn.final_amount,
            bonus = earn.bonus_applied,
            streak = streak.current_streak,
            unlocked = evaluation.newly_unlocked.len(),
            "task completed"
        );

        Ok(CompletionOutcome {
            completion,
            streak,
            final_amount: earn.final_amount,
            bonus_applied: earn.bonus_applied,
            newly_unlocked: evaluation.newly_unlocked,
            allocations,
            events,
        })
    }

    /// Spend available minutes into an app's allowance.
    ///
    /// Returns `Ok(false)` when the balance is insufficient. On success the
    /// app's daily limit grows by `minutes` and a block is lifted if the new
    /// limit exceeds the used time.
    pub fn spend(&self, app_id: &str, minutes: u32) -> Result<(bool, Vec<Event>)> {
        let app = self
            .db
            .app(&self.user_id, app_id)?
            .ok_or_else(|| ValidationError::UnknownApp(app_id.to_string()))?;

        let ledger = self.ledger();
        let now = Utc::now();
        if !ledger.spend(&app, minutes)? {
            let available = ledger.balance_or_zero().available;
            return Ok((
                false,
                vec![Event::SpendRejected {
                    app_id: app.id,
                    minutes,
                    available,
                    at: now,
                }],
            ));
        }

        let mut events = vec![Event::TimeSpent {
            app_id: app.id.clone(),
            minutes,
            at: now,
        }];

        let new_limit = app.daily_limit + minutes;
        self.db
            .set_app_daily_limit(&self.user_id, &app.id, new_limit)?;
        if app.is_blocked && app.used_time < new_limit {
            self.db.set_app_blocked(&self.user_id, &app.id, false)?;
            events.push(Event::AppUnblocked {
                app_id: app.id.clone(),
                at: now,
            });
        }

        Ok((true, events))
    }

    /// Current balance (explicit read; errors propagate).
    pub fn balance(&self) -> Result<RewardBalance> {
        self.ledger().balance()
    }

    /// Transaction history, most recent first (display default 100).
    pub fn history(&self, limit: Option<u32>) -> Result<Vec<RewardTransaction>> {
        self.ledger().history(limit)
    }

    /// All achievements for this user.
    pub fn achievements(&self) -> Result<Vec<Achievement>> {
        AchievementEngine::new(self.db, &self.user_id).achievements()
    }

    /// The streak bonus tiers.
    pub fn streak_bonuses(&self) -> &[StreakBonus] {
        self.streaks.bonuses()
    }

    /// Reset the streak if neither today nor yesterday saw a completion.
    pub fn reconcile_streak(&self) -> Result<StreakUpdate> {
        let _guard = self.pipeline.lock().unwrap_or_else(|e| e.into_inner());

        let today = Local::now().date_naive();
        let completed_today = self.completions_on(today)? > 0;
        let completed_yesterday = self.completions_on(today - Duration::days(1))? > 0;

        let mut stats = self.db.user_stats(&self.user_id)?;
        let update = self.streaks.reconcile(
            stats.current_streak,
            stats.longest_streak,
            completed_today,
            completed_yesterday,
        );
        if update.changed {
            stats.current_streak = update.current_streak;
            self.db.update_user_stats(&self.user_id, &stats)?;
        }
        Ok(update)
    }

    /// Rewards snapshot for display.
    ///
    /// A passive read: any failing piece degrades to an empty or zero value
    /// instead of surfacing an error.
    pub fn summary(&self) -> RewardsSummary {
        let ledger = self.ledger();
        let balance = ledger.balance_or_zero();
        let recent_transactions = ledger.history(Some(10)).unwrap_or_else(|err| {
            warn!(user = %self.user_id, error = %err, "history read failed");
            Vec::new()
        });
        let unlocked_achievements = self
            .achievements()
            .unwrap_or_else(|err| {
                warn!(user = %self.user_id, error = %err, "achievements read failed");
                Vec::new()
            })
            .into_iter()
            .filter(|a| a.unlocked)
            .collect();
        let stats = self.db.user_stats(&self.user_id).unwrap_or_else(|err| {
            warn!(user = %self.user_id, error = %err, "stats read failed");
            UserStats::default()
        });
        let current_streak_bonus = self.streaks.bonus_for(stats.current_streak).cloned();

        RewardsSummary {
            balance,
            recent_transactions,
            unlocked_achievements,
            current_streak_bonus,
            stats,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}
