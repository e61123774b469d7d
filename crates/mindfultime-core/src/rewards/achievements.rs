//! Achievement catalog and unlock engine.
//!
//! Achievements are created once per user from a fixed catalog and only ever
//! transition locked -> unlocked. Unlocking is idempotent: an unlocked
//! achievement is never re-evaluated, never re-locked, and never pays its
//! bonus twice, even if the triggering stat later decreases (a streak
//! reset, for example).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::rewards::ledger::BalanceLedger;
use crate::storage::{Database, UserStats};
use crate::task::TaskCategory;

/// What an achievement's requirement threshold is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    /// Total completed activities.
    TasksCompleted,
    /// Total minutes earned (task rewards and achievement bonuses).
    TimeEarned,
    /// Current consecutive-day streak.
    Streak,
    /// Completed activities in one category.
    CategoryMaster,
}

impl AchievementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementKind::TasksCompleted => "tasks_completed",
            AchievementKind::TimeEarned => "time_earned",
            AchievementKind::Streak => "streak",
            AchievementKind::CategoryMaster => "category_master",
        }
    }

    pub fn parse(s: &str) -> AchievementKind {
        match s {
            "time_earned" => AchievementKind::TimeEarned,
            "streak" => AchievementKind::Streak,
            "category_master" => AchievementKind::CategoryMaster,
            _ => AchievementKind::TasksCompleted,
        }
    }
}

/// An achievement in a user's catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    /// Threshold against the stat selected by `kind`.
    pub requirement: u32,
    pub kind: AchievementKind,
    /// Only set for `CategoryMaster`.
    pub category: Option<TaskCategory>,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
    /// Minutes credited on unlock; 0 means no payout.
    pub reward_bonus: u32,
}

/// The fixed achievement catalog seeded for every user.
pub fn default_achievements() -> Vec<Achievement> {
    fn achievement(
        id: &str,
        title: &str,
        description: &str,
        icon: &str,
        requirement: u32,
        kind: AchievementKind,
        category: Option<TaskCategory>,
        reward_bonus: u32,
    ) -> Achievement {
        Achievement {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            requirement,
            kind,
            category,
            unlocked: false,
            unlocked_at: None,
            reward_bonus,
        }
    }

    vec![
        achievement(
            "first_task",
            "First Step",
            "Complete your first activity",
            "star",
            1,
            AchievementKind::TasksCompleted,
            None,
            10,
        ),
        achievement(
            "task_master_10",
            "Dedicated Beginner",
            "Complete 10 activities",
            "trophy",
            10,
            AchievementKind::TasksCompleted,
            None,
            30,
        ),
        achievement(
            "task_master_50",
            "Mindfulness Expert",
            "Complete 50 activities",
            "medal",
            50,
            AchievementKind::TasksCompleted,
            None,
            100,
        ),
        achievement(
            "time_earner_100",
            "Time Winner",
            "Earn 100 minutes",
            "clock",
            100,
            AchievementKind::TimeEarned,
            None,
            20,
        ),
        achievement(
            "time_earner_500",
            "Master of Time",
            "Earn 500 minutes",
            "hourglass",
            500,
            AchievementKind::TimeEarned,
            None,
            50,
        ),
        achievement(
            "streak_7",
            "Perfect Week",
            "Keep a 7-day streak",
            "flame",
            7,
            AchievementKind::Streak,
            None,
            50,
        ),
        achievement(
            "streak_30",
            "Month of Discipline",
            "Keep a 30-day streak",
            "bonfire",
            30,
            AchievementKind::Streak,
            None,
            200,
        ),
        achievement(
            "outdoor_master",
            "Nature Lover",
            "Complete 20 outdoor activities",
            "tree",
            20,
            AchievementKind::CategoryMaster,
            Some(TaskCategory::Outdoor),
            40,
        ),
        achievement(
            "meditation_master",
            "Zen Master",
            "Complete 20 meditation sessions",
            "lotus",
            20,
            AchievementKind::CategoryMaster,
            Some(TaskCategory::Meditation),
            40,
        ),
    ]
}

/// Result of one evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct EvaluationOutcome {
    pub newly_unlocked: Vec<Achievement>,
    /// Total bonus minutes paid out by this pass.
    pub bonus_minutes: u32,
}

/// Evaluates unlock conditions for one user's achievement catalog.
///
/// Each call is a single pass over the locked achievements. A bonus payout
/// inside the pass can push `time_earned` past another achievement's
/// threshold; that cascade is NOT chased to a fixed point within the call
/// and resolves on the next evaluation.
pub struct AchievementEngine<'a> {
    db: &'a Database,
    user_id: String,
}

impl<'a> AchievementEngine<'a> {
    pub fn new(db: &'a Database, user_id: impl Into<String>) -> Self {
        Self {
            db,
            user_id: user_id.into(),
        }
    }

    /// Seed the catalog for this user if it is empty.
    pub fn initialize(&self) -> Result<()> {
        if self.db.achievements(&self.user_id)?.is_empty() {
            self.db
                .seed_achievements(&self.user_id, &default_achievements())?;
        }
        Ok(())
    }

    /// All achievements for this user, locked and unlocked.
    pub fn achievements(&self) -> Result<Vec<Achievement>> {
        self.db.achievements(&self.user_id).map_err(Into::into)
    }

    /// Run one unlock pass against the current stats.
    ///
    /// Newly satisfied achievements flip to unlocked and any non-zero
    /// `reward_bonus` is appended to the ledger as a bonus transaction.
    pub fn evaluate(
        &self,
        stats: &UserStats,
        ledger: &BalanceLedger,
    ) -> Result<EvaluationOutcome> {
        let mut outcome = EvaluationOutcome::default();
        let now = Utc::now();

        for mut achievement in self.db.achievements(&self.user_id)? {
            if achievement.unlocked {
                continue;
            }

            let satisfied = match achievement.kind {
                AchievementKind::TasksCompleted => {
                    stats.total_tasks_completed >= achievement.requirement
                }
                AchievementKind::TimeEarned => stats.total_time_earned >= achievement.requirement,
                AchievementKind::Streak => stats.current_streak >= achievement.requirement,
                AchievementKind::CategoryMaster => match achievement.category {
                    Some(category) => {
                        self.db.count_completions_in_category(&self.user_id, category)?
                            >= achievement.requirement
                    }
                    None => false,
                },
            };

            if !satisfied {
                continue;
            }

            self.db
                .mark_achievement_unlocked(&self.user_id, &achievement.id, now)?;
            achievement.unlocked = true;
            achievement.unlocked_at = Some(now);

            if achievement.reward_bonus > 0 {
                ledger.credit_bonus(achievement.reward_bonus, &achievement.title)?;
                outcome.bonus_minutes += achievement.reward_bonus;
            }

            info!(
                user = %self.user_id,
                achievement = %achievement.id,
                bonus = achievement.reward_bonus,
                "achievement unlocked"
            );
            outcome.newly_unlocked.push(achievement);
        }

        Ok(outcome)
    }
}
