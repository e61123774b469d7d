//! SQLite-based persistence for the reward core.
//!
//! Provides per-user storage for:
//! - Completed activities and user stats
//! - The reward transaction log and open allocations
//! - The achievement catalog and unlock state
//! - Apps under daily limits
//!
//! Every table is keyed by `user_id`; deleting a user removes all of their
//! rows. Balances are never stored: callers derive them from aggregates.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::limits::{App, AppCategory};
use crate::rewards::{
    Achievement, AchievementKind, RewardAllocation, RewardTransaction, TransactionKind,
};
use crate::task::{CompletedTask, TaskCategory};

/// Cumulative per-user statistics.
///
/// All fields are monotonically non-decreasing except `current_streak`
/// (resets on a missed day) and `tasks_completed_today` (reset daily by the
/// caller that owns day rollover).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_tasks_completed: u32,
    pub total_time_earned: u32,
    pub total_time_saved: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub tasks_completed_today: u32,
}

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Build a RewardTransaction from a database row
fn row_to_transaction(row: &rusqlite::Row) -> Result<RewardTransaction, rusqlite::Error> {
    let kind_str: String = row.get(1)?;
    let timestamp_str: String = row.get(6)?;
    Ok(RewardTransaction {
        id: row.get(0)?,
        kind: TransactionKind::parse(&kind_str),
        amount: row.get(2)?,
        reason: row.get(3)?,
        task_id: row.get(4)?,
        app_id: row.get(5)?,
        timestamp: parse_datetime_fallback(&timestamp_str),
        description: row.get(7)?,
    })
}

/// Build an Achievement from a database row
fn row_to_achievement(row: &rusqlite::Row) -> Result<Achievement, rusqlite::Error> {
    let kind_str: String = row.get(5)?;
    let category_str: Option<String> = row.get(6)?;
    let unlocked_at_str: Option<String> = row.get(8)?;
    Ok(Achievement {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        icon: row.get(3)?,
        requirement: row.get(4)?,
        kind: AchievementKind::parse(&kind_str),
        category: category_str.as_deref().map(TaskCategory::parse),
        unlocked: row.get(7)?,
        unlocked_at: unlocked_at_str.as_deref().map(parse_datetime_fallback),
        reward_bonus: row.get(9)?,
    })
}

/// Build an App from a database row
fn row_to_app(row: &rusqlite::Row) -> Result<App, rusqlite::Error> {
    let category_str: String = row.get(3)?;
    Ok(App {
        id: row.get(0)?,
        name: row.get(1)?,
        package_name: row.get(2)?,
        category: AppCategory::parse(&category_str),
        daily_limit: row.get(4)?,
        used_time: row.get(5)?,
        is_blocked: row.get(6)?,
    })
}

/// SQLite database for the reward core.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/mindfultime/mindfultime.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("mindfultime.db");
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS completed_tasks (
                id           TEXT PRIMARY KEY,
                user_id      TEXT NOT NULL,
                task_id      TEXT NOT NULL,
                category     TEXT NOT NULL,
                completed_at TEXT NOT NULL,
                time_earned  INTEGER NOT NULL,
                photo_uri    TEXT,
                notes        TEXT
            );

            CREATE TABLE IF NOT EXISTS user_stats (
                user_id               TEXT PRIMARY KEY,
                total_tasks_completed INTEGER NOT NULL DEFAULT 0,
                total_time_earned     INTEGER NOT NULL DEFAULT 0,
                total_time_saved      INTEGER NOT NULL DEFAULT 0,
                current_streak        INTEGER NOT NULL DEFAULT 0,
                longest_streak        INTEGER NOT NULL DEFAULT 0,
                tasks_completed_today INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS reward_transactions (
                id          TEXT PRIMARY KEY,
                user_id     TEXT NOT NULL,
                kind        TEXT NOT NULL,
                amount      INTEGER NOT NULL,
                reason      TEXT NOT NULL,
                task_id     TEXT,
                app_id      TEXT,
                timestamp   TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS reward_allocations (
                id           TEXT PRIMARY KEY,
                user_id      TEXT NOT NULL,
                app_id       TEXT NOT NULL,
                minutes      INTEGER NOT NULL,
                allocated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS achievements (
                id           TEXT NOT NULL,
                user_id      TEXT NOT NULL,
                title        TEXT NOT NULL,
                description  TEXT NOT NULL,
                icon         TEXT NOT NULL,
                requirement  INTEGER NOT NULL,
                kind         TEXT NOT NULL,
                category     TEXT,
                unlocked     INTEGER NOT NULL DEFAULT 0,
                unlocked_at  TEXT,
                reward_bonus INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (id, user_id)
            );

            CREATE TABLE IF NOT EXISTS apps (
                id           TEXT NOT NULL,
                user_id      TEXT NOT NULL,
                name         TEXT NOT NULL,
                package_name TEXT NOT NULL,
                category     TEXT NOT NULL DEFAULT 'other',
                daily_limit  INTEGER NOT NULL DEFAULT 0,
                used_time    INTEGER NOT NULL DEFAULT 0,
                is_blocked   INTEGER NOT NULL DEFAULT 0,
                PRIMARY KEY (id, user_id)
            );

            -- Indexes for common query patterns
            CREATE INDEX IF NOT EXISTS idx_transactions_user_ts
                ON reward_transactions(user_id, timestamp);
            CREATE INDEX IF NOT EXISTS idx_completed_user_ts
                ON completed_tasks(user_id, completed_at);
            CREATE INDEX IF NOT EXISTS idx_allocations_user
                ON reward_allocations(user_id, allocated_at);",
        )?;
        Ok(())
    }

    // === User stats ===

    /// Read a user's stats; absent rows read as all-zero stats.
    pub fn user_stats(&self, user_id: &str) -> Result<UserStats, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT total_tasks_completed, total_time_earned, total_time_saved,
                        current_streak, longest_streak, tasks_completed_today
                 FROM user_stats WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(UserStats {
                        total_tasks_completed: row.get(0)?,
                        total_time_earned: row.get(1)?,
                        total_time_saved: row.get(2)?,
                        current_streak: row.get(3)?,
                        longest_streak: row.get(4)?,
                        tasks_completed_today: row.get(5)?,
                    })
                },
            )
            .optional()
            .map(|stats| stats.unwrap_or_default())
    }

    /// Write a user's stats (upsert).
    pub fn update_user_stats(&self, user_id: &str, stats: &UserStats) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO user_stats (user_id, total_tasks_completed, total_time_earned,
                                     total_time_saved, current_streak, longest_streak,
                                     tasks_completed_today)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(user_id) DO UPDATE SET
                 total_tasks_completed = excluded.total_tasks_completed,
                 total_time_earned     = excluded.total_time_earned,
                 total_time_saved      = excluded.total_time_saved,
                 current_streak        = excluded.current_streak,
                 longest_streak        = excluded.longest_streak,
                 tasks_completed_today = excluded.tasks_completed_today",
            params![
                user_id,
                stats.total_tasks_completed,
                stats.total_time_earned,
                stats.total_time_saved,
                stats.current_streak,
                stats.longest_streak,
                stats.tasks_completed_today,
            ],
        )?;
        Ok(())
    }

    // === Completed tasks ===

    pub fn insert_completed_task(
        &self,
        user_id: &str,
        task: &CompletedTask,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO completed_tasks (id, user_id, task_id, category, completed_at,
                                          time_earned, photo_uri, notes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                task.id,
                user_id,
                task.task_id,
                task.category.as_str(),
                task.completed_at.to_rfc3339(),
                task.time_earned,
                task.photo_uri,
                task.notes,
            ],
        )?;
        Ok(())
    }

    /// Completed tasks, most recent first.
    pub fn completed_tasks(&self, user_id: &str) -> Result<Vec<CompletedTask>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, task_id, category, completed_at, time_earned, photo_uri, notes
             FROM completed_tasks WHERE user_id = ?1 ORDER BY completed_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            let category_str: String = row.get(2)?;
            let completed_at_str: String = row.get(3)?;
            Ok(CompletedTask {
                id: row.get(0)?,
                task_id: row.get(1)?,
                category: TaskCategory::parse(&category_str),
                completed_at: parse_datetime_fallback(&completed_at_str),
                time_earned: row.get(4)?,
                photo_uri: row.get(5)?,
                notes: row.get(6)?,
            })
        })?;
        rows.collect()
    }

    /// Count completions with `from <= completed_at < to`.
    pub fn count_completions_in_range(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u32, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM completed_tasks
             WHERE user_id = ?1 AND completed_at >= ?2 AND completed_at < ?3",
            params![user_id, from.to_rfc3339(), to.to_rfc3339()],
            |row| row.get(0),
        )
    }

    /// Count completions whose snapshotted category matches.
    pub fn count_completions_in_category(
        &self,
        user_id: &str,
        category: TaskCategory,
    ) -> Result<u32, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COUNT(*) FROM completed_tasks WHERE user_id = ?1 AND category = ?2",
            params![user_id, category.as_str()],
            |row| row.get(0),
        )
    }

    // === Reward transactions ===

    pub fn insert_transaction(
        &self,
        user_id: &str,
        transaction: &RewardTransaction,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO reward_transactions (id, user_id, kind, amount, reason, task_id,
                                              app_id, timestamp, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                transaction.id,
                user_id,
                transaction.kind.as_str(),
                transaction.amount,
                transaction.reason,
                transaction.task_id,
                transaction.app_id,
                transaction.timestamp.to_rfc3339(),
                transaction.description,
            ],
        )?;
        Ok(())
    }

    /// Transactions, most recent first, optionally limited.
    pub fn transactions(
        &self,
        user_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<RewardTransaction>, rusqlite::Error> {
        match limit {
            Some(limit) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, kind, amount, reason, task_id, app_id, timestamp, description
                     FROM reward_transactions WHERE user_id = ?1
                     ORDER BY timestamp DESC, rowid DESC LIMIT ?2",
                )?;
                let rows = stmt.query_map(params![user_id, limit], row_to_transaction)?;
                rows.collect()
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, kind, amount, reason, task_id, app_id, timestamp, description
                     FROM reward_transactions WHERE user_id = ?1
                     ORDER BY timestamp DESC, rowid DESC",
                )?;
                let rows = stmt.query_map(params![user_id], row_to_transaction)?;
                rows.collect()
            }
        }
    }

    /// Sum of earned and bonus transaction amounts.
    pub fn sum_earned(&self, user_id: &str) -> Result<u32, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM reward_transactions
             WHERE user_id = ?1 AND kind IN ('earned', 'bonus')",
            params![user_id],
            |row| row.get(0),
        )
    }

    /// Sum of spent transaction amounts.
    pub fn sum_spent(&self, user_id: &str) -> Result<u32, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM reward_transactions
             WHERE user_id = ?1 AND kind = 'spent'",
            params![user_id],
            |row| row.get(0),
        )
    }

    // === Allocations ===

    pub fn add_allocation(
        &self,
        user_id: &str,
        allocation: &RewardAllocation,
    ) -> Result<(), rusqlite::Error> {
        let id = format!(
            "{user_id}_{}_{}",
            allocation.app_id,
            allocation.allocated_at.timestamp_millis()
        );
        self.conn.execute(
            "INSERT INTO reward_allocations (id, user_id, app_id, minutes, allocated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                id,
                user_id,
                allocation.app_id,
                allocation.minutes,
                allocation.allocated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Open allocations, most recent first.
    pub fn allocations(&self, user_id: &str) -> Result<Vec<RewardAllocation>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT app_id, minutes, allocated_at FROM reward_allocations
             WHERE user_id = ?1 ORDER BY allocated_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            let allocated_at_str: String = row.get(2)?;
            Ok(RewardAllocation {
                app_id: row.get(0)?,
                minutes: row.get(1)?,
                allocated_at: parse_datetime_fallback(&allocated_at_str),
            })
        })?;
        rows.collect()
    }

    /// Sum of minutes in open allocations.
    pub fn sum_pending_allocations(&self, user_id: &str) -> Result<u32, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COALESCE(SUM(minutes), 0) FROM reward_allocations WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )
    }

    /// Consume up to `minutes` from open allocations, oldest first.
    ///
    /// Rows are deleted once fully consumed and reduced when partially
    /// consumed, so the pending total drops by `min(pending, minutes)` and
    /// can never go negative. Returns the minutes actually consumed.
    pub fn consume_allocations(&self, user_id: &str, minutes: u32) -> Result<u32, rusqlite::Error> {
        let rows: Vec<(String, u32)> = {
            let mut stmt = self.conn.prepare(
                "SELECT id, minutes FROM reward_allocations
                 WHERE user_id = ?1 ORDER BY allocated_at ASC, rowid ASC",
            )?;
            let mapped = stmt.query_map(params![user_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
            })?;
            mapped.collect::<Result<_, _>>()?
        };

        let mut remaining = minutes;
        for (id, row_minutes) in rows {
            if remaining == 0 {
                break;
            }
            if row_minutes <= remaining {
                self.conn.execute(
                    "DELETE FROM reward_allocations WHERE id = ?1",
                    params![id],
                )?;
                remaining -= row_minutes;
            } else {
                self.conn.execute(
                    "UPDATE reward_allocations SET minutes = ?1 WHERE id = ?2",
                    params![row_minutes - remaining, id],
                )?;
                remaining = 0;
            }
        }
        Ok(minutes - remaining)
    }

    // === Achievements ===

    /// Seed the achievement catalog for a user.
    pub fn seed_achievements(
        &self,
        user_id: &str,
        achievements: &[Achievement],
    ) -> Result<(), rusqlite::Error> {
        for achievement in achievements {
            self.conn.execute(
                "INSERT OR IGNORE INTO achievements
                     (id, user_id, title, description, icon, requirement, kind, category,
                      unlocked, unlocked_at, reward_bonus)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    achievement.id,
                    user_id,
                    achievement.title,
                    achievement.description,
                    achievement.icon,
                    achievement.requirement,
                    achievement.kind.as_str(),
                    achievement.category.map(|c| c.as_str()),
                    achievement.unlocked,
                    achievement.unlocked_at.map(|dt| dt.to_rfc3339()),
                    achievement.reward_bonus,
                ],
            )?;
        }
        Ok(())
    }

    /// All achievements for a user, ordered by kind then requirement.
    pub fn achievements(&self, user_id: &str) -> Result<Vec<Achievement>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, icon, requirement, kind, category,
                    unlocked, unlocked_at, reward_bonus
             FROM achievements WHERE user_id = ?1 ORDER BY kind, requirement ASC",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_achievement)?;
        rows.collect()
    }

    /// Flip an achievement to unlocked. Never re-locks.
    pub fn mark_achievement_unlocked(
        &self,
        user_id: &str,
        achievement_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE achievements SET unlocked = 1, unlocked_at = ?1
             WHERE user_id = ?2 AND id = ?3 AND unlocked = 0",
            params![at.to_rfc3339(), user_id, achievement_id],
        )?;
        Ok(())
    }

    // === Apps ===

    pub fn insert_app(&self, user_id: &str, app: &App) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO apps (id, user_id, name, package_name, category, daily_limit,
                               used_time, is_blocked)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                app.id,
                user_id,
                app.name,
                app.package_name,
                app.category.as_str(),
                app.daily_limit,
                app.used_time,
                app.is_blocked,
            ],
        )?;
        Ok(())
    }

    /// All apps for a user, ordered by name.
    pub fn apps(&self, user_id: &str) -> Result<Vec<App>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, package_name, category, daily_limit, used_time, is_blocked
             FROM apps WHERE user_id = ?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_app)?;
        rows.collect()
    }

    /// Look up one app.
    pub fn app(&self, user_id: &str, app_id: &str) -> Result<Option<App>, rusqlite::Error> {
        self.conn
            .query_row(
                "SELECT id, name, package_name, category, daily_limit, used_time, is_blocked
                 FROM apps WHERE user_id = ?1 AND id = ?2",
                params![user_id, app_id],
                row_to_app,
            )
            .optional()
    }

    pub fn set_app_daily_limit(
        &self,
        user_id: &str,
        app_id: &str,
        daily_limit: u32,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE apps SET daily_limit = ?1 WHERE user_id = ?2 AND id = ?3",
            params![daily_limit, user_id, app_id],
        )?;
        Ok(())
    }

    pub fn set_app_used_time(
        &self,
        user_id: &str,
        app_id: &str,
        used_time: u32,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE apps SET used_time = ?1 WHERE user_id = ?2 AND id = ?3",
            params![used_time, user_id, app_id],
        )?;
        Ok(())
    }

    pub fn set_app_blocked(
        &self,
        user_id: &str,
        app_id: &str,
        is_blocked: bool,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE apps SET is_blocked = ?1 WHERE user_id = ?2 AND id = ?3",
            params![is_blocked, user_id, app_id],
        )?;
        Ok(())
    }

    /// Reset all of a user's apps for a new day.
    pub fn reset_daily_usage(&self, user_id: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE apps SET used_time = 0, is_blocked = 0 WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(())
    }

    // === User lifecycle ===

    /// Delete every row belonging to a user.
    pub fn delete_user_data(&self, user_id: &str) -> Result<(), rusqlite::Error> {
        for table in [
            "completed_tasks",
            "user_stats",
            "reward_transactions",
            "reward_allocations",
            "achievements",
            "apps",
        ] {
            self.conn.execute(
                &format!("DELETE FROM {table} WHERE user_id = ?1"),
                params![user_id],
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_default_when_absent() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.user_stats("nobody").unwrap(), UserStats::default());
    }

    #[test]
    fn stats_upsert_roundtrip() {
        let db = Database::open_memory().unwrap();
        let mut stats = UserStats::default();
        stats.total_tasks_completed = 3;
        stats.current_streak = 2;
        db.update_user_stats("u1", &stats).unwrap();
        assert_eq!(db.user_stats("u1").unwrap(), stats);

        stats.current_streak = 3;
        db.update_user_stats("u1", &stats).unwrap();
        assert_eq!(db.user_stats("u1").unwrap().current_streak, 3);
    }

    #[test]
    fn transaction_sums_split_by_kind() {
        let db = Database::open_memory().unwrap();
        let base = Utc::now();
        for (i, (kind, amount)) in [
            (TransactionKind::Earned, 30),
            (TransactionKind::Bonus, 10),
            (TransactionKind::Spent, 15),
        ]
        .iter()
        .enumerate()
        {
            db.insert_transaction(
                "u1",
                &RewardTransaction {
                    id: format!("t{i}"),
                    kind: *kind,
                    amount: *amount,
                    reason: String::new(),
                    task_id: None,
                    app_id: None,
                    timestamp: base,
                    description: String::new(),
                },
            )
            .unwrap();
        }

        assert_eq!(db.sum_earned("u1").unwrap(), 40);
        assert_eq!(db.sum_spent("u1").unwrap(), 15);
        assert_eq!(db.sum_earned("u2").unwrap(), 0);
    }

    #[test]
    fn consume_allocations_oldest_first() {
        let db = Database::open_memory().unwrap();
        let base = Utc::now();
        for (i, minutes) in [10u32, 20, 30].iter().enumerate() {
            db.add_allocation(
                "u1",
                &RewardAllocation {
                    app_id: format!("app-{i}"),
                    minutes: *minutes,
                    allocated_at: base + chrono::Duration::seconds(i as i64),
                },
            )
            .unwrap();
        }

        // 10 + 15 of the 20: oldest two rows touched, newest untouched.
        assert_eq!(db.consume_allocations("u1", 25).unwrap(), 25);
        assert_eq!(db.sum_pending_allocations("u1").unwrap(), 35);

        let open = db.allocations("u1").unwrap();
        assert_eq!(open.len(), 2);
        assert!(open.iter().any(|a| a.minutes == 5));
        assert!(open.iter().any(|a| a.minutes == 30));
    }

    #[test]
    fn consume_allocations_floors_at_zero() {
        let db = Database::open_memory().unwrap();
        db.add_allocation(
            "u1",
            &RewardAllocation {
                app_id: "a".to_string(),
                minutes: 10,
                allocated_at: Utc::now(),
            },
        )
        .unwrap();

        assert_eq!(db.consume_allocations("u1", 50).unwrap(), 10);
        assert_eq!(db.sum_pending_allocations("u1").unwrap(), 0);
    }

    #[test]
    fn unlock_does_not_relock_or_retimestamp() {
        let db = Database::open_memory().unwrap();
        db.seed_achievements("u1", &crate::rewards::default_achievements())
            .unwrap();

        let first = Utc::now();
        db.mark_achievement_unlocked("u1", "first_task", first).unwrap();
        let later = first + chrono::Duration::hours(1);
        db.mark_achievement_unlocked("u1", "first_task", later).unwrap();

        let achievement = db
            .achievements("u1")
            .unwrap()
            .into_iter()
            .find(|a| a.id == "first_task")
            .unwrap();
        assert!(achievement.unlocked);
        assert_eq!(
            achievement.unlocked_at.unwrap().timestamp(),
            first.timestamp()
        );
    }

    #[test]
    fn delete_user_data_cascades() {
        let db = Database::open_memory().unwrap();
        db.update_user_stats("u1", &UserStats::default()).unwrap();
        db.seed_achievements("u1", &crate::rewards::default_achievements())
            .unwrap();
        db.update_user_stats("u2", &UserStats::default()).unwrap();

        db.delete_user_data("u1").unwrap();
        assert!(db.achievements("u1").unwrap().is_empty());
        // u2 untouched.
        assert_eq!(db.user_stats("u2").unwrap(), UserStats::default());
    }
}
