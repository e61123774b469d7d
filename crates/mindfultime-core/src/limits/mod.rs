//! Per-app daily limits and gentle blocking.
//!
//! An [`App`] carries the three fields the usage-tracking boundary feeds:
//! `daily_limit`, `used_time`, and `is_blocked`. The [`LimitMonitor`]
//! enforces limits over them: recording usage blocks an app at its limit,
//! adding time can lift a block, and the periodic sweep catches anything
//! that slipped through. The sweep is serialized by an in-progress guard;
//! re-entry while one is running is a no-op.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::storage::Database;

/// Category of a limited app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppCategory {
    SocialMedia,
    Entertainment,
    Games,
    Productivity,
    Other,
}

impl AppCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppCategory::SocialMedia => "social_media",
            AppCategory::Entertainment => "entertainment",
            AppCategory::Games => "games",
            AppCategory::Productivity => "productivity",
            AppCategory::Other => "other",
        }
    }

    pub fn parse(s: &str) -> AppCategory {
        match s {
            "social_media" => AppCategory::SocialMedia,
            "entertainment" => AppCategory::Entertainment,
            "games" => AppCategory::Games,
            "productivity" => AppCategory::Productivity,
            _ => AppCategory::Other,
        }
    }
}

/// An app under a daily time limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct App {
    pub id: String,
    pub name: String,
    pub package_name: String,
    pub category: AppCategory,
    /// Allowance in minutes for the current day.
    pub daily_limit: u32,
    /// Foreground minutes measured today.
    pub used_time: u32,
    pub is_blocked: bool,
}

impl App {
    /// Minutes left before the limit, floored at zero.
    pub fn remaining_time(&self) -> u32 {
        self.daily_limit.saturating_sub(self.used_time)
    }

    pub fn is_over_limit(&self) -> bool {
        self.used_time >= self.daily_limit
    }
}

/// Enforces daily limits for one user's apps.
pub struct LimitMonitor<'a> {
    db: &'a Database,
    user_id: String,
    sweep_in_progress: AtomicBool,
}

impl<'a> LimitMonitor<'a> {
    pub fn new(db: &'a Database, user_id: impl Into<String>) -> Self {
        Self {
            db,
            user_id: user_id.into(),
            sweep_in_progress: AtomicBool::new(false),
        }
    }

    fn require_app(&self, app_id: &str) -> Result<App> {
        self.db
            .app(&self.user_id, app_id)?
            .ok_or_else(|| ValidationError::UnknownApp(app_id.to_string()).into())
    }

    /// Block an app.
    pub fn block_app(&self, app_id: &str) -> Result<Event> {
        self.db.set_app_blocked(&self.user_id, app_id, true)?;
        info!(user = %self.user_id, app = %app_id, "app blocked");
        Ok(Event::AppBlocked {
            app_id: app_id.to_string(),
            at: Utc::now(),
        })
    }

    /// Unblock an app.
    pub fn unblock_app(&self, app_id: &str) -> Result<Event> {
        self.db.set_app_blocked(&self.user_id, app_id, false)?;
        info!(user = %self.user_id, app = %app_id, "app unblocked");
        Ok(Event::AppUnblocked {
            app_id: app_id.to_string(),
            at: Utc::now(),
        })
    }

    /// Record foreground minutes for an app, blocking it at its limit.
    pub fn record_usage(&self, app_id: &str, minutes: u32) -> Result<Vec<Event>> {
        let app = self.require_app(app_id)?;
        let new_used = app.used_time + minutes;
        self.db.set_app_used_time(&self.user_id, app_id, new_used)?;

        let mut events = Vec::new();
        if new_used >= app.daily_limit && !app.is_blocked {
            events.push(self.block_app(app_id)?);
        }
        Ok(events)
    }

    /// Extend an app's allowance, lifting a block once there is headroom.
    pub fn add_time(&self, app_id: &str, minutes: u32) -> Result<Vec<Event>> {
        let app = self.require_app(app_id)?;
        let new_limit = app.daily_limit + minutes;
        self.db
            .set_app_daily_limit(&self.user_id, app_id, new_limit)?;

        let mut events = Vec::new();
        if app.is_blocked && app.used_time < new_limit {
            events.push(self.unblock_app(app_id)?);
        }
        Ok(events)
    }

    /// Minutes left today for an app; zero for unknown apps.
    pub fn remaining_time(&self, app_id: &str) -> Result<u32> {
        Ok(self
            .db
            .app(&self.user_id, app_id)?
            .map(|app| app.remaining_time())
            .unwrap_or(0))
    }

    /// Sweep all apps and block any over its limit.
    ///
    /// Serialized: if a sweep is already in flight this call does nothing
    /// and returns no events.
    pub fn sweep(&self) -> Result<Vec<Event>> {
        if self
            .sweep_in_progress
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            debug!(user = %self.user_id, "sweep already in progress, skipping");
            return Ok(Vec::new());
        }

        let result = self.sweep_inner();
        self.sweep_in_progress.store(false, Ordering::Release);
        result
    }

    fn sweep_inner(&self) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        for app in self.db.apps(&self.user_id)? {
            if app.is_over_limit() && !app.is_blocked {
                events.push(self.block_app(&app.id)?);
            }
        }
        Ok(events)
    }

    /// Midnight reset: usage back to zero and every block lifted.
    pub fn reset_daily(&self) -> Result<()> {
        self.db.reset_daily_usage(&self.user_id)?;
        info!(user = %self.user_id, "daily usage reset");
        Ok(())
    }
}
