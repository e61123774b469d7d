//! Distribution of earned minutes into app daily limits.
//!
//! Newly earned minutes extend the allowance of apps that need them most:
//! blocked apps and apps at or past 90% of their daily limit. When no app
//! qualifies, every app shares equally. Shares use integer floor division
//! and the remainder is not distributed; that inexactness is intentional
//! and covered by tests.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::limits::App;
use crate::storage::Database;

/// Default fraction of the daily limit at which an app counts as near-limit.
pub const NEAR_LIMIT_THRESHOLD: f64 = 0.9;

/// One app's share of a distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationShare {
    pub app_id: String,
    pub minutes: u32,
    /// Whether the extension lifted a block.
    pub unblocked: bool,
}

/// Spreads earned minutes across apps that are blocked or near their limit.
pub struct AllocationDistributor<'a> {
    db: &'a Database,
    user_id: String,
    near_limit_threshold: f64,
}

impl<'a> AllocationDistributor<'a> {
    pub fn new(db: &'a Database, user_id: impl Into<String>) -> Self {
        Self {
            db,
            user_id: user_id.into(),
            near_limit_threshold: NEAR_LIMIT_THRESHOLD,
        }
    }

    /// Override the near-limit threshold (fraction of the daily limit).
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.near_limit_threshold = threshold;
        self
    }

    fn is_near_limit(&self, app: &App) -> bool {
        app.used_time as f64 >= self.near_limit_threshold * app.daily_limit as f64
    }

    /// Distribute `earned_minutes` across target apps.
    ///
    /// Targets are blocked or near-limit apps; with no such apps, all apps.
    /// Each target's daily limit grows by `floor(earned_minutes / targets)`;
    /// a blocked app whose new limit exceeds its used time is unblocked.
    /// Persistence errors propagate; there is no rollback of earlier shares.
    pub fn distribute(&self, earned_minutes: u32) -> Result<Vec<AllocationShare>> {
        let apps = self.db.apps(&self.user_id)?;
        if apps.is_empty() || earned_minutes == 0 {
            return Ok(Vec::new());
        }

        let mut targets: Vec<&App> = apps
            .iter()
            .filter(|app| app.is_blocked || self.is_near_limit(app))
            .collect();
        if targets.is_empty() {
            targets = apps.iter().collect();
        }

        let share = earned_minutes / targets.len() as u32;
        let remainder = earned_minutes % targets.len() as u32;
        if remainder > 0 {
            debug!(
                user = %self.user_id,
                remainder,
                targets = targets.len(),
                "distribution remainder dropped"
            );
        }
        if share == 0 {
            return Ok(Vec::new());
        }

        let mut shares = Vec::with_capacity(targets.len());
        for app in targets {
            let new_limit = app.daily_limit + share;
            let unblock = app.is_blocked && app.used_time < new_limit;

            self.db
                .set_app_daily_limit(&self.user_id, &app.id, new_limit)?;
            if unblock {
                self.db.set_app_blocked(&self.user_id, &app.id, false)?;
            }

            info!(
                user = %self.user_id,
                app = %app.id,
                minutes = share,
                unblocked = unblock,
                "extended daily limit"
            );
            shares.push(AllocationShare {
                app_id: app.id.clone(),
                minutes: share,
                unblocked: unblock,
            });
        }

        Ok(shares)
    }
}
