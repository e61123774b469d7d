//! # MindfulTime Core Library
//!
//! This library provides the core business logic for MindfulTime: earn
//! screen time by completing mindful activities, spend it on limited apps,
//! and keep streaks and achievements along the way. It implements a
//! CLI-first philosophy where all operations are available via a standalone
//! CLI binary, with any GUI shell being a thin layer over the same core.
//!
//! ## Architecture
//!
//! - **Rewards**: the balance ledger, streak tracking, bonus tiers, the
//!   achievement engine, and the allocation distributor, orchestrated by
//!   [`RewardService`] as one ordered completion pipeline
//! - **Limits**: per-app daily limits, usage recording, and the blocking
//!   sweep
//! - **Storage**: SQLite-based persistence and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`RewardService`]: completion pipeline and reward read accessors
//! - [`BalanceLedger`]: append-only transaction log with a derived balance
//! - [`AchievementEngine`]: one-way achievement unlocking
//! - [`LimitMonitor`]: app limit enforcement
//! - [`Database`]: per-user persistence

pub mod error;
pub mod events;
pub mod limits;
pub mod rewards;
pub mod storage;
pub mod task;

pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::Event;
pub use limits::{App, AppCategory, LimitMonitor};
pub use rewards::{
    Achievement, AchievementEngine, AchievementKind, AllocationDistributor, BalanceLedger,
    CompletionOutcome, RewardAllocation, RewardBalance, RewardService, RewardTransaction,
    RewardsSummary, StreakBonus, StreakTracker, StreakUpdate, TransactionKind,
};
pub use storage::{Database, Settings, UserStats};
pub use task::{CompletedTask, MindfulTask, TaskCatalog, TaskCategory};
