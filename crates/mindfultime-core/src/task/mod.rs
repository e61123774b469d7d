//! Mindful activity types and the task catalog.
//!
//! A [`MindfulTask`] describes an activity the user can complete to earn
//! screen time. Completions are recorded as [`CompletedTask`] rows with the
//! category snapshotted at completion time, so category achievements keep
//! counting correctly even if the catalog changes later.

mod catalog;

pub use catalog::{predefined_tasks, TaskCatalog};

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Category of mindful activity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Outdoor,
    Reading,
    Exercise,
    Meditation,
    Creative,
    Social,
    Custom,
}

impl TaskCategory {
    /// Stable string form used in storage and on the CLI.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Outdoor => "outdoor",
            TaskCategory::Reading => "reading",
            TaskCategory::Exercise => "exercise",
            TaskCategory::Meditation => "meditation",
            TaskCategory::Creative => "creative",
            TaskCategory::Social => "social",
            TaskCategory::Custom => "custom",
        }
    }

    /// Parse the stable string form; unknown values fall back to Custom.
    pub fn parse(s: &str) -> TaskCategory {
        match s {
            "outdoor" => TaskCategory::Outdoor,
            "reading" => TaskCategory::Reading,
            "exercise" => TaskCategory::Exercise,
            "meditation" => TaskCategory::Meditation,
            "creative" => TaskCategory::Creative,
            "social" => TaskCategory::Social,
            _ => TaskCategory::Custom,
        }
    }
}

/// A mindful activity that earns screen time when completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MindfulTask {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: TaskCategory,
    /// Minutes earned for completion, before any streak bonus.
    pub time_reward: u32,
    pub icon: String,
    pub requires_photo: bool,
}

impl MindfulTask {
    /// Validate that a completion attempt satisfies the task's requirements.
    pub fn validate_completion(&self, photo_uri: Option<&str>) -> Result<(), ValidationError> {
        if self.requires_photo && photo_uri.is_none() {
            return Err(ValidationError::PhotoRequired {
                task_id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// A recorded completion of a mindful task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedTask {
    pub id: String,
    pub task_id: String,
    /// Category of the originating task, snapshotted at completion.
    pub category: TaskCategory,
    pub completed_at: DateTime<Utc>,
    /// Minutes earned, after any streak bonus.
    pub time_earned: u32,
    pub photo_uri: Option<String>,
    pub notes: Option<String>,
}

/// Recommend task categories for the given hour of day (0-23).
///
/// Morning favors movement and meditation, afternoon favors quieter
/// activities, evening winds down. Outside those windows every category is
/// recommended.
pub fn recommended_categories(hour: u32) -> Vec<TaskCategory> {
    match hour {
        6..=11 => vec![
            TaskCategory::Outdoor,
            TaskCategory::Exercise,
            TaskCategory::Meditation,
        ],
        12..=17 => vec![
            TaskCategory::Reading,
            TaskCategory::Creative,
            TaskCategory::Social,
        ],
        18..=21 => vec![
            TaskCategory::Reading,
            TaskCategory::Meditation,
            TaskCategory::Creative,
        ],
        _ => vec![
            TaskCategory::Outdoor,
            TaskCategory::Reading,
            TaskCategory::Exercise,
            TaskCategory::Meditation,
            TaskCategory::Creative,
            TaskCategory::Social,
            TaskCategory::Custom,
        ],
    }
}

/// Recommend tasks for the current local time.
pub fn recommended_tasks(catalog: &TaskCatalog, now: DateTime<chrono::Local>) -> Vec<MindfulTask> {
    let categories = recommended_categories(now.hour());
    catalog
        .all()
        .iter()
        .filter(|t| categories.contains(&t.category))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_requirement_enforced() {
        let task = MindfulTask {
            id: "outdoor_walk".to_string(),
            title: "Go for a Walk".to_string(),
            description: "Take a 30-minute walk outside".to_string(),
            category: TaskCategory::Outdoor,
            time_reward: 30,
            icon: "walk".to_string(),
            requires_photo: true,
        };

        assert!(task.validate_completion(None).is_err());
        assert!(task.validate_completion(Some("file:///photo.jpg")).is_ok());
    }

    #[test]
    fn category_roundtrip() {
        for cat in [
            TaskCategory::Outdoor,
            TaskCategory::Reading,
            TaskCategory::Exercise,
            TaskCategory::Meditation,
            TaskCategory::Creative,
            TaskCategory::Social,
            TaskCategory::Custom,
        ] {
            assert_eq!(TaskCategory::parse(cat.as_str()), cat);
        }
        assert_eq!(TaskCategory::parse("anything-else"), TaskCategory::Custom);
    }

    #[test]
    fn morning_recommendations_favor_movement() {
        let categories = recommended_categories(8);
        assert!(categories.contains(&TaskCategory::Outdoor));
        assert!(categories.contains(&TaskCategory::Exercise));
        assert!(!categories.contains(&TaskCategory::Reading));
    }

    #[test]
    fn late_night_recommends_everything() {
        let categories = recommended_categories(23);
        assert_eq!(categories.len(), 7);
    }
}
