//! The predefined task catalog.
//!
//! These are the base activities available to every user. Custom tasks can
//! be layered on top via [`TaskCatalog::with_custom`].

use super::{MindfulTask, TaskCategory};

/// The fixed set of predefined mindful tasks.
pub fn predefined_tasks() -> Vec<MindfulTask> {
    fn task(
        id: &str,
        title: &str,
        description: &str,
        category: TaskCategory,
        time_reward: u32,
        icon: &str,
        requires_photo: bool,
    ) -> MindfulTask {
        MindfulTask {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category,
            time_reward,
            icon: icon.to_string(),
            requires_photo,
        }
    }

    vec![
        // Outdoor
        task(
            "outdoor_walk",
            "Go for a Walk",
            "Take a 30-minute walk outside",
            TaskCategory::Outdoor,
            30,
            "walk",
            true,
        ),
        task(
            "outdoor_run",
            "Morning Run",
            "Go for a refreshing morning run",
            TaskCategory::Outdoor,
            45,
            "run",
            true,
        ),
        task(
            "outdoor_bike",
            "Bike Ride",
            "Take a bike ride around your neighborhood",
            TaskCategory::Outdoor,
            60,
            "bike",
            true,
        ),
        task(
            "outdoor_nature",
            "Visit Nature",
            "Spend time in a park or natural area",
            TaskCategory::Outdoor,
            45,
            "tree",
            true,
        ),
        // Reading
        task(
            "reading_book",
            "Read a Book",
            "Read for 30 minutes",
            TaskCategory::Reading,
            30,
            "book",
            true,
        ),
        task(
            "reading_article",
            "Read Articles",
            "Read educational articles or news",
            TaskCategory::Reading,
            20,
            "newspaper",
            false,
        ),
        // Exercise
        task(
            "exercise_yoga",
            "Yoga Session",
            "Practice yoga for 30 minutes",
            TaskCategory::Exercise,
            40,
            "yoga",
            true,
        ),
        task(
            "exercise_gym",
            "Gym Workout",
            "Complete a workout at the gym",
            TaskCategory::Exercise,
            60,
            "dumbbell",
            true,
        ),
        task(
            "exercise_home",
            "Home Exercise",
            "Do a home workout routine",
            TaskCategory::Exercise,
            30,
            "lift",
            false,
        ),
        // Meditation
        task(
            "meditation_short",
            "Quick Meditation",
            "10-minute meditation session",
            TaskCategory::Meditation,
            15,
            "lotus",
            false,
        ),
        task(
            "meditation_long",
            "Deep Meditation",
            "30-minute meditation practice",
            TaskCategory::Meditation,
            40,
            "om",
            false,
        ),
        task(
            "meditation_breathing",
            "Breathing Exercise",
            "Practice deep breathing exercises",
            TaskCategory::Meditation,
            10,
            "breath",
            false,
        ),
        // Creative
        task(
            "creative_draw",
            "Draw or Paint",
            "Create some art",
            TaskCategory::Creative,
            45,
            "palette",
            true,
        ),
        task(
            "creative_music",
            "Play Music",
            "Practice an instrument or sing",
            TaskCategory::Creative,
            30,
            "music",
            false,
        ),
        task(
            "creative_write",
            "Creative Writing",
            "Write a story, poem, or journal entry",
            TaskCategory::Creative,
            30,
            "pen",
            false,
        ),
        task(
            "creative_craft",
            "Arts and Crafts",
            "Work on a craft project",
            TaskCategory::Creative,
            40,
            "scissors",
            true,
        ),
        // Social
        task(
            "social_call",
            "Call a Friend",
            "Have a meaningful conversation",
            TaskCategory::Social,
            25,
            "phone",
            false,
        ),
        task(
            "social_meetup",
            "Meet in Person",
            "Spend time with friends or family",
            TaskCategory::Social,
            60,
            "people",
            true,
        ),
        task(
            "social_volunteer",
            "Volunteer",
            "Help others in your community",
            TaskCategory::Social,
            90,
            "handshake",
            true,
        ),
    ]
}

/// Catalog of available tasks: the predefined set plus any custom tasks.
#[derive(Debug, Clone)]
pub struct TaskCatalog {
    tasks: Vec<MindfulTask>,
}

impl TaskCatalog {
    /// Catalog containing only the predefined tasks.
    pub fn new() -> Self {
        Self {
            tasks: predefined_tasks(),
        }
    }

    /// Catalog with custom tasks appended after the predefined set.
    pub fn with_custom(custom: Vec<MindfulTask>) -> Self {
        let mut tasks = predefined_tasks();
        tasks.extend(custom);
        Self { tasks }
    }

    /// All tasks in the catalog.
    pub fn all(&self) -> &[MindfulTask] {
        &self.tasks
    }

    /// Look up a task by id.
    pub fn get(&self, task_id: &str) -> Option<&MindfulTask> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Tasks belonging to the given category.
    pub fn by_category(&self, category: TaskCategory) -> Vec<&MindfulTask> {
        self.tasks
            .iter()
            .filter(|t| t.category == category)
            .collect()
    }
}

impl Default for TaskCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_unique_ids() {
        let catalog = TaskCatalog::new();
        let mut ids: Vec<_> = catalog.all().iter().map(|t| t.id.as_str()).collect();
        let before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn lookup_by_id() {
        let catalog = TaskCatalog::new();
        let walk = catalog.get("outdoor_walk").unwrap();
        assert_eq!(walk.time_reward, 30);
        assert!(walk.requires_photo);
        assert!(catalog.get("no_such_task").is_none());
    }

    #[test]
    fn by_category_filters() {
        let catalog = TaskCatalog::new();
        let meditation = catalog.by_category(TaskCategory::Meditation);
        assert_eq!(meditation.len(), 3);
        assert!(meditation.iter().all(|t| t.category == TaskCategory::Meditation));
    }

    #[test]
    fn custom_tasks_are_appended() {
        let custom = MindfulTask {
            id: "custom_1".to_string(),
            title: "Water the Plants".to_string(),
            description: "Tend to the houseplants".to_string(),
            category: TaskCategory::Custom,
            time_reward: 10,
            icon: "plant".to_string(),
            requires_photo: false,
        };
        let catalog = TaskCatalog::with_custom(vec![custom]);
        assert!(catalog.get("custom_1").is_some());
        assert_eq!(catalog.all().len(), predefined_tasks().len() + 1);
    }
}
