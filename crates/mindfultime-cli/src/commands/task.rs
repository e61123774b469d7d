use clap::Subcommand;
use mindfultime_core::storage::Database;
use mindfultime_core::{task, RewardService, TaskCatalog};

#[derive(Subcommand)]
pub enum TaskAction {
    /// List all tasks in the catalog
    List {
        /// Filter by category (outdoor, reading, exercise, ...)
        #[arg(long)]
        category: Option<String>,
    },
    /// Tasks recommended for the current time of day
    Recommend,
    /// Complete a task and run the reward pipeline
    Complete {
        /// Task id from the catalog
        task_id: String,
        /// Photo URI for tasks that require one
        #[arg(long)]
        photo: Option<String>,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },
}

pub fn run(action: TaskAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TaskAction::List { category } => {
            let catalog = TaskCatalog::new();
            match category {
                Some(category) => {
                    let category = mindfultime_core::TaskCategory::parse(&category);
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&catalog.by_category(category))?
                    );
                }
                None => {
                    println!("{}", serde_json::to_string_pretty(&catalog.all())?);
                }
            }
        }
        TaskAction::Recommend => {
            let catalog = TaskCatalog::new();
            let recommended = task::recommended_tasks(&catalog, chrono::Local::now());
            println!("{}", serde_json::to_string_pretty(&recommended)?);
        }
        TaskAction::Complete {
            task_id,
            photo,
            notes,
        } => {
            let db = Database::open()?;
            let service = RewardService::new(&db, user);
            service.initialize()?;

            let outcome = service.complete_task(&task_id, photo, notes)?;
            println!(
                "Completed '{}': earned {} minutes ({} streak bonus), streak {}",
                task_id, outcome.final_amount, outcome.bonus_applied, outcome.streak.current_streak
            );
            for achievement in &outcome.newly_unlocked {
                println!(
                    "Achievement unlocked: {} (+{} minutes)",
                    achievement.title, achievement.reward_bonus
                );
            }
            for share in &outcome.allocations {
                println!("Allocated {} minutes to {}", share.minutes, share.app_id);
            }
        }
    }
    Ok(())
}
