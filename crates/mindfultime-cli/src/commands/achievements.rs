use clap::Subcommand;
use mindfultime_core::storage::Database;
use mindfultime_core::RewardService;

#[derive(Subcommand)]
pub enum AchievementsAction {
    /// List achievements
    List {
        /// Show only unlocked achievements
        #[arg(long)]
        unlocked: bool,
    },
}

pub fn run(action: AchievementsAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let service = RewardService::new(&db, user);
    service.initialize()?;

    match action {
        AchievementsAction::List { unlocked } => {
            let mut achievements = service.achievements()?;
            if unlocked {
                achievements.retain(|a| a.unlocked);
            }
            println!("{}", serde_json::to_string_pretty(&achievements)?);
        }
    }
    Ok(())
}
