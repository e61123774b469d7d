use clap::Subcommand;
use mindfultime_core::storage::Database;
use mindfultime_core::RewardService;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Current user statistics
    Show,
    /// Re-check the streak against the completion log
    ReconcileStreak,
}

pub fn run(action: StatsAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StatsAction::Show => {
            let stats = db.user_stats(user)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::ReconcileStreak => {
            let service = RewardService::new(&db, user);
            let update = service.reconcile_streak()?;
            println!("{}", serde_json::to_string_pretty(&update)?);
        }
    }
    Ok(())
}
