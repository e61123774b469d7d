use clap::Subcommand;
use mindfultime_core::storage::Database;
use mindfultime_core::RewardService;

#[derive(Subcommand)]
pub enum RewardsAction {
    /// Current balance
    Balance,
    /// Transaction history, most recent first
    History {
        /// Number of transactions to show
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
    /// Streak bonus tiers
    Bonuses,
    /// Balance, recent transactions, unlocked achievements, current tier
    Summary,
}

pub fn run(action: RewardsAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let service = RewardService::new(&db, user);
    service.initialize()?;

    match action {
        RewardsAction::Balance => {
            let balance = service.balance()?;
            println!("{}", serde_json::to_string_pretty(&balance)?);
        }
        RewardsAction::History { limit } => {
            let history = service.history(Some(limit))?;
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        RewardsAction::Bonuses => {
            println!("{}", serde_json::to_string_pretty(service.streak_bonuses())?);
        }
        RewardsAction::Summary => {
            let summary = service.summary();
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}
