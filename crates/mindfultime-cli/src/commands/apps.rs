use clap::Subcommand;
use mindfultime_core::storage::Database;
use mindfultime_core::{App, AppCategory, LimitMonitor, RewardService};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum AppsAction {
    /// List apps under limits
    List,
    /// Register an app under a daily limit
    Add {
        /// Display name
        name: String,
        /// Platform package name
        package: String,
        /// Daily limit in minutes
        #[arg(long, default_value_t = 60)]
        limit: u32,
        /// Category (social_media, entertainment, games, productivity, other)
        #[arg(long, default_value = "other")]
        category: String,
    },
    /// Change an app's daily limit
    SetLimit {
        app_id: String,
        /// New daily limit in minutes
        minutes: u32,
    },
    /// Record foreground usage minutes (blocks the app at its limit)
    RecordUsage {
        app_id: String,
        minutes: u32,
    },
    /// Spend earned minutes into an app's allowance
    Spend {
        app_id: String,
        minutes: u32,
    },
    /// Block any app over its limit
    Sweep,
    /// Reset daily usage and lift all blocks
    ResetDaily,
}

pub fn run(action: AppsAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        AppsAction::List => {
            let apps = db.apps(user)?;
            println!("{}", serde_json::to_string_pretty(&apps)?);
        }
        AppsAction::Add {
            name,
            package,
            limit,
            category,
        } => {
            let app = App {
                id: Uuid::new_v4().to_string(),
                name,
                package_name: package,
                category: AppCategory::parse(&category),
                daily_limit: limit,
                used_time: 0,
                is_blocked: false,
            };
            db.insert_app(user, &app)?;
            println!("App registered: {} ({} min/day)", app.id, app.daily_limit);
        }
        AppsAction::SetLimit { app_id, minutes } => {
            db.set_app_daily_limit(user, &app_id, minutes)?;
            println!("Daily limit for {app_id} set to {minutes} minutes");
        }
        AppsAction::RecordUsage { app_id, minutes } => {
            let monitor = LimitMonitor::new(&db, user);
            let events = monitor.record_usage(&app_id, minutes)?;
            let remaining = monitor.remaining_time(&app_id)?;
            println!("Recorded {minutes} minutes; {remaining} remaining");
            if !events.is_empty() {
                println!("{}", serde_json::to_string_pretty(&events)?);
            }
        }
        AppsAction::Spend { app_id, minutes } => {
            let service = RewardService::new(&db, user);
            service.initialize()?;
            let (ok, _events) = service.spend(&app_id, minutes)?;
            if ok {
                println!("Spent {minutes} minutes on {app_id}");
            } else {
                println!("Not enough time available");
            }
        }
        AppsAction::Sweep => {
            let monitor = LimitMonitor::new(&db, user);
            let events = monitor.sweep()?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        AppsAction::ResetDaily => {
            let monitor = LimitMonitor::new(&db, user);
            monitor.reset_daily()?;
            println!("Daily usage reset");
        }
    }
    Ok(())
}
