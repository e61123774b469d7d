use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod commands;

#[derive(Parser)]
#[command(name = "mindfultime-cli", version, about = "MindfulTime CLI")]
struct Cli {
    /// User scope for all operations
    #[arg(long, global = true, default_value = "default")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mindful task catalog and completion
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Reward balance, history, and bonuses
    Rewards {
        #[command(subcommand)]
        action: commands::rewards::RewardsAction,
    },
    /// Achievements
    Achievements {
        #[command(subcommand)]
        action: commands::achievements::AchievementsAction,
    },
    /// App limits and blocking
    Apps {
        #[command(subcommand)]
        action: commands::apps::AppsAction,
    },
    /// User statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action, &cli.user),
        Commands::Rewards { action } => commands::rewards::run(action, &cli.user),
        Commands::Achievements { action } => commands::achievements::run(action, &cli.user),
        Commands::Apps { action } => commands::apps::run(action, &cli.user),
        Commands::Stats { action } => commands::stats::run(action, &cli.user),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "mindfultime-cli",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
