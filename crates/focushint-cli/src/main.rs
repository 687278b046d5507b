use clap::{Parser, Subcommand};
use focushint_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "focushint", version, about = "Focushint CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Activity reports
    Activity {
        #[command(subcommand)]
        action: commands::activity::ActivityAction,
    },
    /// Hint queries and acknowledgement
    Hints {
        #[command(subcommand)]
        action: commands::hints::HintsAction,
    },
    /// Per-device preferences
    Prefs {
        #[command(subcommand)]
        action: commands::prefs::PrefsAction,
    },
    /// Explicit time triggers
    Trigger {
        /// Device identifier
        device_id: String,
        #[command(subcommand)]
        action: commands::trigger::TriggerAction,
    },
    /// Calendar event reminders
    Event {
        #[command(subcommand)]
        action: commands::event::EventAction,
    },
    /// Text-generation backend
    Model {
        #[command(subcommand)]
        action: commands::model::ModelAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    // RUST_LOG wins over the configured filter.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let configured = Config::load()
            .map(|c| c.logging.filter)
            .unwrap_or_else(|_| "info".into());
        EnvFilter::try_new(configured).unwrap_or_else(|_| EnvFilter::new("info"))
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Activity { action } => commands::activity::run(action),
        Commands::Hints { action } => commands::hints::run(action),
        Commands::Prefs { action } => commands::prefs::run(action),
        Commands::Trigger { device_id, action } => commands::trigger::run(&device_id, action),
        Commands::Event { action } => commands::event::run(action),
        Commands::Model { action } => commands::model::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
