use chrono::Utc;
use clap::Subcommand;
use focushint_core::{Config, Database, HintStatus, PendingHints};

use super::{orchestrator, print_json, runtime, CmdResult};

#[derive(Subcommand)]
pub enum HintsAction {
    /// Pending hints, high priority first
    Pending { device_id: String },
    /// Acknowledge a hint
    Status {
        id: i64,
        /// pending, shown or dismissed
        status: HintStatus,
    },
    /// Run the hint check now
    Generate {
        device_id: String,
        /// Treat the check as following an app switch
        #[arg(long)]
        app_switch: bool,
    },
}

pub fn run(action: HintsAction) -> CmdResult {
    match action {
        HintsAction::Pending { device_id } => {
            let db = Database::open()?;
            print_json(&PendingHints::from(db.pending_hints(&device_id)?))?;
        }
        HintsAction::Status { id, status } => {
            let db = Database::open()?;
            print_json(&db.update_hint_status(id, status, Utc::now())?)?;
        }
        HintsAction::Generate {
            device_id,
            app_switch,
        } => {
            let config = Config::load()?;
            let hint = runtime()?.block_on(async {
                let orchestrator = orchestrator(&config, true).await?;
                let hint = orchestrator
                    .decide(&device_id, None, app_switch, None, Utc::now())
                    .await?;
                Ok::<_, Box<dyn std::error::Error>>(hint)
            })?;
            print_json(&hint)?;
        }
    }
    Ok(())
}
