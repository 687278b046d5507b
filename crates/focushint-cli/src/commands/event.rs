use chrono::{DateTime, Utc};
use clap::Subcommand;
use focushint_core::{Config, Hint};
use serde::Serialize;

use super::{orchestrator, print_json, runtime, CmdResult};

#[derive(Subcommand)]
pub enum EventAction {
    /// Create a reminder hint for a calendar event
    Remind {
        device_id: String,
        title: String,
        /// Scheduled start (RFC 3339), echoed back
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

#[derive(Serialize)]
struct ReminderOutput {
    status: &'static str,
    event: String,
    event_time: Option<DateTime<Utc>>,
    hint: Hint,
}

pub fn run(action: EventAction) -> CmdResult {
    match action {
        EventAction::Remind {
            device_id,
            title,
            at,
        } => {
            let config = Config::load()?;
            let hint = runtime()?.block_on(async {
                let orchestrator = orchestrator(&config, false).await?;
                Ok::<_, Box<dyn std::error::Error>>(orchestrator.remind_event(
                    &device_id,
                    &title,
                    Utc::now(),
                )?)
            })?;
            print_json(&ReminderOutput {
                status: "reminder_created",
                event: title,
                event_time: at,
                hint,
            })
        }
    }
}
