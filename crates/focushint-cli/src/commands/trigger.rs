use chrono::Utc;
use clap::Subcommand;
use focushint_core::{Config, TimeTrigger};

use super::{orchestrator, print_json, runtime, CmdResult};

#[derive(Subcommand)]
pub enum TriggerAction {
    /// Break reminder during a session
    BreakReminder {
        #[arg(long, default_value_t = 1)]
        break_number: u32,
        #[arg(long, default_value_t = 30.0)]
        session_minutes: f64,
    },
    /// Session finished
    SessionEnd {
        #[arg(long, default_value_t = 60.0)]
        session_minutes: f64,
    },
    /// Long stretch in one application
    SameApp {
        #[arg(long, default_value = "this app")]
        app: String,
        #[arg(long, default_value = "")]
        window: String,
        #[arg(long, default_value_t = 10)]
        minutes: u32,
    },
}

impl From<TriggerAction> for TimeTrigger {
    fn from(action: TriggerAction) -> Self {
        match action {
            TriggerAction::BreakReminder {
                break_number,
                session_minutes,
            } => TimeTrigger::BreakReminder {
                break_number,
                session_minutes,
            },
            TriggerAction::SessionEnd { session_minutes } => {
                TimeTrigger::SessionEnd { session_minutes }
            }
            TriggerAction::SameApp {
                app,
                window,
                minutes,
            } => TimeTrigger::SameAppDuration {
                current_app: app,
                window_title: window,
                same_app_minutes: minutes,
            },
        }
    }
}

pub fn run(device_id: &str, action: TriggerAction) -> CmdResult {
    let config = Config::load()?;
    let trigger = TimeTrigger::from(action);
    let hint = runtime()?.block_on(async {
        let orchestrator = orchestrator(&config, false).await?;
        let hint = orchestrator
            .decide(device_id, Some(&trigger), false, None, Utc::now())
            .await?;
        Ok::<_, Box<dyn std::error::Error>>(hint)
    })?;
    print_json(&hint)
}
