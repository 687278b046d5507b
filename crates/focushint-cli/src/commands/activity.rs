use std::io::Read;
use std::path::PathBuf;

use chrono::Utc;
use clap::Subcommand;
use focushint_core::{ActivityEvent, ActivityReport, Config, Database, Hint};
use serde::Serialize;

use super::{orchestrator, print_json, runtime, CmdResult};

#[derive(Subcommand)]
pub enum ActivityAction {
    /// Store a batch report and run the hint check
    Report {
        /// JSON file with `{device_id, activities}` (stdin when omitted)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Recent activity for a device, newest first
    List {
        device_id: String,
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
}

#[derive(Serialize)]
struct ReportOutput {
    records: Vec<ActivityEvent>,
    hint: Option<Hint>,
}

fn read_report(file: Option<PathBuf>) -> Result<ActivityReport, Box<dyn std::error::Error>> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&raw)?)
}

pub fn run(action: ActivityAction) -> CmdResult {
    match action {
        ActivityAction::Report { file } => {
            let report = read_report(file)?;
            let config = Config::load()?;
            runtime()?.block_on(async {
                let orchestrator = orchestrator(&config, true).await?;
                let (records, handle) = orchestrator.handle_report(&report, Utc::now())?;
                let hint = match handle {
                    Some(handle) => handle.await??,
                    None => None,
                };
                print_json(&ReportOutput { records, hint })
            })?;
        }
        ActivityAction::List { device_id, limit } => {
            let db = Database::open()?;
            print_json(&db.recent_activities(&device_id, limit)?)?;
        }
    }
    Ok(())
}
