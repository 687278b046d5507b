use chrono::Utc;
use clap::{Args, Subcommand};
use focushint_core::{Config, Database, PreferencesPatch, ValidationError};

use super::{print_json, CmdResult};

#[derive(Subcommand)]
pub enum PrefsAction {
    /// Show preferences, creating them from defaults on first use
    Get { device_id: String },
    /// Change some preferences
    Set {
        device_id: String,
        #[command(flatten)]
        patch: PatchArgs,
    },
}

#[derive(Args)]
pub struct PatchArgs {
    #[arg(long)]
    work_session_minutes: Option<u32>,
    /// 0 falls back to the configured cap
    #[arg(long)]
    max_hints_per_hour: Option<u32>,
    #[arg(long)]
    enable_break_reminders: Option<bool>,
    #[arg(long)]
    enable_app_suggestions: Option<bool>,
    #[arg(long)]
    enable_workflow_tips: Option<bool>,
    #[arg(long)]
    break_interval_minutes: Option<u32>,
    #[arg(long)]
    session_duration_minutes: Option<u32>,
    #[arg(long)]
    same_app_threshold_minutes: Option<u32>,
    #[arg(long)]
    enable_same_app_hints: Option<bool>,
}

impl From<PatchArgs> for PreferencesPatch {
    fn from(a: PatchArgs) -> Self {
        PreferencesPatch {
            work_session_minutes: a.work_session_minutes,
            max_hints_per_hour: a.max_hints_per_hour,
            enable_break_reminders: a.enable_break_reminders,
            enable_app_suggestions: a.enable_app_suggestions,
            enable_workflow_tips: a.enable_workflow_tips,
            break_interval_minutes: a.break_interval_minutes,
            session_duration_minutes: a.session_duration_minutes,
            same_app_threshold_minutes: a.same_app_threshold_minutes,
            enable_same_app_hints: a.enable_same_app_hints,
        }
    }
}

pub fn run(action: PrefsAction) -> CmdResult {
    let db = Database::open()?;
    match action {
        PrefsAction::Get { device_id } => {
            let config = Config::load()?;
            let prefs = db.get_or_create_preferences(&device_id, &config.preferences, Utc::now())?;
            print_json(&prefs)?;
        }
        PrefsAction::Set { device_id, patch } => {
            let patch = PreferencesPatch::from(patch);
            if patch.is_empty() {
                return Err(ValidationError::EmptyCollection("no preference fields given".into()).into());
            }
            print_json(&db.update_preferences(&device_id, &patch, Utc::now())?)?;
        }
    }
    Ok(())
}
