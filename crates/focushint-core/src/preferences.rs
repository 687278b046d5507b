//! Per-device user preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hint::HintCategory;

/// Stored preferences for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub id: i64,
    pub device_id: String,
    pub work_session_minutes: u32,
    /// Hourly hint cap. `0` means "unset" and falls back to the gate default.
    pub max_hints_per_hour: u32,
    pub enable_break_reminders: bool,
    pub enable_app_suggestions: bool,
    pub enable_workflow_tips: bool,
    pub break_interval_minutes: u32,
    pub session_duration_minutes: u32,
    pub same_app_threshold_minutes: u32,
    pub enable_same_app_hints: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserPreferences {
    /// Whether hints of `category` may be produced by the model pipeline.
    ///
    /// Focus alerts and event reminders have no switch and are always on.
    pub fn allows(&self, category: HintCategory) -> bool {
        match category {
            HintCategory::BreakReminder => self.enable_break_reminders,
            HintCategory::AppSuggestion => self.enable_app_suggestions,
            HintCategory::WorkflowTip => self.enable_workflow_tips,
            HintCategory::FocusAlert | HintCategory::EventReminder => true,
        }
    }

    /// Apply the fields present in `patch`.
    pub fn apply(&mut self, patch: &PreferencesPatch, now: DateTime<Utc>) {
        if let Some(v) = patch.work_session_minutes {
            self.work_session_minutes = v;
        }
        if let Some(v) = patch.max_hints_per_hour {
            self.max_hints_per_hour = v;
        }
        if let Some(v) = patch.enable_break_reminders {
            self.enable_break_reminders = v;
        }
        if let Some(v) = patch.enable_app_suggestions {
            self.enable_app_suggestions = v;
        }
        if let Some(v) = patch.enable_workflow_tips {
            self.enable_workflow_tips = v;
        }
        if let Some(v) = patch.break_interval_minutes {
            self.break_interval_minutes = v;
        }
        if let Some(v) = patch.session_duration_minutes {
            self.session_duration_minutes = v;
        }
        if let Some(v) = patch.same_app_threshold_minutes {
            self.same_app_threshold_minutes = v;
        }
        if let Some(v) = patch.enable_same_app_hints {
            self.enable_same_app_hints = v;
        }
        self.updated_at = now;
    }
}

/// Values used when a device's preferences row is created lazily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceDefaults {
    #[serde(default = "default_work_session_minutes")]
    pub work_session_minutes: u32,
    #[serde(default = "default_max_hints_per_hour")]
    pub max_hints_per_hour: u32,
    #[serde(default = "default_true")]
    pub enable_break_reminders: bool,
    #[serde(default = "default_true")]
    pub enable_app_suggestions: bool,
    #[serde(default = "default_true")]
    pub enable_workflow_tips: bool,
    #[serde(default = "default_break_interval_minutes")]
    pub break_interval_minutes: u32,
    #[serde(default = "default_session_duration_minutes")]
    pub session_duration_minutes: u32,
    #[serde(default = "default_same_app_threshold_minutes")]
    pub same_app_threshold_minutes: u32,
    #[serde(default = "default_true")]
    pub enable_same_app_hints: bool,
}

fn default_work_session_minutes() -> u32 {
    30
}
fn default_max_hints_per_hour() -> u32 {
    10
}
fn default_break_interval_minutes() -> u32 {
    30
}
fn default_session_duration_minutes() -> u32 {
    60
}
fn default_same_app_threshold_minutes() -> u32 {
    10
}
fn default_true() -> bool {
    true
}

impl Default for PreferenceDefaults {
    fn default() -> Self {
        Self {
            work_session_minutes: default_work_session_minutes(),
            max_hints_per_hour: default_max_hints_per_hour(),
            enable_break_reminders: true,
            enable_app_suggestions: true,
            enable_workflow_tips: true,
            break_interval_minutes: default_break_interval_minutes(),
            session_duration_minutes: default_session_duration_minutes(),
            same_app_threshold_minutes: default_same_app_threshold_minutes(),
            enable_same_app_hints: true,
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferencesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_session_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_hints_per_hour: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_break_reminders: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_app_suggestions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_workflow_tips: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_interval_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub same_app_threshold_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_same_app_hints: Option<bool>,
}

impl PreferencesPatch {
    pub fn is_empty(&self) -> bool {
        *self == PreferencesPatch::default()
    }
}
