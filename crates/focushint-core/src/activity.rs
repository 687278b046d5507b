//! Activity reports, stored activity events and the trailing-hour summary.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::behavior::ActivitySignals;
use crate::error::ValidationError;

/// Upper bound of the client-computed struggle score.
pub const MAX_STRUGGLE_SCORE: u8 = 10;

/// Width of the analysis window used for summaries.
pub const ANALYSIS_WINDOW_MINUTES: i64 = 60;

/// How many of the newest events feed the recent-app list.
const RECENT_APP_SCAN: usize = 10;

/// One item of a client batch report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityReportItem {
    pub app_name: String,
    #[serde(default)]
    pub window_title: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub idle_seconds: Option<f64>,
    #[serde(default)]
    pub might_be_stuck: Option<bool>,
    #[serde(default)]
    pub app_switch_count: Option<u32>,
    #[serde(default)]
    pub session_minutes: Option<f64>,
    #[serde(default)]
    pub struggle_score: Option<u8>,
    #[serde(default)]
    pub tab_switch_count: Option<u32>,
    #[serde(default)]
    pub back_and_forth_count: Option<u32>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub recent_windows: Option<Vec<String>>,
}

/// Batch report from one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityReport {
    pub device_id: String,
    pub activities: Vec<ActivityReportItem>,
}

impl ActivityReport {
    /// Reject malformed reports before anything is stored.
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.device_id.trim().is_empty() {
            return Err(ValidationError::invalid("device_id", "must not be empty"));
        }
        for item in &self.activities {
            item.validate()?;
        }
        Ok(())
    }
}

impl ActivityReportItem {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.app_name.trim().is_empty() {
            return Err(ValidationError::invalid("app_name", "must not be empty"));
        }
        if let Some(end) = self.ended_at {
            if end < self.started_at {
                return Err(ValidationError::InvalidTimeRange {
                    start: self.started_at,
                    end,
                });
            }
        }
        if let Some(score) = self.struggle_score {
            if score > MAX_STRUGGLE_SCORE {
                return Err(ValidationError::invalid(
                    "struggle_score",
                    format!("{score} exceeds {MAX_STRUGGLE_SCORE}"),
                ));
            }
        }
        for (field, value) in [
            ("duration_seconds", self.duration_seconds),
            ("idle_seconds", self.idle_seconds),
        ] {
            if value.is_some_and(|v| v < 0.0 || !v.is_finite()) {
                return Err(ValidationError::invalid(field, "must be a non-negative number"));
            }
        }
        Ok(())
    }

    /// Duration reported by the client, or derived from the time range.
    pub fn effective_duration_seconds(&self) -> Option<f64> {
        self.duration_seconds.or_else(|| {
            self.ended_at
                .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0)
        })
    }

    /// Struggle fields of this item as the current activity.
    ///
    /// Every per-window field is set, with missing values as empty or zero,
    /// so the overlay never keeps another app's window or counters.
    pub fn struggle_signals(&self) -> StruggleSignals {
        StruggleSignals {
            current_app: Some(self.app_name.clone()),
            window_title: Some(self.window_title.clone().unwrap_or_default()),
            struggle_score: Some(self.struggle_score.unwrap_or_default()),
            tab_switch_count: Some(self.tab_switch_count.unwrap_or_default()),
            back_and_forth_count: Some(self.back_and_forth_count.unwrap_or_default()),
            app_switch_count: Some(self.app_switch_count.unwrap_or_default()),
            context: Some(self.context.clone().unwrap_or_default()),
            recent_windows: Some(self.recent_windows.clone().unwrap_or_default()),
            session_minutes: self.session_minutes,
        }
    }
}

/// A persisted activity event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub id: i64,
    pub device_id: String,
    pub app_name: String,
    pub window_title: Option<String>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<f64>,
    pub idle_seconds: Option<f64>,
    pub might_be_stuck: Option<bool>,
    pub struggle_score: Option<u8>,
    pub tab_switch_count: Option<u32>,
    pub back_and_forth_count: Option<u32>,
    pub context: Option<String>,
    pub recent_windows: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Signals supplied directly by the caller. Present fields override the
/// values aggregated from stored events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StruggleSignals {
    #[serde(default)]
    pub current_app: Option<String>,
    #[serde(default)]
    pub window_title: Option<String>,
    #[serde(default)]
    pub struggle_score: Option<u8>,
    #[serde(default)]
    pub tab_switch_count: Option<u32>,
    #[serde(default)]
    pub back_and_forth_count: Option<u32>,
    #[serde(default)]
    pub app_switch_count: Option<u32>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub recent_windows: Option<Vec<String>>,
    #[serde(default)]
    pub session_minutes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentApp {
    pub app: String,
    pub window: Option<String>,
}

/// Aggregate of a device's trailing-hour activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub session_duration_minutes: f64,
    pub dominant_app: String,
    pub current_app: String,
    pub current_window_title: Option<String>,
    pub app_switch_count: u32,
    pub might_be_stuck: bool,
    pub idle_seconds: f64,
    pub recent_apps: Vec<RecentApp>,
    pub is_app_switch: bool,
    pub struggle_score: u8,
    pub tab_switch_count: u32,
    pub back_and_forth_count: u32,
    pub context: String,
    pub recent_windows: Vec<String>,
}

impl ActivitySummary {
    fn empty(is_app_switch: bool) -> Self {
        Self {
            session_duration_minutes: 0.0,
            dominant_app: "Unknown".into(),
            current_app: "Unknown".into(),
            current_window_title: None,
            app_switch_count: 0,
            might_be_stuck: false,
            idle_seconds: 0.0,
            recent_apps: Vec::new(),
            is_app_switch,
            struggle_score: 0,
            tab_switch_count: 0,
            back_and_forth_count: 0,
            context: String::new(),
            recent_windows: Vec::new(),
        }
    }

    /// Summarize `events`, which must be ordered newest first.
    pub fn from_events(events: &[ActivityEvent], now: DateTime<Utc>, is_app_switch: bool) -> Self {
        let Some(latest) = events.first() else {
            return Self::empty(is_app_switch);
        };

        let session_duration_minutes = events
            .iter()
            .map(|e| e.started_at)
            .min()
            .map(|first| (now - first).num_milliseconds() as f64 / 60_000.0)
            .unwrap_or(0.0);

        // Insertion order is newest first, so ties go to the most recent app.
        let mut totals: Vec<(&str, f64)> = Vec::new();
        for event in events {
            let secs = event.duration_seconds.unwrap_or(0.0);
            match totals.iter_mut().find(|(app, _)| *app == event.app_name) {
                Some((_, total)) => *total += secs,
                None => totals.push((&event.app_name, secs)),
            }
        }
        let mut dominant_app = "Unknown";
        let mut best = f64::NEG_INFINITY;
        for (app, total) in &totals {
            if *total > best {
                best = *total;
                dominant_app = app;
            }
        }

        let mut seen = HashSet::new();
        let recent_apps = events
            .iter()
            .take(RECENT_APP_SCAN)
            .filter(|e| seen.insert(e.app_name.as_str()))
            .map(|e| RecentApp {
                app: e.app_name.clone(),
                window: e.window_title.clone(),
            })
            .collect();

        let app_switch_count = events
            .windows(2)
            .filter(|pair| pair[0].app_name != pair[1].app_name)
            .count() as u32;

        Self {
            session_duration_minutes,
            dominant_app: dominant_app.to_string(),
            current_app: latest.app_name.clone(),
            current_window_title: latest.window_title.clone(),
            app_switch_count,
            might_be_stuck: latest.might_be_stuck.unwrap_or(false),
            idle_seconds: latest.idle_seconds.unwrap_or(0.0),
            recent_apps,
            is_app_switch,
            struggle_score: latest.struggle_score.unwrap_or(0),
            tab_switch_count: latest.tab_switch_count.unwrap_or(0),
            back_and_forth_count: latest.back_and_forth_count.unwrap_or(0),
            context: latest.context.clone().unwrap_or_default(),
            recent_windows: latest.recent_windows.clone(),
        }
    }

    /// Let caller-supplied signals win over the aggregated values.
    pub fn overlay(&mut self, signals: &StruggleSignals) {
        if let Some(app) = &signals.current_app {
            self.current_app = app.clone();
        }
        if let Some(window) = &signals.window_title {
            self.current_window_title = Some(window.clone());
        }
        if let Some(v) = signals.struggle_score {
            self.struggle_score = v;
        }
        if let Some(v) = signals.tab_switch_count {
            self.tab_switch_count = v;
        }
        if let Some(v) = signals.back_and_forth_count {
            self.back_and_forth_count = v;
        }
        if let Some(v) = signals.app_switch_count {
            self.app_switch_count = v;
        }
        if let Some(context) = &signals.context {
            self.context = context.clone();
        }
        if let Some(windows) = &signals.recent_windows {
            self.recent_windows = windows.clone();
        }
        if let Some(v) = signals.session_minutes {
            self.session_duration_minutes = v;
        }
    }

    /// Classifier input derived from this summary.
    pub fn signals(&self) -> ActivitySignals {
        ActivitySignals {
            current_app: self.current_app.clone(),
            window_title: self.current_window_title.clone().unwrap_or_default(),
            context: self.context.clone(),
            recent_windows: self.recent_windows.clone(),
            struggle_score: self.struggle_score,
            back_and_forth_count: self.back_and_forth_count,
            tab_switch_count: self.tab_switch_count,
            app_switch_count: self.app_switch_count,
            session_minutes: self.session_duration_minutes,
        }
    }
}

/// Start of the trailing analysis window ending at `now`.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::minutes(ANALYSIS_WINDOW_MINUTES)
}
