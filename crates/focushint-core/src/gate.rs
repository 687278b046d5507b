//! Per-device hint eligibility.
//!
//! Every check re-reads the store, in order:
//! 1. **Sweep**: open hints older than `stale_after_secs` are dismissed
//! 2. **Spacing**: the newest hint must be at least `min_spacing_secs` old
//! 3. **Hourly cap**: fewer than `max_hints_per_hour` hints in the window
//!
//! Two requests racing through the spacing check can both pass. Duplicate
//! hints are tolerated, so there is no per-device lock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::preferences::UserPreferences;
use crate::storage::{Database, GateConfig};

/// Outcome of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum Eligibility {
    Allowed,
    /// The previous hint is too recent.
    TooSoon { seconds_since_last: i64 },
    /// The hourly budget is spent.
    HourlyCapReached { count: u32, cap: u32 },
}

impl Eligibility {
    pub fn is_allowed(self) -> bool {
        matches!(self, Eligibility::Allowed)
    }
}

/// Rate limiter in front of the model pipeline.
#[derive(Debug, Clone, Default)]
pub struct EligibilityGate {
    config: GateConfig,
}

impl EligibilityGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Hourly cap for `prefs`, with `0` meaning "use the fallback".
    pub fn hourly_cap(&self, prefs: &UserPreferences) -> u32 {
        if prefs.max_hints_per_hour == 0 {
            self.config.fallback_max_hints_per_hour
        } else {
            prefs.max_hints_per_hour
        }
    }

    /// Run the sweep and both limits for `device_id`.
    ///
    /// # Errors
    /// Store failures, including a failed sweep, propagate.
    pub fn check(
        &self,
        db: &Database,
        device_id: &str,
        prefs: &UserPreferences,
        is_app_switch: bool,
        now: DateTime<Utc>,
    ) -> Result<Eligibility> {
        let cutoff = now - Duration::seconds(self.config.stale_after_secs);
        let swept = db.dismiss_stale_hints(device_id, cutoff, now)?;
        if swept > 0 {
            tracing::debug!(device_id, swept, "dismissed stale hints");
        }

        if let Some(last) = db.latest_hint_created_at(device_id)? {
            let since = now - last;
            if since < Duration::seconds(self.config.min_spacing_secs) {
                let seconds_since_last = since.num_seconds();
                tracing::info!(device_id, seconds_since_last, is_app_switch, "hint rate limited: too soon");
                return Ok(Eligibility::TooSoon { seconds_since_last });
            }
        }

        let cap = self.hourly_cap(prefs);
        let window_start = now - Duration::minutes(self.config.window_minutes);
        let count = db.count_hints_since(device_id, window_start)?;
        if count >= cap {
            tracing::info!(device_id, count, cap, "hint rate limited: hourly cap");
            return Ok(Eligibility::HourlyCapReached { count, cap });
        }

        Ok(Eligibility::Allowed)
    }

    /// Whether a new hint may be created for `device_id` at `now`.
    ///
    /// # Errors
    /// Store failures, including a failed sweep, propagate.
    pub fn may_send(
        &self,
        db: &Database,
        device_id: &str,
        prefs: &UserPreferences,
        is_app_switch: bool,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(self.check(db, device_id, prefs, is_app_switch, now)?.is_allowed())
    }
}
