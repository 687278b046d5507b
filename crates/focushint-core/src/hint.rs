//! Hint records and their lifecycle.
//!
//! A hint moves `pending -> shown -> dismissed` (or straight to dismissed).
//! Status never moves backwards and the `shown_at` / `dismissed_at` stamps
//! are written once, on the first transition into that state.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Closed set of hint categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HintCategory {
    BreakReminder,
    AppSuggestion,
    WorkflowTip,
    FocusAlert,
    EventReminder,
}

impl HintCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            HintCategory::BreakReminder => "break_reminder",
            HintCategory::AppSuggestion => "app_suggestion",
            HintCategory::WorkflowTip => "workflow_tip",
            HintCategory::FocusAlert => "focus_alert",
            HintCategory::EventReminder => "event_reminder",
        }
    }
}

impl FromStr for HintCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "break_reminder" => Ok(HintCategory::BreakReminder),
            "app_suggestion" => Ok(HintCategory::AppSuggestion),
            "workflow_tip" => Ok(HintCategory::WorkflowTip),
            "focus_alert" => Ok(HintCategory::FocusAlert),
            "event_reminder" => Ok(HintCategory::EventReminder),
            other => Err(ValidationError::invalid(
                "category",
                format!("unknown category '{other}'"),
            )),
        }
    }
}

impl fmt::Display for HintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hint priority. Ordering is `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintPriority {
    Low,
    Medium,
    High,
}

impl HintPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            HintPriority::Low => "low",
            HintPriority::Medium => "medium",
            HintPriority::High => "high",
        }
    }
}

impl FromStr for HintPriority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(HintPriority::Low),
            "medium" => Ok(HintPriority::Medium),
            "high" => Ok(HintPriority::High),
            other => Err(ValidationError::invalid(
                "priority",
                format!("unknown priority '{other}'"),
            )),
        }
    }
}

impl fmt::Display for HintPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintStatus {
    Pending,
    Shown,
    Dismissed,
}

impl HintStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HintStatus::Pending => "pending",
            HintStatus::Shown => "shown",
            HintStatus::Dismissed => "dismissed",
        }
    }

    fn rank(self) -> u8 {
        match self {
            HintStatus::Pending => 0,
            HintStatus::Shown => 1,
            HintStatus::Dismissed => 2,
        }
    }

    /// Whether moving from `self` to `next` keeps the lifecycle monotonic.
    /// Staying in the same state is allowed.
    pub fn can_transition_to(self, next: HintStatus) -> bool {
        next.rank() >= self.rank()
    }
}

impl FromStr for HintStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(HintStatus::Pending),
            "shown" => Ok(HintStatus::Shown),
            "dismissed" => Ok(HintStatus::Dismissed),
            other => Err(ValidationError::invalid(
                "status",
                format!("unknown status '{other}'"),
            )),
        }
    }
}

impl fmt::Display for HintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of a hint before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintDraft {
    pub category: HintCategory,
    pub priority: HintPriority,
    pub title: String,
    pub message: String,
}

impl HintDraft {
    pub fn new(
        category: HintCategory,
        priority: HintPriority,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            priority,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// A persisted hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    pub id: i64,
    pub device_id: String,
    pub category: HintCategory,
    pub priority: HintPriority,
    pub title: String,
    pub message: String,
    pub status: HintStatus,
    pub created_at: DateTime<Utc>,
    pub shown_at: Option<DateTime<Utc>>,
    pub dismissed_at: Option<DateTime<Utc>>,
}

impl Hint {
    /// Apply a status update in memory.
    ///
    /// Returns `Ok(true)` when something changed. Timestamps already set are
    /// kept as they are.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidTransition`] for a backwards move.
    pub fn transition(
        &mut self,
        next: HintStatus,
        now: DateTime<Utc>,
    ) -> Result<bool, ValidationError> {
        if !self.status.can_transition_to(next) {
            return Err(ValidationError::InvalidTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }

        let mut changed = self.status != next;
        self.status = next;

        match next {
            HintStatus::Shown if self.shown_at.is_none() => {
                self.shown_at = Some(now);
                changed = true;
            }
            HintStatus::Dismissed if self.dismissed_at.is_none() => {
                self.dismissed_at = Some(now);
                changed = true;
            }
            _ => {}
        }

        Ok(changed)
    }
}

/// Summary of a past hint handed to the decision pipeline as repetition context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentHint {
    pub category: HintCategory,
    pub title: String,
    pub message: String,
}

/// Pending hints for a device as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingHints {
    pub hints: Vec<Hint>,
    pub count: usize,
}

impl From<Vec<Hint>> for PendingHints {
    fn from(hints: Vec<Hint>) -> Self {
        let count = hints.len();
        Self { hints, count }
    }
}
