//! Behavior classification from activity signals.
//!
//! [`classify`] walks an ordered rule table and returns the behavior built by
//! the first rule whose predicate matches. Rules never combine: exactly one
//! [`Behavior`] variant comes out of every call.

mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hint::{HintCategory, HintPriority};

pub use rules::{classify, matching_rule, Rule, RuleKind, RULES};

/// Snapshot of recent activity handed to the classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivitySignals {
    pub current_app: String,
    pub window_title: String,
    /// Free-text context reported by the client.
    pub context: String,
    /// Recent window titles, most recent first.
    pub recent_windows: Vec<String>,
    pub struggle_score: u8,
    pub back_and_forth_count: u32,
    pub tab_switch_count: u32,
    pub app_switch_count: u32,
    pub session_minutes: f64,
}

/// Inferred user activity pattern, with the evidence that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Behavior {
    Debugging {
        error_context: String,
        struggle_score: u8,
        app: String,
    },
    Coding {
        app: String,
        file: Option<String>,
        file_type: Option<String>,
        recent_context: Vec<String>,
    },
    Researching {
        query: String,
        recent_searches: Vec<String>,
        app: String,
    },
    Distracted {
        app_switches: u32,
        back_and_forth: u32,
        app: String,
    },
    Browsing {
        page: String,
        app: String,
    },
    Communication {
        app: String,
        context: String,
    },
    None,
}

/// Fieldless tag of a [`Behavior`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorKind {
    Debugging,
    Coding,
    Researching,
    Distracted,
    Browsing,
    Communication,
    None,
}

impl BehaviorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BehaviorKind::Debugging => "debugging",
            BehaviorKind::Coding => "coding",
            BehaviorKind::Researching => "researching",
            BehaviorKind::Distracted => "distracted",
            BehaviorKind::Browsing => "browsing",
            BehaviorKind::Communication => "communication",
            BehaviorKind::None => "none",
        }
    }

    /// Category a model-generated hint for this behavior is filed under.
    pub fn hint_category(self) -> Option<HintCategory> {
        match self {
            BehaviorKind::Debugging | BehaviorKind::Researching => Some(HintCategory::WorkflowTip),
            BehaviorKind::Distracted => Some(HintCategory::FocusAlert),
            BehaviorKind::Coding | BehaviorKind::Browsing | BehaviorKind::Communication => {
                Some(HintCategory::AppSuggestion)
            }
            BehaviorKind::None => None,
        }
    }

    pub fn hint_priority(self) -> HintPriority {
        match self {
            BehaviorKind::Debugging | BehaviorKind::Distracted => HintPriority::High,
            _ => HintPriority::Medium,
        }
    }
}

impl fmt::Display for BehaviorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Behavior {
    pub fn kind(&self) -> BehaviorKind {
        match self {
            Behavior::Debugging { .. } => BehaviorKind::Debugging,
            Behavior::Coding { .. } => BehaviorKind::Coding,
            Behavior::Researching { .. } => BehaviorKind::Researching,
            Behavior::Distracted { .. } => BehaviorKind::Distracted,
            Behavior::Browsing { .. } => BehaviorKind::Browsing,
            Behavior::Communication { .. } => BehaviorKind::Communication,
            Behavior::None => BehaviorKind::None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Behavior::None)
    }
}
