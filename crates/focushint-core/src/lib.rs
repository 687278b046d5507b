//! # Focushint Core Library
//!
//! Hint decision engine for a personal activity tracker. Clients report which
//! application and window they are using; the engine stores the reports and
//! decides, at a limited rate, whether to nudge the user with a short hint.
//!
//! ## Architecture
//!
//! - **Behavior**: ordered rule table mapping activity signals to at most one
//!   behavior tag
//! - **Composer**: prompt building and reply parsing around a text-generation
//!   backend (Ollama by default)
//! - **Gate**: per-device spacing, hourly cap and stale-hint sweep
//! - **Generators**: template hints for time triggers and calendar events
//! - **Orchestrator**: routes triggers through the pieces above and persists
//!   the resulting hint
//! - **Storage**: SQLite persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`HintOrchestrator`]: entry point for reports and triggers
//! - [`Database`]: activity, hint and preference persistence
//! - [`Config`]: application configuration management
//! - [`TextGenerator`]: seam for the text-generation backend

pub mod activity;
pub mod behavior;
pub mod composer;
pub mod error;
pub mod gate;
pub mod generators;
pub mod hint;
pub mod orchestrator;
pub mod preferences;
pub mod storage;

pub use activity::{ActivityEvent, ActivityReport, ActivityReportItem, ActivitySummary, StruggleSignals};
pub use behavior::{classify, ActivitySignals, Behavior, BehaviorKind};
pub use composer::{HintComposer, OllamaClient, Suggestion, TextGenerator};
pub use error::{ConfigError, CoreError, DatabaseError, GenerateError, ValidationError};
pub use gate::{Eligibility, EligibilityGate};
pub use generators::TimeTriggerGenerator;
pub use hint::{Hint, HintCategory, HintDraft, HintPriority, HintStatus, PendingHints};
pub use orchestrator::{HintOrchestrator, RecordedReport, TimeTrigger};
pub use preferences::{PreferenceDefaults, PreferencesPatch, UserPreferences};
pub use storage::{Config, Database};
