//! Hint decisioning.
//!
//! Time triggers go straight to the template generators. Everything else
//! passes the eligibility gate, is classified from the trailing hour of
//! activity and, when a behavior is found, composed by the text-generation
//! backend.
//!
//! The store is one SQLite connection behind a mutex. It is locked only for
//! synchronous store work and released before the model call.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::activity::{window_start, ActivityEvent, ActivityReport, ActivitySummary, StruggleSignals};
use crate::behavior::{classify, Behavior};
use crate::composer::{HintComposer, TextGenerator};
use crate::error::{DatabaseError, Result, ValidationError};
use crate::gate::EligibilityGate;
use crate::generators::TimeTriggerGenerator;
use crate::hint::Hint;
use crate::preferences::PreferenceDefaults;
use crate::storage::{Config, Database};

/// Number of past hints loaded as repetition context.
pub const RECENT_HINTS_CONTEXT: usize = 10;

/// Struggle score at which a report is logged as a struggle.
const STRUGGLE_LOG_THRESHOLD: u8 = 4;

fn default_break_number() -> u32 {
    1
}
fn default_break_session_minutes() -> f64 {
    30.0
}
fn default_session_end_minutes() -> f64 {
    60.0
}
fn default_current_app() -> String {
    "this app".into()
}
fn default_same_app_minutes() -> u32 {
    10
}

/// Explicit time signal from a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trigger_type", rename_all = "snake_case")]
pub enum TimeTrigger {
    BreakReminder {
        #[serde(default = "default_break_number")]
        break_number: u32,
        #[serde(default = "default_break_session_minutes")]
        session_minutes: f64,
    },
    SessionEnd {
        #[serde(default = "default_session_end_minutes")]
        session_minutes: f64,
    },
    SameAppDuration {
        #[serde(default = "default_current_app")]
        current_app: String,
        #[serde(default)]
        window_title: String,
        #[serde(default = "default_same_app_minutes")]
        same_app_minutes: u32,
    },
}

/// Result of storing a batch report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedReport {
    pub records: Vec<ActivityEvent>,
    /// The first reported app differs from the one stored before the batch.
    pub is_app_switch: bool,
    /// Signals of the first item, handed to the hint check.
    pub signals: Option<StruggleSignals>,
}

/// Routes triggers to the gate, the generators or the composer.
pub struct HintOrchestrator<G> {
    db: Arc<Mutex<Database>>,
    gate: EligibilityGate,
    composer: HintComposer<G>,
    time_hints: TimeTriggerGenerator,
    defaults: PreferenceDefaults,
}

impl<G: TextGenerator> HintOrchestrator<G> {
    pub fn new(
        db: Arc<Mutex<Database>>,
        gate: EligibilityGate,
        composer: HintComposer<G>,
        time_hints: TimeTriggerGenerator,
        defaults: PreferenceDefaults,
    ) -> Self {
        Self {
            db,
            gate,
            composer,
            time_hints,
            defaults,
        }
    }

    /// Wire everything from `config`.
    pub fn from_config(db: Arc<Mutex<Database>>, composer: HintComposer<G>, config: &Config) -> Self {
        Self::new(
            db,
            EligibilityGate::new(config.gate.clone()),
            composer,
            TimeTriggerGenerator::new(config.generators.seed),
            config.preferences.clone(),
        )
    }

    pub fn database(&self) -> &Arc<Mutex<Database>> {
        &self.db
    }

    pub fn composer(&self) -> &HintComposer<G> {
        &self.composer
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>> {
        self.db.lock().map_err(|_| DatabaseError::Poisoned.into())
    }

    /// Decide whether to create a hint for `device_id`, and create it.
    ///
    /// Returns `Ok(None)` when the gate denies, no behavior is detected, the
    /// category is switched off, or the model gives nothing usable.
    ///
    /// # Errors
    /// Store failures propagate. Model failures never do.
    pub async fn decide(
        &self,
        device_id: &str,
        trigger: Option<&TimeTrigger>,
        is_app_switch: bool,
        signals: Option<&StruggleSignals>,
        now: DateTime<Utc>,
    ) -> Result<Option<Hint>> {
        if let Some(trigger) = trigger {
            return self.time_hint(device_id, trigger, now).map(Some);
        }

        let Some((behavior, recent_titles)) =
            self.prepare(device_id, is_app_switch, signals, now)?
        else {
            return Ok(None);
        };

        let suggestion = self.composer.compose(&behavior, &recent_titles).await;
        let Some(draft) = suggestion.to_draft() else {
            return Ok(None);
        };

        let hint = self.lock()?.insert_hint(device_id, &draft, now)?;
        tracing::info!(
            device_id,
            hint_id = hint.id,
            behavior = %behavior.kind(),
            title = %hint.title,
            "generated hint"
        );
        Ok(Some(hint))
    }

    fn time_hint(&self, device_id: &str, trigger: &TimeTrigger, now: DateTime<Utc>) -> Result<Hint> {
        let db = self.lock()?;
        match trigger {
            TimeTrigger::BreakReminder {
                break_number,
                session_minutes,
            } => self
                .time_hints
                .break_reminder(&db, device_id, *break_number, *session_minutes, now),
            TimeTrigger::SessionEnd { session_minutes } => {
                self.time_hints.session_end(&db, device_id, *session_minutes, now)
            }
            TimeTrigger::SameAppDuration {
                current_app,
                window_title,
                same_app_minutes,
            } => self.time_hints.same_app(
                &db,
                device_id,
                current_app,
                window_title,
                *same_app_minutes,
                now,
            ),
        }
    }

    /// Gate, summarize and classify. The store lock is released before classifying.
    fn prepare(
        &self,
        device_id: &str,
        is_app_switch: bool,
        signals: Option<&StruggleSignals>,
        now: DateTime<Utc>,
    ) -> Result<Option<(Behavior, Vec<String>)>> {
        let db = self.lock()?;

        let prefs = db.get_or_create_preferences(device_id, &self.defaults, now)?;
        if !self.gate.may_send(&db, device_id, &prefs, is_app_switch, now)? {
            return Ok(None);
        }

        let events = db.activities_since(device_id, window_start(now))?;
        let mut summary = ActivitySummary::from_events(&events, now, is_app_switch);
        if let Some(signals) = signals {
            summary.overlay(signals);
        }
        let recent = db.recent_hints(device_id, RECENT_HINTS_CONTEXT)?;
        drop(db);

        let behavior = classify(&summary.signals());
        tracing::debug!(
            device_id,
            behavior = %behavior.kind(),
            app = %summary.current_app,
            struggle_score = summary.struggle_score,
            "classified activity"
        );
        if behavior.is_none() {
            return Ok(None);
        }

        if let Some(category) = behavior.kind().hint_category() {
            if !prefs.allows(category) {
                tracing::debug!(device_id, %category, "category disabled by preferences");
                return Ok(None);
            }
        }

        let titles = recent.into_iter().map(|h| h.title).collect();
        Ok(Some((behavior, titles)))
    }

    /// Validate and store a batch report.
    ///
    /// # Errors
    /// Validation failures are returned before anything is written.
    pub fn record_report(&self, report: &ActivityReport, now: DateTime<Utc>) -> Result<RecordedReport> {
        report.validate()?;

        let db = self.lock()?;
        let previous_app = db.last_reported_app(&report.device_id)?;

        let tx = db.conn().unchecked_transaction()?;
        let records = report
            .activities
            .iter()
            .map(|item| db.insert_activity(&report.device_id, item, now))
            .collect::<Result<Vec<_>>>()?;
        tx.commit()?;

        let Some(current) = report.activities.first() else {
            return Ok(RecordedReport {
                records,
                is_app_switch: false,
                signals: None,
            });
        };

        let is_app_switch = previous_app.is_some_and(|prev| prev != current.app_name);
        let score = current.struggle_score.unwrap_or(0);
        if score >= STRUGGLE_LOG_THRESHOLD {
            tracing::info!(device_id = %report.device_id, app = %current.app_name, score, is_app_switch, "struggle reported");
        } else {
            tracing::debug!(device_id = %report.device_id, app = %current.app_name, score, is_app_switch, "activity reported");
        }

        Ok(RecordedReport {
            records,
            is_app_switch,
            signals: Some(current.struggle_signals()),
        })
    }

    /// Persist an event reminder. Reminders bypass the gate.
    pub fn remind_event(&self, device_id: &str, event_title: &str, now: DateTime<Utc>) -> Result<Hint> {
        if event_title.trim().is_empty() {
            return Err(ValidationError::invalid("event_title", "must not be empty").into());
        }
        let db = self.lock()?;
        self.time_hints.event_reminder(&db, device_id, event_title, now)
    }
}

impl<G: TextGenerator + 'static> HintOrchestrator<G> {
    /// Run [`decide`](Self::decide) for an activity report on the current runtime.
    ///
    /// # Errors
    /// Returns [`CoreError::NoRuntime`](crate::CoreError::NoRuntime) when called outside a Tokio runtime.
    pub fn spawn_hint_check(
        self: &Arc<Self>,
        device_id: String,
        is_app_switch: bool,
        signals: Option<StruggleSignals>,
        now: DateTime<Utc>,
    ) -> Result<JoinHandle<Result<Option<Hint>>>> {
        let runtime = Handle::try_current()?;
        let this = Arc::clone(self);
        Ok(runtime.spawn(async move {
            let outcome = this
                .decide(&device_id, None, is_app_switch, signals.as_ref(), now)
                .await;
            if let Err(e) = &outcome {
                tracing::error!(%device_id, error = %e, "hint check failed");
            }
            outcome
        }))
    }

    /// Store `report` and schedule the hint check for it.
    ///
    /// The handle is `None` for an empty batch.
    ///
    /// # Errors
    /// Fails without writing when called outside a Tokio runtime, and on
    /// validation or store failures.
    pub fn handle_report(
        self: &Arc<Self>,
        report: &ActivityReport,
        now: DateTime<Utc>,
    ) -> Result<(Vec<ActivityEvent>, Option<JoinHandle<Result<Option<Hint>>>>)> {
        Handle::try_current()?;
        let recorded = self.record_report(report, now)?;
        let handle = recorded
            .signals
            .map(|signals| {
                self.spawn_hint_check(report.device_id.clone(), recorded.is_app_switch, Some(signals), now)
            })
            .transpose()?;
        Ok((recorded.records, handle))
    }
}
