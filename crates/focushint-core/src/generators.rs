//! Template hints for time triggers and calendar events.
//!
//! These never call the text-generation backend and never consult the
//! eligibility gate. Template choice is drawn from a seedable PCG source so a
//! fixed seed yields fixed output.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;

use crate::error::Result;
use crate::hint::{Hint, HintCategory, HintDraft, HintPriority};
use crate::storage::Database;

/// Longest slice of an event title kept in a reminder title.
const EVENT_TITLE_CHARS: usize = 18;

/// Render a session length as `"Xh Ym"` from one hour up, else `"M minutes"`.
pub fn format_session_duration(session_minutes: f64) -> String {
    let total = session_minutes.max(0.0) as u64;
    let (hours, mins) = (total / 60, total % 60);
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins} minutes")
    }
}

fn pick<R: Rng + ?Sized>(rng: &mut R, options: [(&str, String); 3]) -> (String, String) {
    let idx = rng.gen_range(0..options.len());
    let (title, message) = options.into_iter().nth(idx).unwrap_or_default();
    (title.to_string(), message)
}

/// The `break_number`-th reminder of a session. Numbers past the fourth reuse
/// the last message; `0` is treated as the first.
pub fn break_reminder_draft(break_number: u32, session_minutes: f64) -> HintDraft {
    let m = session_minutes.max(0.0) as u64;
    let messages = [
        ("Time for a break!", format!("You've been working for {m} minutes. Stand up and stretch!")),
        ("Break time!", format!("Great focus! {m} minutes in. Rest your eyes for a moment.")),
        ("Stretch break!", format!("{m} minutes of work. Roll your shoulders and take a breath.")),
        ("Session checkpoint!", format!("Congrats on {m} minutes! Take a well-deserved break.")),
    ];
    let idx = (break_number.max(1) as usize - 1).min(messages.len() - 1);
    let (title, message) = &messages[idx];
    HintDraft::new(HintCategory::BreakReminder, HintPriority::High, *title, message.clone())
}

pub fn session_end_draft<R: Rng + ?Sized>(rng: &mut R, session_minutes: f64) -> HintDraft {
    let t = format_session_duration(session_minutes);
    let (title, message) = pick(
        rng,
        [
            ("Session Complete!", format!("Amazing work! You've completed your {t} session. Time for a longer break!")),
            ("Great Session!", format!("You did it! {t} of focused work. Reward yourself with a proper break.")),
            ("Mission Accomplished!", format!("{t} session done! Step away, hydrate, and recharge.")),
        ],
    );
    HintDraft::new(HintCategory::BreakReminder, HintPriority::High, title, message)
}

/// Nudge after `minutes` in one application. The message names the window as
/// well when it says more than the app name.
pub fn same_app_draft<R: Rng + ?Sized>(
    rng: &mut R,
    app_name: &str,
    window_title: &str,
    minutes: u32,
) -> HintDraft {
    let ctx = if !window_title.is_empty() && window_title != app_name {
        format!("\"{window_title}\" in {app_name}")
    } else {
        app_name.to_string()
    };
    let d = minutes;

    let options = if d < 20 {
        [
            ("Deep Focus Mode", format!("You've been in {ctx} for {d} minutes. Great concentration!")),
            ("Focused Work", format!("{d} minutes on {ctx}. Remember to blink and breathe!")),
            ("In The Zone", format!("Nice focus! {d} min in {ctx}. Stay hydrated!")),
        ]
    } else if d < 40 {
        [
            ("Extended Focus", format!("{d} minutes in {ctx}. Consider a quick stretch!")),
            ("Long Session", format!("You've been focused on {ctx} for {d} min. Rest your eyes?")),
            ("Heads Up", format!("{d} min deep in {ctx}. A short break might boost productivity!")),
        ]
    } else {
        [
            ("Marathon Session!", format!("Wow! {d} minutes in {ctx}. Definitely time for a break!")),
            ("Ultra Focus", format!("You've been in {ctx} for {d} min! Your dedication is impressive, but please stretch!")),
            ("Time Check", format!("{d} minutes on {ctx}. Step away for a moment to recharge!")),
        ]
    };

    let (title, message) = pick(rng, options);
    HintDraft::new(HintCategory::FocusAlert, HintPriority::Medium, title, message)
}

pub fn event_reminder_draft(event_title: &str) -> HintDraft {
    let event_title = event_title.trim();
    let short: String = event_title.chars().take(EVENT_TITLE_CHARS).collect();
    HintDraft::new(
        HintCategory::EventReminder,
        HintPriority::High,
        format!("{short}!"),
        format!("Time for {event_title}"),
    )
}

/// Persists template hints for time triggers.
pub struct TimeTriggerGenerator {
    rng: Mutex<Mcg128Xsl64>,
}

impl TimeTriggerGenerator {
    /// Seeded from `seed`, or from OS entropy when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Mcg128Xsl64::seed_from_u64(seed),
            None => Mcg128Xsl64::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut Mcg128Xsl64) -> T) -> T {
        // A panic while drawing cannot leave the generator in a bad state.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }

    fn persist(&self, db: &Database, device_id: &str, draft: HintDraft, now: DateTime<Utc>) -> Result<Hint> {
        let hint = db.insert_hint(device_id, &draft, now)?;
        tracing::info!(
            device_id,
            hint_id = hint.id,
            category = %hint.category,
            title = %hint.title,
            "template hint created"
        );
        Ok(hint)
    }

    pub fn break_reminder(
        &self,
        db: &Database,
        device_id: &str,
        break_number: u32,
        session_minutes: f64,
        now: DateTime<Utc>,
    ) -> Result<Hint> {
        self.persist(db, device_id, break_reminder_draft(break_number, session_minutes), now)
    }

    pub fn session_end(
        &self,
        db: &Database,
        device_id: &str,
        session_minutes: f64,
        now: DateTime<Utc>,
    ) -> Result<Hint> {
        let draft = self.with_rng(|rng| session_end_draft(rng, session_minutes));
        self.persist(db, device_id, draft, now)
    }

    pub fn same_app(
        &self,
        db: &Database,
        device_id: &str,
        app_name: &str,
        window_title: &str,
        minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<Hint> {
        let draft = self.with_rng(|rng| same_app_draft(rng, app_name, window_title, minutes));
        self.persist(db, device_id, draft, now)
    }

    pub fn event_reminder(
        &self,
        db: &Database,
        device_id: &str,
        event_title: &str,
        now: DateTime<Utc>,
    ) -> Result<Hint> {
        self.persist(db, device_id, event_reminder_draft(event_title), now)
    }
}
