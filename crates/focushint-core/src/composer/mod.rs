//! Model-backed hint composition.
//!
//! [`HintComposer::compose`] turns a classified [`Behavior`] into a prompt,
//! asks the text-generation backend for a JSON reply and maps the reply to a
//! [`Suggestion`]. Every failure along the way degrades to
//! [`Suggestion::none`]; nothing here returns an error to the caller.

mod ollama;
mod prompt;

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::behavior::{Behavior, BehaviorKind};
use crate::error::GenerateError;
use crate::hint::{HintCategory, HintDraft, HintPriority};

pub use ollama::{OllamaClient, TextGenerator};
pub use prompt::build_prompt;

/// Maximum title length kept from a model reply, in characters.
pub const MAX_TITLE_CHARS: usize = 25;

/// Maximum message length kept from a model reply, in characters.
pub const MAX_MESSAGE_CHARS: usize = 80;

/// How many recent hint titles are shown to the model.
pub const RECENT_TITLES_IN_PROMPT: usize = 5;

/// Proposed hint content, prior to persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub should_generate: bool,
    pub category: Option<HintCategory>,
    pub priority: Option<HintPriority>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub trigger_reason: Option<BehaviorKind>,
}

impl Suggestion {
    pub fn none() -> Self {
        Self {
            should_generate: false,
            category: None,
            priority: None,
            title: None,
            message: None,
            trigger_reason: None,
        }
    }

    /// Build a suggestion for `kind` from model-provided text, truncating
    /// title and message on character boundaries.
    pub fn from_reply(kind: BehaviorKind, title: &str, message: &str) -> Self {
        let Some(category) = kind.hint_category() else {
            return Self::none();
        };
        Self {
            should_generate: true,
            category: Some(category),
            priority: Some(kind.hint_priority()),
            title: Some(truncate_chars(title, MAX_TITLE_CHARS)),
            message: Some(truncate_chars(message, MAX_MESSAGE_CHARS)),
            trigger_reason: Some(kind),
        }
    }

    /// The persistable part of a positive suggestion.
    pub fn to_draft(&self) -> Option<HintDraft> {
        if !self.should_generate {
            return None;
        }
        Some(HintDraft::new(
            self.category?,
            self.priority?,
            self.title.clone()?,
            self.message.clone()?,
        ))
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[derive(Deserialize)]
struct ModelReply {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Extract `(title, message)` from raw model output.
///
/// The JSON object is taken from the first `{` to the last `}` so chatter
/// around it is tolerated. Empty or missing fields count as a failed parse.
pub fn parse_reply(raw: &str) -> Option<(String, String)> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }

    let reply: ModelReply = serde_json::from_str(&raw[start..=end]).ok()?;
    let title = reply.title.filter(|t| !t.trim().is_empty())?;
    let message = reply.message.filter(|m| !m.trim().is_empty())?;
    Some((title, message))
}

/// Turns behaviors into suggestions through a [`TextGenerator`].
pub struct HintComposer<G> {
    generator: G,
    available: AtomicBool,
    timeout: Duration,
}

impl<G: TextGenerator> HintComposer<G> {
    /// `backend_available` is the result of the startup probe; when false the
    /// composer answers "no hint" without touching the network.
    pub fn new(generator: G, backend_available: bool, timeout: Duration) -> Self {
        Self {
            generator,
            available: AtomicBool::new(backend_available),
            timeout,
        }
    }

    /// Probe the backend first and start with its answer.
    pub async fn probed(generator: G, timeout: Duration) -> Self {
        let available = generator.probe().await;
        if available {
            tracing::info!("text-generation backend ready");
        } else {
            tracing::warn!("text-generation backend not available; model hints disabled");
        }
        Self::new(generator, available, timeout)
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    /// Re-run the availability probe and remember the result.
    pub async fn refresh_availability(&self) -> bool {
        let available = self.generator.probe().await;
        self.available.store(available, Ordering::Relaxed);
        available
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Produce a suggestion for `behavior`.
    ///
    /// `recent_titles` are the titles of the latest hints, newest first; only
    /// the first few are used.
    pub async fn compose(&self, behavior: &Behavior, recent_titles: &[String]) -> Suggestion {
        let kind = behavior.kind();
        let recent = &recent_titles[..recent_titles.len().min(RECENT_TITLES_IN_PROMPT)];
        let Some(prompt) = build_prompt(behavior, recent) else {
            return Suggestion::none();
        };

        let raw = match self.call(&prompt).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(behavior = %kind, error = %e, "no suggestion from model");
                return Suggestion::none();
            }
        };

        match parse_reply(&raw) {
            Some((title, message)) => {
                tracing::debug!(behavior = %kind, %title, "model suggestion parsed");
                Suggestion::from_reply(kind, &title, &message)
            }
            None => {
                let preview: String = raw.chars().take(100).collect();
                tracing::warn!(behavior = %kind, reply = %preview, "unparseable model reply");
                Suggestion::none()
            }
        }
    }

    async fn call(&self, prompt: &str) -> Result<String, GenerateError> {
        if !self.is_available() {
            return Err(GenerateError::Unavailable);
        }
        match tokio::time::timeout(self.timeout, self.generator.generate(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(GenerateError::Timeout(self.timeout.as_secs())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    /// Replies with canned text and records prompts.
    struct Scripted {
        reply: Result<String, u16>,
        delay: Option<Duration>,
        prompts: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                delay: None,
                prompts: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn status(code: u16) -> Self {
            Self {
                reply: Err(code),
                ..Self::ok("")
            }
        }
    }

    impl TextGenerator for Scripted {
        async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply.clone().map_err(GenerateError::Status)
        }

        async fn probe(&self) -> bool {
            true
        }
    }

    fn distracted() -> Behavior {
        Behavior::Distracted {
            app_switches: 14,
            back_and_forth: 3,
            app: "Slack".into(),
        }
    }

    fn composer(gen: Scripted) -> HintComposer<Scripted> {
        HintComposer::new(gen, true, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn distracted_reply_becomes_high_priority_focus_alert() {
        let c = composer(Scripted::ok(
            r#"{"title":"Try Pomodoro","message":"Set a 25-minute timer."}"#,
        ));
        let s = c.compose(&distracted(), &[]).await;

        assert!(s.should_generate);
        assert_eq!(s.category, Some(HintCategory::FocusAlert));
        assert_eq!(s.priority, Some(HintPriority::High));
        assert_eq!(s.title.as_deref(), Some("Try Pomodoro"));
        assert!(s.title.unwrap().chars().count() <= MAX_TITLE_CHARS);
        assert_eq!(s.trigger_reason, Some(BehaviorKind::Distracted));
    }

    #[tokio::test]
    async fn commentary_around_json_is_tolerated_and_text_truncated() {
        let long_title = "A very long title that keeps going";
        let long_message = "word ".repeat(30);
        let raw = format!(
            "Sure! Here you go:\n{{\"title\": \"{long_title}\", \"message\": \"{long_message}\"}}\nHope it helps."
        );
        let c = composer(Scripted::ok(&raw));
        let s = c
            .compose(
                &Behavior::Browsing {
                    page: "Hacker News".into(),
                    app: "Safari".into(),
                },
                &[],
            )
            .await;

        assert!(s.should_generate);
        assert_eq!(s.category, Some(HintCategory::AppSuggestion));
        assert_eq!(s.priority, Some(HintPriority::Medium));
        assert_eq!(s.title.as_ref().unwrap().chars().count(), MAX_TITLE_CHARS);
        assert_eq!(s.message.as_ref().unwrap().chars().count(), MAX_MESSAGE_CHARS);
    }

    #[tokio::test]
    async fn reply_without_braces_yields_no_hint() {
        let c = composer(Scripted::ok("Take a break and stretch."));
        let s = c.compose(&distracted(), &[]).await;
        assert_eq!(s, Suggestion::none());
    }

    #[tokio::test]
    async fn missing_or_empty_fields_yield_no_hint() {
        for raw in [
            r#"{"title":"Only title"}"#,
            r#"{"title":"","message":"msg"}"#,
            r#"{"title": "x", "message": }"#,
            "} backwards {",
        ] {
            let c = composer(Scripted::ok(raw));
            assert!(!c.compose(&distracted(), &[]).await.should_generate, "{raw}");
        }
    }

    #[tokio::test]
    async fn backend_error_status_yields_no_hint() {
        let c = composer(Scripted::status(503));
        assert!(!c.compose(&distracted(), &[]).await.should_generate);
    }

    #[tokio::test]
    async fn slow_backend_times_out_to_no_hint() {
        let gen = Scripted {
            delay: Some(Duration::from_millis(200)),
            ..Scripted::ok(r#"{"title":"Late","message":"Too late."}"#)
        };
        let c = HintComposer::new(gen, true, Duration::from_millis(20));
        assert!(!c.compose(&distracted(), &[]).await.should_generate);
    }

    #[tokio::test]
    async fn unavailable_backend_is_never_called() {
        let c = HintComposer::new(
            Scripted::ok(r#"{"title":"T","message":"M"}"#),
            false,
            Duration::from_secs(5),
        );
        assert!(!c.compose(&distracted(), &[]).await.should_generate);
        assert_eq!(c.generator().calls.load(Ordering::SeqCst), 0);

        assert!(c.refresh_availability().await);
        assert!(c.compose(&distracted(), &[]).await.should_generate);
    }

    #[tokio::test]
    async fn none_behavior_skips_the_model() {
        let c = composer(Scripted::ok(r#"{"title":"T","message":"M"}"#));
        assert!(!c.compose(&Behavior::None, &[]).await.should_generate);
        assert_eq!(c.generator().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn only_five_recent_titles_reach_the_prompt() {
        let c = composer(Scripted::ok(r#"{"title":"T","message":"M"}"#));
        let titles: Vec<String> = (1..=8).map(|i| format!("Recent tip {i}")).collect();
        c.compose(&distracted(), &titles).await;

        let prompts = c.generator().prompts.lock().unwrap();
        assert!(prompts[0].contains("Recent tip 5"));
        assert!(!prompts[0].contains("Recent tip 6"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let title = "Überprüfe die Fehlermeldung jetzt";
        let s = Suggestion::from_reply(BehaviorKind::Debugging, title, "ok");
        assert_eq!(s.title.unwrap().chars().count(), MAX_TITLE_CHARS);
    }

    #[test]
    fn draft_only_for_positive_suggestions() {
        assert!(Suggestion::none().to_draft().is_none());
        let draft = Suggestion::from_reply(BehaviorKind::Coding, "Use Cmd+D", "Multi-cursor.")
            .to_draft()
            .unwrap();
        assert_eq!(draft.category, HintCategory::AppSuggestion);
        assert_eq!(draft.title, "Use Cmd+D");
    }
}
