//! Ordered heuristic rules for [`classify`].
//!
//! Order is precedence. Debugging sits above coding so an editor showing an
//! error is treated as a struggle, and coding sits above researching so a
//! documentation tab opened next to an editor is not read as research.

use super::{ActivitySignals, Behavior};

/// Apps that never get hints (system and terminal tools).
pub const SKIP_APPS: &[&str] = &["Terminal", "iTerm2", "Warp", "Activity Monitor"];

/// Text markers of the assistant's own sessions, matched case-insensitively.
pub const SELF_REFERENCE_MARKERS: &[&str] = &["claude"];

pub const ERROR_KEYWORDS: &[&str] = &[
    "error",
    "exception",
    "failed",
    "undefined",
    "null",
    "bug",
    "fix",
    "issue",
    "problem",
    "crash",
    "not working",
];

pub const CODE_EDITORS: &[&str] = &[
    "Cursor",
    "Code",
    "Visual Studio Code",
    "Xcode",
    "PyCharm",
    "IntelliJ IDEA",
    "WebStorm",
    "Sublime Text",
    "Atom",
];

pub const FILE_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".ts", ".tsx", ".jsx", ".swift", ".java", ".go", ".rs", ".cpp", ".c", ".html",
    ".css",
];

pub const BROWSERS: &[&str] = &["Google Chrome", "Safari", "Arc", "Firefox", "Brave Browser"];

pub const RESEARCH_KEYWORDS: &[&str] = &[
    "how to",
    "tutorial",
    "guide",
    "learn",
    "documentation",
    "example",
    "stack overflow",
    "medium",
    "dev.to",
];

pub const COMMUNICATION_APPS: &[&str] = &[
    "Slack",
    "Discord",
    "Messages",
    "Mail",
    "Microsoft Teams",
    "Zoom",
];

const DEBUG_STRUGGLE_THRESHOLD: u8 = 4;
const DISTRACTED_MIN_APP_SWITCHES: u32 = 10;
const DISTRACTED_MIN_BACK_AND_FORTH: u32 = 2;
const EVIDENCE_WINDOWS: usize = 3;

/// Identifies a rule in [`RULES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Skip,
    Debugging,
    Coding,
    Researching,
    Distracted,
    Browsing,
    Communication,
}

/// A predicate and the behavior it produces when it matches.
pub struct Rule {
    pub kind: RuleKind,
    pub matches: fn(&ActivitySignals) -> bool,
    pub build: fn(&ActivitySignals) -> Behavior,
}

pub static RULES: [Rule; 7] = [
    Rule {
        kind: RuleKind::Skip,
        matches: is_skipped,
        build: |_| Behavior::None,
    },
    Rule {
        kind: RuleKind::Debugging,
        matches: is_debugging,
        build: build_debugging,
    },
    Rule {
        kind: RuleKind::Coding,
        matches: is_coding,
        build: build_coding,
    },
    Rule {
        kind: RuleKind::Researching,
        matches: is_researching,
        build: build_researching,
    },
    Rule {
        kind: RuleKind::Distracted,
        matches: is_distracted,
        build: |s| Behavior::Distracted {
            app_switches: s.app_switch_count,
            back_and_forth: s.back_and_forth_count,
            app: s.current_app.clone(),
        },
    },
    Rule {
        kind: RuleKind::Browsing,
        matches: is_browsing,
        build: |s| Behavior::Browsing {
            page: s.window_title.clone(),
            app: s.current_app.clone(),
        },
    },
    Rule {
        kind: RuleKind::Communication,
        matches: is_communication,
        build: |s| Behavior::Communication {
            app: s.current_app.clone(),
            context: s.window_title.clone(),
        },
    },
];

/// First rule whose predicate holds, if any.
pub fn matching_rule(signals: &ActivitySignals) -> Option<&'static Rule> {
    RULES.iter().find(|rule| (rule.matches)(signals))
}

/// Classify a snapshot. Falls back to [`Behavior::None`].
pub fn classify(signals: &ActivitySignals) -> Behavior {
    matching_rule(signals)
        .map(|rule| (rule.build)(signals))
        .unwrap_or(Behavior::None)
}

fn contains_any(haystack_lower: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack_lower.contains(n))
}

fn in_set(app: &str, set: &[&str]) -> bool {
    set.contains(&app)
}

fn recent(signals: &ActivitySignals) -> Vec<String> {
    signals
        .recent_windows
        .iter()
        .take(EVIDENCE_WINDOWS)
        .cloned()
        .collect()
}

pub(crate) fn is_skipped(s: &ActivitySignals) -> bool {
    if in_set(&s.current_app, SKIP_APPS) {
        return true;
    }
    let window = s.window_title.to_lowercase();
    let context = s.context.to_lowercase();
    contains_any(&window, SELF_REFERENCE_MARKERS) || contains_any(&context, SELF_REFERENCE_MARKERS)
}

pub(crate) fn is_debugging(s: &ActivitySignals) -> bool {
    if s.struggle_score >= DEBUG_STRUGGLE_THRESHOLD {
        return true;
    }
    let window = s.window_title.to_lowercase();
    let joined = s.recent_windows.join(" ").to_lowercase();
    contains_any(&window, ERROR_KEYWORDS) || contains_any(&joined, ERROR_KEYWORDS)
}

fn build_debugging(s: &ActivitySignals) -> Behavior {
    let error_context = s
        .recent_windows
        .iter()
        .take(EVIDENCE_WINDOWS)
        .find(|w| contains_any(&w.to_lowercase(), ERROR_KEYWORDS))
        .cloned()
        .unwrap_or_else(|| s.window_title.clone());

    Behavior::Debugging {
        error_context,
        struggle_score: s.struggle_score,
        app: s.current_app.clone(),
    }
}

pub(crate) fn is_coding(s: &ActivitySignals) -> bool {
    in_set(&s.current_app, CODE_EDITORS)
}

fn build_coding(s: &ActivitySignals) -> Behavior {
    let file_type = FILE_EXTENSIONS
        .iter()
        .find(|ext| {
            s.window_title.contains(**ext) || s.recent_windows.iter().any(|w| w.contains(**ext))
        })
        .map(|ext| ext.to_string());

    let file = (!s.window_title.is_empty() && s.window_title != s.current_app)
        .then(|| s.window_title.clone());

    Behavior::Coding {
        app: s.current_app.clone(),
        file,
        file_type,
        recent_context: recent(s),
    }
}

pub(crate) fn is_researching(s: &ActivitySignals) -> bool {
    if !in_set(&s.current_app, BROWSERS) {
        return false;
    }
    let window = s.window_title.to_lowercase();
    window.contains("google") || window.contains("search") || contains_any(&window, RESEARCH_KEYWORDS)
}

fn build_researching(s: &ActivitySignals) -> Behavior {
    let query = match s.window_title.split_once(" - ") {
        Some((head, _)) => head.to_string(),
        None => s.window_title.clone(),
    };
    Behavior::Researching {
        query,
        recent_searches: recent(s),
        app: s.current_app.clone(),
    }
}

pub(crate) fn is_distracted(s: &ActivitySignals) -> bool {
    s.app_switch_count > DISTRACTED_MIN_APP_SWITCHES
        && s.back_and_forth_count >= DISTRACTED_MIN_BACK_AND_FORTH
}

pub(crate) fn is_browsing(s: &ActivitySignals) -> bool {
    in_set(&s.current_app, BROWSERS) && !s.window_title.is_empty() && s.window_title != s.current_app
}

pub(crate) fn is_communication(s: &ActivitySignals) -> bool {
    in_set(&s.current_app, COMMUNICATION_APPS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::BehaviorKind;
    use proptest::prelude::*;

    fn signals(app: &str, window: &str) -> ActivitySignals {
        ActivitySignals {
            current_app: app.into(),
            window_title: window.into(),
            ..Default::default()
        }
    }

    #[test]
    fn rule_table_order_is_fixed() {
        let order: Vec<_> = RULES.iter().map(|r| r.kind).collect();
        assert_eq!(
            order,
            vec![
                RuleKind::Skip,
                RuleKind::Debugging,
                RuleKind::Coding,
                RuleKind::Researching,
                RuleKind::Distracted,
                RuleKind::Browsing,
                RuleKind::Communication,
            ]
        );
    }

    #[test]
    fn skip_list_apps_yield_none() {
        let mut s = signals("Terminal", "cargo build error");
        s.struggle_score = 9;
        assert_eq!(matching_rule(&s).map(|r| r.kind), Some(RuleKind::Skip));
        assert_eq!(classify(&s), Behavior::None);
    }

    #[test]
    fn assistant_context_is_skipped() {
        let mut s = signals("Google Chrome", "Chat - Claude");
        assert!(is_skipped(&s));

        s.window_title = "Docs".into();
        s.context = "talking to CLAUDE about a bug".into();
        assert!(is_skipped(&s));
        assert_eq!(classify(&s), Behavior::None);
    }

    #[test]
    fn editor_with_error_is_debugging_not_coding() {
        let s = signals("Cursor", "TypeError in app.tsx");
        assert!(is_coding(&s));
        assert_eq!(classify(&s).kind(), BehaviorKind::Debugging);
    }

    #[test]
    fn high_struggle_is_debugging_without_keywords() {
        let mut s = signals("Visual Studio Code", "main.rs");
        s.struggle_score = 4;
        assert!(matches!(
            classify(&s),
            Behavior::Debugging { struggle_score: 4, ref error_context, .. } if error_context == "main.rs"
        ));

        s.struggle_score = 3;
        assert_eq!(classify(&s).kind(), BehaviorKind::Coding);
    }

    #[test]
    fn debugging_evidence_prefers_recent_error_window() {
        let mut s = signals("Code", "lib.rs");
        s.recent_windows = vec![
            "lib.rs".into(),
            "Undefined symbol - Stack Overflow".into(),
            "null pointer crash".into(),
        ];
        match classify(&s) {
            Behavior::Debugging { error_context, .. } => {
                assert_eq!(error_context, "Undefined symbol - Stack Overflow")
            }
            other => panic!("expected debugging, got {other:?}"),
        }
    }

    #[test]
    fn debugging_evidence_only_scans_three_recent_windows() {
        let mut s = signals("Code", "lib.rs");
        s.recent_windows = vec![
            "a.rs".into(),
            "b.rs".into(),
            "c.rs".into(),
            "build failed".into(),
        ];
        match classify(&s) {
            Behavior::Debugging { error_context, .. } => assert_eq!(error_context, "lib.rs"),
            other => panic!("expected debugging, got {other:?}"),
        }
    }

    #[test]
    fn coding_picks_extension_from_title_then_recent() {
        let s = signals("Xcode", "ContentView.swift");
        match classify(&s) {
            Behavior::Coding { file_type, file, .. } => {
                assert_eq!(file_type.as_deref(), Some(".swift"));
                assert_eq!(file.as_deref(), Some("ContentView.swift"));
            }
            other => panic!("expected coding, got {other:?}"),
        }

        let mut s = signals("PyCharm", "PyCharm");
        s.recent_windows = vec!["train.py".into()];
        match classify(&s) {
            Behavior::Coding { file_type, file, .. } => {
                assert_eq!(file_type.as_deref(), Some(".py"));
                assert!(file.is_none());
            }
            other => panic!("expected coding, got {other:?}"),
        }
    }

    #[test]
    fn coding_precedes_researching() {
        // An editor showing documentation is still coding.
        let s = signals("Code", "Rust documentation - tutorial");
        assert!(!is_researching(&s));
        assert_eq!(classify(&s).kind(), BehaviorKind::Coding);
    }

    #[test]
    fn researching_requires_browser_and_search_terms() {
        let s = signals("Safari", "how to use tokio - Google Search");
        match classify(&s) {
            Behavior::Researching { query, .. } => assert_eq!(query, "how to use tokio"),
            other => panic!("expected researching, got {other:?}"),
        }

        let s = signals("Arc", "Rust Tutorial");
        match classify(&s) {
            Behavior::Researching { query, .. } => assert_eq!(query, "Rust Tutorial"),
            other => panic!("expected researching, got {other:?}"),
        }

        let s = signals("Notes", "how to bake bread");
        assert!(!is_researching(&s));
    }

    #[test]
    fn researching_precedes_distracted() {
        let mut s = signals("Firefox", "search results");
        s.app_switch_count = 20;
        s.back_and_forth_count = 5;
        assert!(is_distracted(&s));
        assert_eq!(classify(&s).kind(), BehaviorKind::Researching);
    }

    #[test]
    fn distracted_thresholds_are_strict_and_inclusive() {
        let mut s = signals("Notes", "groceries");
        s.app_switch_count = 10;
        s.back_and_forth_count = 2;
        assert!(!is_distracted(&s));

        s.app_switch_count = 11;
        assert!(is_distracted(&s));

        s.back_and_forth_count = 1;
        assert!(!is_distracted(&s));
    }

    #[test]
    fn distracted_precedes_browsing_and_communication() {
        let mut s = signals("Brave Browser", "Hacker News");
        s.app_switch_count = 11;
        s.back_and_forth_count = 2;
        assert_eq!(classify(&s).kind(), BehaviorKind::Distracted);

        s.current_app = "Slack".into();
        assert_eq!(classify(&s).kind(), BehaviorKind::Distracted);
    }

    #[test]
    fn browsing_needs_a_real_page_title() {
        assert_eq!(
            classify(&signals("Google Chrome", "Hacker News")).kind(),
            BehaviorKind::Browsing
        );
        assert_eq!(classify(&signals("Safari", "Safari")).kind(), BehaviorKind::None);
        assert_eq!(classify(&signals("Safari", "")).kind(), BehaviorKind::None);
    }

    #[test]
    fn communication_apps() {
        match classify(&signals("Slack", "#general")) {
            Behavior::Communication { app, context } => {
                assert_eq!(app, "Slack");
                assert_eq!(context, "#general");
            }
            other => panic!("expected communication, got {other:?}"),
        }
    }

    #[test]
    fn unknown_app_is_none() {
        assert_eq!(classify(&signals("Finder", "Downloads")), Behavior::None);
        assert!(matching_rule(&signals("Finder", "Downloads")).is_none());
    }

    proptest! {
        #[test]
        fn classification_is_total_and_agrees_with_first_match(
            app in prop::sample::select(vec![
                "Terminal", "Cursor", "Code", "Safari", "Google Chrome", "Slack", "Zoom", "Finder", "",
            ]),
            window in "[a-zA-Z .-]{0,30}",
            recent in prop::collection::vec("[a-z .]{0,20}", 0..5),
            struggle in 0u8..=10,
            back_and_forth in 0u32..6,
            switches in 0u32..25,
        ) {
            let s = ActivitySignals {
                current_app: app.to_string(),
                window_title: window,
                recent_windows: recent,
                struggle_score: struggle,
                back_and_forth_count: back_and_forth,
                app_switch_count: switches,
                ..Default::default()
            };
            let behavior = classify(&s);
            let expected = match matching_rule(&s).map(|r| r.kind) {
                None | Some(RuleKind::Skip) => BehaviorKind::None,
                Some(RuleKind::Debugging) => BehaviorKind::Debugging,
                Some(RuleKind::Coding) => BehaviorKind::Coding,
                Some(RuleKind::Researching) => BehaviorKind::Researching,
                Some(RuleKind::Distracted) => BehaviorKind::Distracted,
                Some(RuleKind::Browsing) => BehaviorKind::Browsing,
                Some(RuleKind::Communication) => BehaviorKind::Communication,
            };
            prop_assert_eq!(behavior.kind(), expected);
        }
    }
}
