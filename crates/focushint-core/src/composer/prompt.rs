//! Prompt text for each behavior.

use indoc::formatdoc;

use crate::behavior::Behavior;

/// Longest page title quoted into a browsing prompt.
const MAX_PAGE_CHARS: usize = 50;

struct Instruction {
    situation: String,
    tip_kind: &'static str,
    example: &'static str,
}

fn instruction(behavior: &Behavior) -> Option<Instruction> {
    let instruction = match behavior {
        Behavior::Debugging { error_context, .. } => Instruction {
            situation: format!("User is debugging: {}", or_unknown(error_context)),
            tip_kind: "debugging",
            example: r#"{"title": "Check Array Init", "message": "Verify the array is defined before calling .map() on it."}"#,
        },
        Behavior::Researching { query, .. } => Instruction {
            situation: format!("User searched: {}", or_unknown(query)),
            tip_kind: "research",
            example: r#"{"title": "Try Official Docs", "message": "Check the official documentation for the most accurate information."}"#,
        },
        Behavior::Distracted {
            app_switches,
            back_and_forth,
            ..
        } => Instruction {
            situation: format!(
                "User switched apps {app_switches} times, back-and-forth {back_and_forth} times."
            ),
            tip_kind: "focus",
            example: r#"{"title": "Try Pomodoro", "message": "Set a 25-minute timer and focus on one task."}"#,
        },
        Behavior::Coding { app, file_type, .. } => Instruction {
            situation: format!(
                "User coding in {}, file type: {}.",
                or_default(app, "editor"),
                file_type.as_deref().unwrap_or("unknown")
            ),
            tip_kind: "coding",
            example: r#"{"title": "Use Cmd+D", "message": "Select next occurrence of the word for multi-cursor editing."}"#,
        },
        Behavior::Browsing { page, .. } => Instruction {
            situation: format!(
                "User browsing: {}",
                page.chars().take(MAX_PAGE_CHARS).collect::<String>()
            ),
            tip_kind: "relevant",
            example: r#"{"title": "Bookmark This", "message": "Press Cmd+D to save this page for later reference."}"#,
        },
        Behavior::Communication { app, .. } => Instruction {
            situation: format!("User in {} (communication app).", or_default(app, "chat")),
            tip_kind: "productivity",
            example: r#"{"title": "Use Threads", "message": "Reply in threads to keep conversations organized."}"#,
        },
        Behavior::None => return None,
    };
    Some(instruction)
}

fn or_unknown(s: &str) -> &str {
    or_default(s, "unknown")
}

fn or_default<'a>(s: &'a str, fallback: &'a str) -> &'a str {
    if s.trim().is_empty() {
        fallback
    } else {
        s
    }
}

/// Build the JSON-only instruction for `behavior`, or `None` when there is
/// nothing to ask about.
pub fn build_prompt(behavior: &Behavior, recent_titles: &[String]) -> Option<String> {
    let Instruction {
        situation,
        tip_kind,
        example,
    } = instruction(behavior)?;

    let avoid = if recent_titles.is_empty() {
        String::new()
    } else {
        format!(
            "Do not repeat these recent tips: {}.\n\n",
            recent_titles.join(", ")
        )
    };

    Some(formatdoc! {"
        RESPOND WITH JSON ONLY. NO OTHER TEXT.

        {situation}

        Give a SHORT {tip_kind} tip (title: 2-4 words, message: under 15 words).

        {avoid}{example}

        Your response (JSON only):"
    })
}
