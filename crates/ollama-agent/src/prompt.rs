use crate::types::ChatTurn;

/// Render `prompt` with the most recent `max_turns` of `history` in front of it.
///
/// `/api/generate` takes a single prompt string, so prior turns are inlined as
/// alternating `User:` / `Assistant:` lines.
pub fn render_prompt(prompt: &str, history: &[ChatTurn], max_turns: usize) -> String {
    let start = history.len().saturating_sub(max_turns);
    let recent = &history[start..];
    if recent.is_empty() {
        return prompt.to_string();
    }

    let mut out = String::from("Previous conversation:\n");
    for turn in recent {
        out.push_str("User: ");
        out.push_str(&turn.user);
        out.push_str("\nAssistant: ");
        out.push_str(&turn.assistant);
        out.push('\n');
    }
    out.push_str("\nUser: ");
    out.push_str(prompt);
    out.push_str("\nAssistant:");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(u: &str, a: &str) -> ChatTurn {
        ChatTurn {
            user: u.into(),
            assistant: a.into(),
        }
    }

    #[test]
    fn empty_history_is_bare_prompt() {
        assert_eq!(render_prompt("hi", &[], 6), "hi");
    }

    #[test]
    fn zero_turn_budget_is_bare_prompt() {
        assert_eq!(render_prompt("hi", &[turn("a", "b")], 0), "hi");
    }

    #[test]
    fn history_is_inlined_oldest_first() {
        let out = render_prompt("and now?", &[turn("one", "1"), turn("two", "2")], 6);
        let one = out.find("User: one").unwrap();
        let two = out.find("User: two").unwrap();
        assert!(one < two);
        assert!(out.ends_with("User: and now?\nAssistant:"));
    }

    #[test]
    fn only_recent_turns_are_kept() {
        let history: Vec<_> = (0..10).map(|i| turn(&format!("q{i}"), "a")).collect();
        let out = render_prompt("next", &history, 3);
        assert!(!out.contains("q6"));
        assert!(out.contains("q7") && out.contains("q8") && out.contains("q9"));
    }
}
