//! Keyword-driven intent classification
//!
//! Two independent routing gates: [`classify`] maps a message to a task
//! category for the plain per-intent handlers, and [`requires_autonomy`]
//! decides whether the message bypasses them entirely and goes through the
//! action planner. They are never composed.

/// Task categories for user messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Generate,
    Explain,
    Review,
    Refactor,
    Analyze,
    Chat,
}

/// Ordered category checks, first match wins
const CHECKS: &[(Intent, &[&str])] = &[
    (Intent::Generate, &["generate", "create", "write"]),
    (Intent::Explain, &["explain", "what does", "understand"]),
    (Intent::Review, &["review", "check", "audit"]),
    (Intent::Refactor, &["refactor", "improve", "optimize"]),
    (Intent::Analyze, &["analyze", "workspace", "project"]),
];

/// Keywords that route a message through the action planner
const AUTONOMY_TRIGGERS: &[&str] = &["create", "generate", "fix", "implement"];

/// Classify a user message into a task category.
///
/// Pure function: case-insensitive substring match over an ordered keyword
/// list, defaulting to [`Intent::Chat`]. Same input always yields the same
/// category regardless of session history.
pub fn classify(text: &str) -> Intent {
    let lower = text.to_lowercase();
    for (intent, keywords) in CHECKS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *intent;
        }
    }
    Intent::Chat
}

/// Whether the message should be handled by the autonomous planner path
pub fn requires_autonomy(text: &str) -> bool {
    let lower = text.to_lowercase();
    AUTONOMY_TRIGGERS.iter().any(|k| lower.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_categories() {
        assert_eq!(classify("explain this"), Intent::Explain);
        assert_eq!(classify("what does this function do?"), Intent::Explain);
        assert_eq!(classify("please review my code"), Intent::Review);
        assert_eq!(classify("can you audit the auth flow"), Intent::Review);
        assert_eq!(classify("refactor the parser"), Intent::Refactor);
        assert_eq!(classify("optimize this loop"), Intent::Refactor);
        assert_eq!(classify("analyze the workspace"), Intent::Analyze);
        assert_eq!(classify("generate a fibonacci function"), Intent::Generate);
        assert_eq!(classify("hello there"), Intent::Chat);
    }

    #[test]
    fn test_classify_first_match_wins() {
        // "create" (generate) appears before "review" in the ordered checks
        assert_eq!(classify("create a review checklist"), Intent::Generate);
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(classify("EXPLAIN this"), Intent::Explain);
        assert_eq!(classify("Review THIS"), Intent::Review);
    }

    #[test]
    fn test_classify_deterministic() {
        for _ in 0..3 {
            assert_eq!(classify("improve error handling"), Intent::Refactor);
        }
    }

    #[test]
    fn test_requires_autonomy() {
        assert!(requires_autonomy("please create a function"));
        assert!(requires_autonomy("fix the failing test"));
        assert!(requires_autonomy("implement the parser"));
        assert!(requires_autonomy("Generate the boilerplate"));
        assert!(!requires_autonomy("explain this code"));
        assert!(!requires_autonomy("what is going on here"));
    }
}
