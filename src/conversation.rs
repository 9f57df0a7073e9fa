use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder title for a conversation with no user message yet
pub const DEFAULT_TITLE: &str = "Nouvelle conversation";

/// Auto-derived titles keep at most this many characters of the first message
const TITLE_MAX_CHARS: usize = 30;

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A named, ordered thread of messages with a stable identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    /// Display position among siblings, renormalized after structural changes
    pub order: usize,
}

fn auto_title_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^Conversation (\d+)$").expect("hardcoded pattern"))
}

/// Build a fresh conversation titled "Conversation {N}".
///
/// The next number is derived from the titles currently in the list, so the
/// scheme stays collision-free even after renames and deletions. A renamed
/// conversation that happens to match the pattern counts toward the numbering.
pub fn new_conversation(existing: &[Conversation]) -> Conversation {
    let next_number = existing
        .iter()
        .filter_map(|conv| {
            auto_title_pattern()
                .captures(&conv.title)
                .and_then(|caps| caps[1].parse::<u64>().ok())
        })
        .max()
        .map_or(1, |highest| highest + 1);

    Conversation {
        id: Uuid::new_v4(),
        title: format!("Conversation {}", next_number),
        messages: Vec::new(),
        created_at: Utc::now(),
        order: existing.len(),
    }
}

/// Derive a display title from the first user message, truncated to
/// [`TITLE_MAX_CHARS`] characters with a "..." marker when cut short.
pub fn derive_title(messages: &[Message]) -> String {
    let Some(first_user) = messages.iter().find(|m| m.role == Role::User) else {
        return DEFAULT_TITLE.to_string();
    };

    let title: String = first_user.content.chars().take(TITLE_MAX_CHARS).collect();
    if first_user.content.chars().count() > TITLE_MAX_CHARS {
        format!("{}...", title)
    } else {
        title
    }
}

/// Move the conversation at `from` to position `to` and renumber every
/// `order` field to its new positional index.
///
/// `to` is interpreted against the list with the moved element already
/// removed. Both indices must be in bounds; clamping is the caller's job.
/// Pure: the input slice is left untouched.
pub fn reorder(conversations: &[Conversation], from: usize, to: usize) -> Vec<Conversation> {
    let mut result = conversations.to_vec();
    let moved = result.remove(from);
    result.insert(to, moved);

    for (index, conv) in result.iter_mut().enumerate() {
        conv.order = index;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> Conversation {
        let mut conv = new_conversation(&[]);
        conv.title = title.to_string();
        conv
    }

    #[test]
    fn test_new_conversation_starts_at_one() {
        let conv = new_conversation(&[]);
        assert_eq!(conv.title, "Conversation 1");
        assert_eq!(conv.order, 0);
        assert!(conv.messages.is_empty());
    }

    #[test]
    fn test_numbering_skips_past_highest() {
        // "Conversation 2" was deleted; the next number must still be max + 1
        let existing = vec![titled("Conversation 1"), titled("Conversation 3")];
        let conv = new_conversation(&existing);
        assert_eq!(conv.title, "Conversation 4");
        assert_eq!(conv.order, 2);
    }

    #[test]
    fn test_numbering_ignores_renamed_titles() {
        let existing = vec![titled("Budget notes"), titled("Conversation 7 drafts")];
        let conv = new_conversation(&existing);
        assert_eq!(conv.title, "Conversation 1");
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let mut existing: Vec<Conversation> = Vec::new();
        for _ in 0..100 {
            existing.push(new_conversation(&existing));
        }
        let mut ids: Vec<Uuid> = existing.iter().map(|c| c.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn test_derive_title_empty_messages() {
        assert_eq!(derive_title(&[]), DEFAULT_TITLE);
    }

    #[test]
    fn test_derive_title_no_user_message() {
        let messages = vec![Message::new(Role::Assistant, "Bonjour!")];
        assert_eq!(derive_title(&messages), DEFAULT_TITLE);
    }

    #[test]
    fn test_derive_title_truncates_long_message() {
        let messages = vec![Message::new(
            Role::User,
            "Explain quicksort in one sentence please",
        )];
        assert_eq!(derive_title(&messages), "Explain quicksort in one sente...");
    }

    #[test]
    fn test_derive_title_short_message_kept_whole() {
        let messages = vec![Message::new(Role::User, "hello chat")];
        assert_eq!(derive_title(&messages), "hello chat");
    }

    #[test]
    fn test_derive_title_exactly_thirty_chars_no_ellipsis() {
        let content = "a".repeat(30);
        let messages = vec![Message::new(Role::User, content.clone())];
        assert_eq!(derive_title(&messages), content);
    }

    #[test]
    fn test_derive_title_uses_first_user_message() {
        let messages = vec![
            Message::new(Role::Assistant, "greeting"),
            Message::new(Role::User, "first question"),
            Message::new(Role::User, "second question"),
        ];
        assert_eq!(derive_title(&messages), "first question");
    }

    #[test]
    fn test_reorder_moves_and_renumbers() {
        let list = vec![titled("a"), titled("b"), titled("c"), titled("d")];
        let moved = reorder(&list, 0, 2);

        let titles: Vec<&str> = moved.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "c", "a", "d"]);

        let orders: Vec<usize> = moved.iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_reorder_does_not_mutate_input() {
        let list = vec![titled("a"), titled("b"), titled("c")];
        let _ = reorder(&list, 2, 0);
        let titles: Vec<&str> = list.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reorder_to_same_position_is_identity() {
        let list = vec![titled("a"), titled("b")];
        let moved = reorder(&list, 1, 1);
        let titles: Vec<&str> = moved.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }
}
