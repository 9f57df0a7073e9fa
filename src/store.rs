use uuid::Uuid;

use crate::conversation::{self, Conversation, Message, Role};

/// Authoritative in-memory conversation state.
///
/// Synchronous operations (create, select, delete, rename, reorder) run to
/// completion with no suspension point. A simulated response resolves later
/// through [`ConversationStore::apply_response`], which locates its target by
/// id at resolution time so interleaved edits are never overwritten.
pub struct ConversationStore {
    conversations: Vec<Conversation>,
    active_id: Option<Uuid>,
    /// Number of response requests issued but not yet resolved
    pending_responses: usize,
}

impl ConversationStore {
    /// Fresh store with a single empty conversation, per the load contract.
    pub fn new() -> Self {
        Self::from_saved(Vec::new())
    }

    /// Build the store from a persisted snapshot. An empty snapshot falls
    /// back to one fresh conversation so there is always an active one.
    pub fn from_saved(mut conversations: Vec<Conversation>) -> Self {
        if conversations.is_empty() {
            conversations.push(conversation::new_conversation(&[]));
        }
        let active_id = conversations.first().map(|c| c.id);
        let mut store = Self {
            conversations,
            active_id,
            pending_responses: 0,
        };
        store.renormalize_order();
        store
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active(&self) -> Option<&Conversation> {
        self.active_id
            .and_then(|id| self.conversations.iter().find(|c| c.id == id))
    }

    pub fn active_id(&self) -> Option<Uuid> {
        self.active_id
    }

    /// True while at least one simulated response is outstanding.
    pub fn is_loading(&self) -> bool {
        self.pending_responses > 0
    }

    /// Create a fresh conversation, prepend it and make it active.
    pub fn create(&mut self) -> Uuid {
        let conv = conversation::new_conversation(&self.conversations);
        let id = conv.id;
        self.conversations.insert(0, conv);
        self.renormalize_order();
        self.active_id = Some(id);
        id
    }

    /// Make `id` the active conversation. Unknown ids are ignored.
    pub fn select(&mut self, id: Uuid) {
        if self.conversations.iter().any(|c| c.id == id) {
            self.active_id = Some(id);
        } else {
            log::debug!("select ignored, unknown conversation {}", id);
        }
    }

    /// Delete `id`. If it was active, the first remaining conversation takes
    /// over; if the list would become empty, a fresh conversation is created
    /// and activated so the list never ends up empty.
    pub fn delete(&mut self, id: Uuid) {
        let before = self.conversations.len();
        self.conversations.retain(|c| c.id != id);
        if self.conversations.len() == before {
            log::debug!("delete ignored, unknown conversation {}", id);
            return;
        }

        if self.conversations.is_empty() {
            self.conversations
                .push(conversation::new_conversation(&[]));
        }
        self.renormalize_order();

        if self.active_id == Some(id) {
            self.active_id = self.conversations.first().map(|c| c.id);
        }
    }

    /// Set a user-chosen title. Whitespace-only titles are a no-op; the
    /// stored value is always trimmed.
    pub fn rename(&mut self, id: Uuid, title: &str) {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return;
        }
        if let Some(conv) = self.find_mut(id) {
            conv.title = trimmed.to_string();
        }
    }

    /// Replace the list wholesale after a reorder. The incoming list must be
    /// a permutation of the current one, otherwise it is rejected.
    pub fn reorder(&mut self, conversations: Vec<Conversation>) {
        let mut current: Vec<Uuid> = self.conversations.iter().map(|c| c.id).collect();
        let mut incoming: Vec<Uuid> = conversations.iter().map(|c| c.id).collect();
        current.sort();
        incoming.sort();
        if current != incoming {
            log::warn!("reorder rejected, not a permutation of the current list");
            return;
        }
        self.conversations = conversations;
    }

    /// Append `content` as a user message to the active conversation and
    /// register one pending response. The first message of a conversation
    /// also sets its auto-derived title.
    ///
    /// Returns the target conversation id for the caller to resolve against,
    /// or `None` when there is no active conversation (silent no-op).
    pub fn send_message(&mut self, content: &str) -> Option<Uuid> {
        let Some(active_id) = self.active_id else {
            log::debug!("send_message ignored, no active conversation");
            return None;
        };
        let conv = self.find_mut(active_id)?;

        let was_empty = conv.messages.is_empty();
        conv.messages.push(Message::new(Role::User, content));
        if was_empty {
            conv.title = conversation::derive_title(&conv.messages);
        }

        self.pending_responses += 1;
        Some(active_id)
    }

    /// Resolve a pending response against whatever `id` points at *now*.
    ///
    /// The conversation may have been renamed, moved or deleted while the
    /// response was in flight: a successful reply is appended to the current
    /// record when it still exists and silently discarded otherwise; a
    /// failure only clears the loading state. The user's message is never
    /// rolled back.
    pub fn apply_response(&mut self, id: Uuid, result: anyhow::Result<String>) {
        self.pending_responses = self.pending_responses.saturating_sub(1);

        match result {
            Ok(content) => {
                if let Some(conv) = self.find_mut(id) {
                    conv.messages.push(Message::new(Role::Assistant, content));
                } else {
                    log::debug!("discarding response for deleted conversation {}", id);
                }
            }
            Err(err) => {
                log::warn!("response failed for conversation {}: {:#}", id, err);
            }
        }
    }

    fn find_mut(&mut self, id: Uuid) -> Option<&mut Conversation> {
        self.conversations.iter_mut().find(|c| c.id == id)
    }

    fn renormalize_order(&mut self) {
        for (index, conv) in self.conversations.iter_mut().enumerate() {
            conv.order = index;
        }
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use crate::conversation::reorder;

    fn assert_contiguous_order(store: &ConversationStore) {
        let orders: Vec<usize> = store.conversations().iter().map(|c| c.order).collect();
        let expected: Vec<usize> = (0..store.conversations().len()).collect();
        assert_eq!(orders, expected);
    }

    #[test]
    fn test_new_store_has_one_active_conversation() {
        let store = ConversationStore::new();
        assert_eq!(store.conversations().len(), 1);
        assert_eq!(store.active_id(), Some(store.conversations()[0].id));
        assert!(!store.is_loading());
    }

    #[test]
    fn test_create_prepends_and_activates() {
        let mut store = ConversationStore::new();
        let first = store.active_id().unwrap();
        let second = store.create();

        assert_eq!(store.conversations().len(), 2);
        assert_eq!(store.conversations()[0].id, second);
        assert_eq!(store.conversations()[1].id, first);
        assert_eq!(store.active_id(), Some(second));
        assert_contiguous_order(&store);
    }

    #[test]
    fn test_created_ids_are_pairwise_distinct() {
        let mut store = ConversationStore::new();
        let mut ids: Vec<Uuid> = (0..50).map(|_| store.create()).collect();
        ids.push(store.conversations().last().unwrap().id);
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 51);
    }

    #[test]
    fn test_select_unknown_id_is_ignored() {
        let mut store = ConversationStore::new();
        let active = store.active_id();
        store.select(Uuid::new_v4());
        assert_eq!(store.active_id(), active);
    }

    #[test]
    fn test_delete_active_activates_first_remaining() {
        let mut store = ConversationStore::new();
        let old = store.active_id().unwrap();
        let newer = store.create();

        store.delete(newer);
        assert_eq!(store.active_id(), Some(old));
        assert_contiguous_order(&store);
    }

    #[test]
    fn test_delete_inactive_keeps_active() {
        let mut store = ConversationStore::new();
        let old = store.active_id().unwrap();
        let newer = store.create();

        store.delete(old);
        assert_eq!(store.active_id(), Some(newer));
        assert_eq!(store.conversations().len(), 1);
    }

    #[test]
    fn test_delete_last_conversation_recreates_one() {
        let mut store = ConversationStore::new();
        let only = store.active_id().unwrap();

        store.delete(only);
        assert_eq!(store.conversations().len(), 1);
        assert_ne!(store.conversations()[0].id, only);
        assert_eq!(store.active_id(), Some(store.conversations()[0].id));
    }

    #[test]
    fn test_list_never_empty_across_repeated_deletes() {
        let mut store = ConversationStore::new();
        for _ in 0..5 {
            store.create();
        }
        for _ in 0..10 {
            let victim = store.conversations()[0].id;
            store.delete(victim);
            assert!(!store.conversations().is_empty());
            assert_contiguous_order(&store);
        }
    }

    #[test]
    fn test_rename_trims_title() {
        let mut store = ConversationStore::new();
        let id = store.active_id().unwrap();
        store.rename(id, "  Projet  ");
        assert_eq!(store.active().unwrap().title, "Projet");
    }

    #[test]
    fn test_rename_whitespace_only_is_noop() {
        let mut store = ConversationStore::new();
        let id = store.active_id().unwrap();
        let title = store.active().unwrap().title.clone();
        store.rename(id, "   ");
        assert_eq!(store.active().unwrap().title, title);
    }

    #[test]
    fn test_reorder_replaces_list() {
        let mut store = ConversationStore::new();
        store.create();
        store.create();

        let moved = reorder(store.conversations(), 0, 2);
        let expected: Vec<Uuid> = moved.iter().map(|c| c.id).collect();
        store.reorder(moved);

        let ids: Vec<Uuid> = store.conversations().iter().map(|c| c.id).collect();
        assert_eq!(ids, expected);
        assert_contiguous_order(&store);
    }

    #[test]
    fn test_reorder_rejects_non_permutation() {
        let mut store = ConversationStore::new();
        store.create();
        let ids: Vec<Uuid> = store.conversations().iter().map(|c| c.id).collect();

        // Dropping an element is not a permutation
        let truncated = store.conversations()[..1].to_vec();
        store.reorder(truncated);

        let after: Vec<Uuid> = store.conversations().iter().map(|c| c.id).collect();
        assert_eq!(after, ids);
    }

    #[test]
    fn test_send_message_appends_and_sets_loading() {
        let mut store = ConversationStore::new();
        let id = store.send_message("Bonjour").unwrap();

        let conv = store.active().unwrap();
        assert_eq!(conv.id, id);
        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.messages[0].role, Role::User);
        assert_eq!(conv.messages[0].content, "Bonjour");
        assert!(store.is_loading());
    }

    #[test]
    fn test_first_message_derives_title() {
        let mut store = ConversationStore::new();
        store.send_message("Explain quicksort in one sentence please");
        assert_eq!(
            store.active().unwrap().title,
            "Explain quicksort in one sente..."
        );

        // A second message must not touch the title again
        let id = store.active_id().unwrap();
        store.apply_response(id, Ok("Réponse".to_string()));
        store.send_message("et en deux phrases?");
        assert_eq!(
            store.active().unwrap().title,
            "Explain quicksort in one sente..."
        );
    }

    #[test]
    fn test_short_first_message_has_no_ellipsis() {
        let mut store = ConversationStore::new();
        store.send_message("hello chat");
        assert_eq!(store.active().unwrap().title, "hello chat");
    }

    #[test]
    fn test_apply_response_appends_assistant_message() {
        let mut store = ConversationStore::new();
        let id = store.send_message("Bonjour").unwrap();
        store.apply_response(id, Ok("Salut!".to_string()));

        let conv = store.active().unwrap();
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[1].role, Role::Assistant);
        assert_eq!(conv.messages[1].content, "Salut!");
        assert!(!store.is_loading());
    }

    #[test]
    fn test_response_after_delete_is_discarded() {
        let mut store = ConversationStore::new();
        store.create();
        let id = store.send_message("hi").unwrap();
        store.delete(id);

        let snapshot: Vec<Uuid> = store.conversations().iter().map(|c| c.id).collect();
        store.apply_response(id, Ok("too late".to_string()));

        // Nothing recreated, nothing appended anywhere
        let after: Vec<Uuid> = store.conversations().iter().map(|c| c.id).collect();
        assert_eq!(after, snapshot);
        assert!(store
            .conversations()
            .iter()
            .all(|c| c.messages.is_empty()));
        assert!(!store.is_loading());
    }

    #[test]
    fn test_rename_during_pending_response_survives() {
        let mut store = ConversationStore::new();
        let id = store.send_message("hi").unwrap();
        store.rename(id, "New Title");
        store.apply_response(id, Ok("done".to_string()));

        let conv = store.active().unwrap();
        assert_eq!(conv.title, "New Title");
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[1].content, "done");
    }

    #[test]
    fn test_failed_response_keeps_user_message() {
        let mut store = ConversationStore::new();
        let id = store.send_message("hi").unwrap();
        store.apply_response(id, Err(anyhow!("simulated outage")));

        let conv = store.active().unwrap();
        assert_eq!(conv.messages.len(), 1);
        assert_eq!(conv.messages[0].role, Role::User);
        assert!(!store.is_loading());
    }

    #[test]
    fn test_two_pending_responses_interleave() {
        let mut store = ConversationStore::new();
        let first = store.send_message("question A").unwrap();
        store.create();
        let second = store.send_message("question B").unwrap();
        assert_ne!(first, second);
        assert!(store.is_loading());

        // Resolution order does not match issue order
        store.apply_response(second, Ok("réponse B".to_string()));
        assert!(store.is_loading());
        store.apply_response(first, Ok("réponse A".to_string()));
        assert!(!store.is_loading());

        let a = store.conversations().iter().find(|c| c.id == first).unwrap();
        let b = store.conversations().iter().find(|c| c.id == second).unwrap();
        assert_eq!(a.messages[1].content, "réponse A");
        assert_eq!(b.messages[1].content, "réponse B");
    }

    #[test]
    fn test_from_saved_empty_snapshot_creates_fresh() {
        let store = ConversationStore::from_saved(Vec::new());
        assert_eq!(store.conversations().len(), 1);
        assert!(store.active().is_some());
    }
}
