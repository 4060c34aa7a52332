//! Conversation log and wire-history building
//!
//! The controller owns the visible dialogue. Turns are appended after each
//! completed exchange and never mutated; the server's seed turns are not
//! part of this log and never leave the client.

use chrono::{DateTime, Utc};
use hermes_protocol::Turn;
use uuid::Uuid;

/// Who produced a turn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// One message of the visible dialogue
#[derive(Clone, Debug)]
pub struct ConversationTurn {
    pub id: Uuid,
    pub speaker: Speaker,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Synthesized-audio reference; assistant turns only
    pub audio_ref: Option<String>,
}

impl ConversationTurn {
    fn new(speaker: Speaker, content: String, audio_ref: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            speaker,
            content,
            created_at: Utc::now(),
            audio_ref,
        }
    }
}

/// Ordered, append-only dialogue for the lifetime of the session
#[derive(Clone, Debug, Default)]
pub struct ConversationLog {
    turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn; empty content is not persisted
    pub fn push_user(&mut self, content: impl Into<String>) {
        let content = content.into();
        if content.trim().is_empty() {
            return;
        }
        self.turns
            .push(ConversationTurn::new(Speaker::User, content, None));
    }

    /// Append an assistant turn, optionally carrying its audio reference
    pub fn push_assistant(&mut self, content: impl Into<String>, audio_ref: Option<String>) {
        let content = content.into();
        if content.trim().is_empty() {
            return;
        }
        self.turns
            .push(ConversationTurn::new(Speaker::Assistant, content, audio_ref));
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    /// The dialogue in the wire shape the endpoints expect, in order and
    /// without any seed turns (those are server-owned)
    pub fn wire_history(&self) -> Vec<Turn> {
        self.turns
            .iter()
            .map(|turn| match turn.speaker {
                Speaker::User => Turn::user(turn.content.clone()),
                Speaker::Assistant => Turn::model(turn.content.clone()),
            })
            .collect()
    }

    /// Drop everything; safe to call repeatedly
    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_protocol::TurnRole;

    #[test]
    fn test_push_and_order() {
        let mut log = ConversationLog::new();
        log.push_user("question");
        log.push_assistant("answer", Some("data:audio/mpeg;base64,xyz".to_string()));

        assert_eq!(log.len(), 2);
        assert_eq!(log.turns()[0].speaker, Speaker::User);
        assert_eq!(log.turns()[1].speaker, Speaker::Assistant);
        assert!(log.turns()[1].audio_ref.is_some());
    }

    #[test]
    fn test_empty_content_not_persisted() {
        let mut log = ConversationLog::new();
        log.push_user("   ");
        log.push_assistant("", None);
        assert!(log.is_empty());
    }

    #[test]
    fn test_wire_history_roles_and_order() {
        let mut log = ConversationLog::new();
        log.push_user("a");
        log.push_assistant("b", None);
        log.push_user("c");

        let wire = log.wire_history();
        assert_eq!(wire.len(), 3);
        assert_eq!(wire[0].role, TurnRole::User);
        assert_eq!(wire[0].text(), "a");
        assert_eq!(wire[1].role, TurnRole::Model);
        assert_eq!(wire[2].text(), "c");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut log = ConversationLog::new();
        log.push_user("something");

        log.clear();
        assert!(log.is_empty());

        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn test_turn_ids_unique() {
        let mut log = ConversationLog::new();
        log.push_user("one");
        log.push_user("two");
        assert_ne!(log.turns()[0].id, log.turns()[1].id);
    }
}
