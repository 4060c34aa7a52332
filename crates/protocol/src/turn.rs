//! Conversation turns in the chat-service wire shape
//!
//! The chat-completion service consumes an ordered list of turns, each a
//! role plus one or more text parts. The client sends its visible history
//! in this shape; the server prepends its own seed turns before forwarding.

use serde::{Deserialize, Serialize};

/// Role of a turn in the dialogue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// End-user input
    User,
    /// Assistant output (the chat service calls this "model")
    Model,
}

impl TurnRole {
    /// String form used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Model => "model",
        }
    }
}

/// One text fragment of a turn
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnPart {
    pub text: String,
}

/// A single turn: role plus its text parts
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub parts: Vec<TurnPart>,
}

impl Turn {
    /// Create a turn with a single text part
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![TurnPart { text: text.into() }],
        }
    }

    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(TurnRole::User, text)
    }

    /// Create a model turn
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(TurnRole::Model, text)
    }

    /// Concatenated text of all parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_constructors() {
        let user = Turn::user("hello");
        assert_eq!(user.role, TurnRole::User);
        assert_eq!(user.text(), "hello");

        let model = Turn::model("hi there");
        assert_eq!(model.role, TurnRole::Model);
        assert_eq!(model.text(), "hi there");
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Turn::user("hey")).unwrap();
        assert!(json.contains(r#""role":"user""#));

        let json = serde_json::to_string(&Turn::model("hey")).unwrap();
        assert!(json.contains(r#""role":"model""#));
    }

    #[test]
    fn test_round_trip() {
        let turns = vec![Turn::user("a"), Turn::model("b"), Turn::user("c")];
        let json = serde_json::to_string(&turns).unwrap();
        let back: Vec<Turn> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, turns);
    }

    #[test]
    fn test_multi_part_text() {
        let turn = Turn {
            role: TurnRole::Model,
            parts: vec![
                TurnPart {
                    text: "Hello, ".to_string(),
                },
                TurnPart {
                    text: "world".to_string(),
                },
            ],
        };
        assert_eq!(turn.text(), "Hello, world");
    }
}
