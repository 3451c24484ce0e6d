use serde::{Deserialize, Serialize};

/// Role type for a conversation entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User role.
    User,

    /// Assistant role.
    Assistant,
}

/// One entry of the conversation history: a role plus the full text of the
/// turn. Assistant entries hold the complete generated text, thinking
/// included, not just what was rendered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// The role of the message.
    pub role: Role,

    /// The text content of the message.
    pub content: String,
}

impl Message {
    /// Create a new `Message` with the given role and content.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user `Message`.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant `Message`.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn user_message_serializes_with_lowercase_role() {
        let message = Message::user("Hello there");
        let json = to_value(&message).unwrap();

        assert_eq!(
            json,
            json!({
                "role": "user",
                "content": "Hello there"
            })
        );
    }

    #[test]
    fn assistant_message_round_trips() {
        let message = Message::assistant("<think>hm</think>\n\nHi");
        let json = to_value(&message).unwrap();
        let back: Message = serde_json::from_value(json).unwrap();

        assert_eq!(back, message);
        assert_eq!(back.role, Role::Assistant);
    }
}
