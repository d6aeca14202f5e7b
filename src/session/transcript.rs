use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the session transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Append-only record of the session's conversation, kept in memory only
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: Vec<ConversationTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
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

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(ConversationTurn::user(text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(ConversationTurn::assistant(text));
    }

    /// Everything before the newest turn
    pub fn history(&self) -> &[ConversationTurn] {
        match self.turns.split_last() {
            Some((_, rest)) => rest,
            None => &[],
        }
    }

    /// Drop the newest turn if it is an unanswered user message
    pub fn rollback_user(&mut self) -> Option<ConversationTurn> {
        match self.turns.last() {
            Some(turn) if turn.role == Role::User => self.turns.pop(),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_excludes_newest_turn() {
        let mut transcript = Transcript::new();
        assert!(transcript.history().is_empty());

        transcript.push_user("hello");
        transcript.push_assistant("hi");
        transcript.push_user("again");
        assert_eq!(transcript.history().len(), 2);
        assert_eq!(transcript.history()[1].role, Role::Assistant);
    }

    #[test]
    fn rollback_only_removes_unanswered_user_turn() {
        let mut transcript = Transcript::new();
        transcript.push_user("hello");
        transcript.push_assistant("hi");
        assert!(transcript.rollback_user().is_none());
        assert_eq!(transcript.len(), 2);

        transcript.push_user("again");
        assert_eq!(transcript.rollback_user().map(|t| t.text), Some("again".to_string()));
        assert_eq!(transcript.len(), 2);
    }
}
