use serenity::all::UserId;
use std::collections::HashMap;
use tokio::time::Instant;

/// State which is lost across sessions
pub struct VolatileState {
    pub conversations: Conversations,
    pub started: Instant,
}

#[allow(non_camel_case_types)] // Serialized literally; case matters
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub enum Role {
    system,
    user,
    assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Per-user chat history, oldest turn first.
#[derive(Default)]
pub struct Conversations(HashMap<UserId, Vec<Turn>>);

impl VolatileState {
    pub fn new() -> Self {
        Self {
            conversations: Conversations::new(),
            started: Instant::now(),
        }
    }
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

impl Conversations {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn history(&self, user_id: UserId) -> &[Turn] {
        self.0.get(&user_id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Append a completed prompt/reply pair, then drop the oldest turns until at most `max_turns`
    /// remain.
    pub fn record_exchange(
        &mut self,
        user_id: UserId,
        prompt: impl Into<String>,
        reply: impl Into<String>,
        max_turns: usize,
    ) {
        let history = self.0.entry(user_id).or_default();
        history.push(Turn::new(Role::user, prompt));
        history.push(Turn::new(Role::assistant, reply));

        if history.len() > max_turns {
            let excess = history.len() - max_turns;
            history.drain(..excess);
        }
    }

    /// Forget a user's history.  Returns whether there was anything to forget.
    pub fn clear(&mut self, user_id: UserId) -> bool {
        self.0
            .remove(&user_id)
            .is_some_and(|history| !history.is_empty())
    }

    /// Number of users with a history
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserId {
        UserId::new(1)
    }

    fn bob() -> UserId {
        UserId::new(2)
    }

    #[test]
    fn unknown_user_has_empty_history() {
        let conversations = Conversations::new();
        assert!(conversations.history(alice()).is_empty());
        assert_eq!(conversations.len(), 0);
    }

    #[test]
    fn exchange_preserves_order() {
        let mut conversations = Conversations::new();
        conversations.record_exchange(alice(), "hi", "hello!", 20);
        conversations.record_exchange(alice(), "how are you", "great", 20);

        let roles: Vec<Role> = conversations.history(alice()).iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            [Role::user, Role::assistant, Role::user, Role::assistant]
        );
        assert_eq!(conversations.history(alice())[2].content, "how are you");
    }

    #[test]
    fn history_never_exceeds_cap() {
        let mut conversations = Conversations::new();
        for i in 0..50 {
            conversations.record_exchange(alice(), format!("q{i}"), format!("a{i}"), 5);
            assert!(conversations.history(alice()).len() <= 5);
        }

        let history = conversations.history(alice());
        assert_eq!(history.len(), 5);
        assert_eq!(history.last().unwrap().content, "a49");
        assert_eq!(history.first().unwrap().content, "a47");
    }

    #[test]
    fn clear_is_per_user_and_idempotent() {
        let mut conversations = Conversations::new();
        conversations.record_exchange(alice(), "hi", "hello", 20);
        conversations.record_exchange(bob(), "yo", "hey", 20);

        assert!(conversations.clear(alice()));
        assert!(conversations.history(alice()).is_empty());
        assert!(!conversations.clear(alice()));
        assert!(conversations.history(alice()).is_empty());

        assert_eq!(conversations.history(bob()).len(), 2);
        assert_eq!(conversations.len(), 1);
    }
}
