use crate::domain::view::ChatMessage;

/// Append-only log of chat turns. Insertion order is render order.
#[derive(Debug, Default, Clone)]
pub struct MessageStore {
    messages: Vec<ChatMessage>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn and returns its index.
    pub fn push(&mut self, message: ChatMessage) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ChatMessage> {
        self.messages.get(index)
    }

    pub fn as_slice(&self) -> &[ChatMessage] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::view::{ErrorView, Role, ViewModel};

    #[test]
    fn push_keeps_insertion_order() {
        let mut store = MessageStore::new();
        assert!(store.is_empty());

        assert_eq!(store.push(ChatMessage::user("AAPL")), 0);
        let err = ErrorView {
            title: "Request failed".to_string(),
            detail: "HTTP 500".to_string(),
            hint: None,
        };
        assert_eq!(store.push(ChatMessage::assistant(ViewModel::Error(err))), 1);

        assert_eq!(store.len(), 2);
        let roles: Vec<_> = store.as_slice().iter().map(|m| m.role).collect();
        assert_eq!(roles, [Role::User, Role::Assistant]);
        assert!(matches!(store.get(1).unwrap().view, ViewModel::Error(_)));
        assert!(store.get(2).is_none());
    }
}
