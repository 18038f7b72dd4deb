//! Identifiers shared by the store, the delivery client and the navigator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform conversation (chat) identifier
///
/// Group conversations carry negative ids, direct conversations positive ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub i64);

impl ConversationId {
    pub fn category(self) -> Category {
        if self.0 < 0 {
            Category::Group
        } else {
            Category::Direct
        }
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Platform message identifier, unique within a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of conversation, selects which root window applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Direct,
    Group,
}
