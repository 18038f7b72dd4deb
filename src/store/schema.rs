//! Database schema

/// SQL schema for initialization
///
/// One row per `(conversation, field)`. Values are opaque JSON blobs written
/// by `ConversationStore`.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS conversation_fields (
    conversation_id INTEGER NOT NULL,
    field TEXT NOT NULL,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    PRIMARY KEY (conversation_id, field)
);

CREATE INDEX IF NOT EXISTS idx_conversation_fields_updated ON conversation_fields(updated_at DESC);
";
