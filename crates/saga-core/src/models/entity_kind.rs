use serde::{Deserialize, Serialize};

/// The versioned entity kinds. Each kind owns one live table and one
/// history table with identical layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    ContentBlock,
    KnowledgeSnapshot,
}

impl EntityKind {
    pub const ALL: [EntityKind; 2] = [EntityKind::ContentBlock, EntityKind::KnowledgeSnapshot];

    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::ContentBlock => "content_block",
            EntityKind::KnowledgeSnapshot => "knowledge_snapshot",
        }
    }

    /// Table holding one row per existing id.
    pub fn live_table(self) -> &'static str {
        match self {
            EntityKind::ContentBlock => "content_blocks",
            EntityKind::KnowledgeSnapshot => "knowledge_snapshots",
        }
    }

    /// Append-only table of closed versions.
    pub fn history_table(self) -> &'static str {
        match self {
            EntityKind::ContentBlock => "content_blocks_history",
            EntityKind::KnowledgeSnapshot => "knowledge_snapshots_history",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
