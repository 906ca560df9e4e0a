//! Payloads of the two versioned entity kinds.

use serde::{Deserialize, Serialize};

/// Kind of content block within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Prose,
    Dialogue,
    Milestone,
}

/// A block of scene content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub scene_id: String,
    pub block_type: BlockType,
    pub content: String,
    /// Zero-based position within the scene.
    pub order: u32,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// What a character knows at a point of the story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeSnapshot {
    pub entity_id: String,
    #[serde(default)]
    pub scene_id: Option<String>,
    /// Story time the snapshot describes.
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub knowledge: serde_json::Value,
}
