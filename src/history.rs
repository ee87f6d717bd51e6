use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Who produced a conversation entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One turn of the conversation. Entries are never mutated after append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: Role,
    pub content: String,
}

/// Append-only conversation log.
///
/// Insertion order is the only ordering guarantee; entries are never
/// reordered, deduplicated, or edited. `clear` is the single destructive
/// operation. Serialization is a plain JSON array of `{role, content}`
/// objects so a saved conversation loads back identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    entries: Vec<ConversationEntry>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.entries.push(ConversationEntry {
            role,
            content: content.into(),
        });
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn serialize(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.entries).context("Failed to serialize conversation")
    }

    pub fn deserialize(data: &str) -> Result<Self> {
        let entries: Vec<ConversationEntry> =
            serde_json::from_str(data).context("Failed to parse conversation")?;
        Ok(Self { entries })
    }

    /// Write the conversation to `path` as JSON
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        fs::write(path, self.serialize()?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Load a previously saved conversation from `path`
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::deserialize(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_conversation() -> Conversation {
        let mut conversation = Conversation::new();
        conversation.append(Role::User, "find big log files");
        conversation.append(Role::Assistant, "```execute\nfind . -size +1G\n```");
        conversation.append(Role::System, "Command execution succeeded:\n\n```\n\n```");
        conversation
    }

    #[test]
    fn test_append_preserves_order() {
        let conversation = sample_conversation();

        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.entries()[0].role, Role::User);
        assert_eq!(conversation.entries()[1].role, Role::Assistant);
        assert_eq!(conversation.entries()[2].role, Role::System);
    }

    #[test]
    fn test_clear_empties_the_log() {
        let mut conversation = sample_conversation();
        conversation.clear();
        assert!(conversation.is_empty());
    }

    #[test]
    fn test_round_trip_empty() {
        let conversation = Conversation::new();
        let restored = Conversation::deserialize(&conversation.serialize().unwrap()).unwrap();
        assert_eq!(restored, conversation);
    }

    #[test]
    fn test_round_trip_single_entry() {
        let mut conversation = Conversation::new();
        conversation.append(Role::User, "hello");

        let restored = Conversation::deserialize(&conversation.serialize().unwrap()).unwrap();
        assert_eq!(restored, conversation);
    }

    #[test]
    fn test_round_trip_many_entries() {
        let conversation = sample_conversation();
        let restored = Conversation::deserialize(&conversation.serialize().unwrap()).unwrap();
        assert_eq!(restored, conversation);
    }

    #[test]
    fn test_roles_serialize_lowercase() {
        let mut conversation = Conversation::new();
        conversation.append(Role::System, "skipped");
        let json = conversation.serialize().unwrap();

        assert!(json.contains("\"system\""));
        assert!(!json.contains("System"));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut conversation = Conversation::new();
        conversation.append(Role::User, "ls");
        conversation.append(Role::User, "ls");
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conversation.json");

        let conversation = sample_conversation();
        conversation.save_to(&path).unwrap();

        let restored = Conversation::load_from(&path).unwrap();
        assert_eq!(restored, conversation);
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        assert!(Conversation::load_from(&path).is_err());
    }

    #[test]
    fn test_load_garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "not json at all").unwrap();
        assert!(Conversation::load_from(&path).is_err());
    }
}
