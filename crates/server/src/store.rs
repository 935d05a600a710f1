//! Conversation and folder persistence.
//!
//! The HTTP layer talks to a [`ConversationStore`]; [`InMemoryStore`] is the
//! in-process implementation used by default and in tests.

use std::collections::HashMap;

use abbi_core::MessageContent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

/// Maximum number of conversations returned by a listing.
pub const LIST_LIMIT: usize = 50;
pub const DEFAULT_TITLE: &str = "Untitled Chat";
pub const DEFAULT_FOLDER_ICON: &str = "📁";

#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// One persisted turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredMessage {
    pub role: String,
    pub content: MessageContent,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub conversation_id: String,
    pub title: String,
    pub last_updated: DateTime<Utc>,
    pub message_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub conversation_id: String,
    pub title: String,
    pub messages: Vec<StoredMessage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub folder_id: String,
    pub name: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

/// Persistence boundary for saved chats and folders.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append `messages` to a conversation, creating it when unknown.
    /// A provided title replaces the stored one.
    async fn save(
        &self,
        conversation_id: &str,
        title: Option<&str>,
        messages: Vec<(String, MessageContent)>,
    ) -> Result<(), StoreError>;

    /// Most recently updated first, at most [`LIST_LIMIT`].
    async fn list(&self) -> Result<Vec<ConversationSummary>, StoreError>;

    /// Messages oldest first; `None` when the conversation has none.
    async fn load(&self, conversation_id: &str) -> Result<Option<ConversationRecord>, StoreError>;

    async fn create_folder(&self, name: &str, icon: Option<&str>) -> Result<Folder, StoreError>;

    /// Newest first.
    async fn list_folders(&self) -> Result<Vec<Folder>, StoreError>;
}

#[derive(Debug)]
struct StoredConversation {
    title: String,
    messages: Vec<StoredMessage>,
    updated_at: DateTime<Utc>,
    // Tie-break for saves within the same clock tick.
    sequence: u64,
}

#[derive(Debug, Default)]
struct Inner {
    conversations: HashMap<String, StoredConversation>,
    folders: Vec<(u64, Folder)>,
    sequence: u64,
}

impl Inner {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

/// Process-local store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// `FOLDER-` followed by eight upper-case alphanumerics.
fn folder_id() -> String {
    let raw = uuid::Uuid::new_v4().simple().to_string();
    format!("FOLDER-{}", raw[..8].to_uppercase())
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn save(
        &self,
        conversation_id: &str,
        title: Option<&str>,
        messages: Vec<(String, MessageContent)>,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut inner = self.inner.write().await;
        let sequence = inner.next_sequence();

        let conversation = inner
            .conversations
            .entry(conversation_id.to_string())
            .or_insert_with(|| StoredConversation {
                title: DEFAULT_TITLE.to_string(),
                messages: Vec::new(),
                updated_at: now,
                sequence,
            });

        if let Some(title) = title.filter(|t| !t.is_empty()) {
            conversation.title = title.to_string();
        }
        conversation
            .messages
            .extend(messages.into_iter().map(|(role, content)| StoredMessage {
                role,
                content,
                timestamp: now,
            }));
        conversation.updated_at = now;
        conversation.sequence = sequence;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ConversationSummary>, StoreError> {
        let inner = self.inner.read().await;
        let mut entries: Vec<_> = inner
            .conversations
            .iter()
            .filter(|(_, c)| !c.messages.is_empty())
            .collect();
        entries.sort_by(|(_, a), (_, b)| {
            (b.updated_at, b.sequence).cmp(&(a.updated_at, a.sequence))
        });

        Ok(entries
            .into_iter()
            .take(LIST_LIMIT)
            .map(|(id, c)| ConversationSummary {
                conversation_id: id.clone(),
                title: c.title.clone(),
                last_updated: c.updated_at,
                message_count: c.messages.len(),
            })
            .collect())
    }

    async fn load(&self, conversation_id: &str) -> Result<Option<ConversationRecord>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .conversations
            .get(conversation_id)
            .filter(|c| !c.messages.is_empty())
            .map(|c| ConversationRecord {
                conversation_id: conversation_id.to_string(),
                title: c.title.clone(),
                messages: c.messages.clone(),
            }))
    }

    async fn create_folder(&self, name: &str, icon: Option<&str>) -> Result<Folder, StoreError> {
        let folder = Folder {
            folder_id: folder_id(),
            name: name.to_string(),
            icon: icon
                .filter(|i| !i.is_empty())
                .unwrap_or(DEFAULT_FOLDER_ICON)
                .to_string(),
            created_at: Utc::now(),
        };
        let mut inner = self.inner.write().await;
        let sequence = inner.next_sequence();
        inner.folders.push((sequence, folder.clone()));
        Ok(folder)
    }

    async fn list_folders(&self) -> Result<Vec<Folder>, StoreError> {
        let inner = self.inner.read().await;
        let mut folders = inner.folders.clone();
        folders.sort_by(|(sa, a), (sb, b)| (b.created_at, *sb).cmp(&(a.created_at, *sa)));
        Ok(folders.into_iter().map(|(_, f)| f).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(role: &str, text: &str) -> (String, MessageContent) {
        (role.to_string(), MessageContent::from(text))
    }

    #[tokio::test]
    async fn save_then_load_keeps_order() {
        let store = InMemoryStore::new();
        store
            .save("c1", Some("Deal review"), vec![turn("user", "hi"), turn("assistant", "hello")])
            .await
            .unwrap();
        store.save("c1", None, vec![turn("user", "next")]).await.unwrap();

        let record = store.load("c1").await.unwrap().unwrap();
        assert_eq!(record.title, "Deal review");
        let roles: Vec<_> = record.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["user", "assistant", "user"]);
        assert_eq!(record.messages[2].content.to_text(), "next");
    }

    #[tokio::test]
    async fn untitled_by_default() {
        let store = InMemoryStore::new();
        store.save("c1", None, vec![turn("user", "hi")]).await.unwrap();
        assert_eq!(store.load("c1").await.unwrap().unwrap().title, DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn unknown_conversation_is_none() {
        let store = InMemoryStore::new();
        assert!(store.load("missing").await.unwrap().is_none());
        store.save("empty", None, vec![]).await.unwrap();
        assert!(store.load("empty").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_newest_first_with_counts() {
        let store = InMemoryStore::new();
        store.save("old", None, vec![turn("user", "a")]).await.unwrap();
        store
            .save("new", None, vec![turn("user", "b"), turn("assistant", "c")])
            .await
            .unwrap();

        let list = store.list().await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].conversation_id, "new");
        assert_eq!(list[0].message_count, 2);
        assert_eq!(list[1].conversation_id, "old");

        // Saving again moves it to the front.
        store.save("old", None, vec![turn("user", "d")]).await.unwrap();
        assert_eq!(store.list().await.unwrap()[0].conversation_id, "old");
    }

    #[tokio::test]
    async fn list_is_capped() {
        let store = InMemoryStore::new();
        for i in 0..(LIST_LIMIT + 5) {
            store.save(&format!("c{i}"), None, vec![turn("user", "x")]).await.unwrap();
        }
        assert_eq!(store.list().await.unwrap().len(), LIST_LIMIT);
    }

    #[tokio::test]
    async fn folders_get_ids_and_default_icon() {
        let store = InMemoryStore::new();
        let first = store.create_folder("Deals", None).await.unwrap();
        let second = store.create_folder("Ops", Some("🛠")).await.unwrap();

        assert!(first.folder_id.starts_with("FOLDER-"));
        assert_eq!(first.folder_id.len(), "FOLDER-".len() + 8);
        assert!(first.folder_id[7..].chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        assert_eq!(first.icon, DEFAULT_FOLDER_ICON);
        assert_eq!(second.icon, "🛠");

        let names: Vec<_> = store
            .list_folders()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, ["Ops", "Deals"]);
    }
}
