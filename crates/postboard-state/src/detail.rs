use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::Comment;
use crate::store::Operation;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend failed: {0}")]
    Backend(String),
    #[error("failed to encode comments: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("stored comments under {key} are unreadable: {reason}")]
    Unreadable { key: String, reason: String },
}

/// Synchronous string key-value area holding locally authored comments.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn comments_key(post_id: u64) -> String {
    format!("post-{post_id}-comments")
}

/// Stored comments for `post_id`. A value that does not decode is an error.
pub fn read_local_comments<S: KeyValueStore + ?Sized>(
    storage: &S,
    post_id: u64,
) -> Result<Vec<Comment>, StorageError> {
    let key = comments_key(post_id);
    let Some(raw) = storage.get(&key)? else {
        return Ok(vec![]);
    };

    serde_json::from_str::<Vec<Comment>>(&raw).map_err(|error| StorageError::Unreadable {
        key,
        reason: error.to_string(),
    })
}

/// Like [`read_local_comments`], but an unreadable value is logged and shows
/// as no comments.
pub fn load_local_comments<S: KeyValueStore + ?Sized>(
    storage: &S,
    post_id: u64,
) -> Result<Vec<Comment>, StorageError> {
    match read_local_comments(storage, post_id) {
        Err(StorageError::Unreadable { key, reason }) => {
            warn!(%key, %reason, "ignoring unreadable local comments");
            Ok(vec![])
        }
        other => other,
    }
}

pub fn save_local_comments<S: KeyValueStore + ?Sized>(
    storage: &S,
    post_id: u64,
    comments: &[Comment],
) -> Result<(), StorageError> {
    let json = serde_json::to_string(comments)?;
    storage.set(&comments_key(post_id), &json)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailState {
    pub post_id: u64,
    pub draft: String,
    local: Vec<Comment>,
}

impl DetailState {
    /// State with no local history, for hosts whose storage is unavailable.
    pub fn new(post_id: u64) -> Self {
        Self {
            post_id,
            draft: String::new(),
            local: vec![],
        }
    }

    /// Loads persisted comments for `post_id` and returns the two requests
    /// the view issues on mount.
    pub fn mount<S: KeyValueStore + ?Sized>(
        post_id: u64,
        storage: &S,
    ) -> Result<(Self, [Operation; 2]), StorageError> {
        let local = load_local_comments(storage, post_id)?;
        debug!(post_id, local = local.len(), "detail mounted");

        Ok((
            Self {
                local,
                ..Self::new(post_id)
            },
            Self::requests(post_id),
        ))
    }

    pub fn requests(post_id: u64) -> [Operation; 2] {
        [Operation::FetchById(post_id), Operation::FetchComments(post_id)]
    }

    pub fn local_comments(&self) -> &[Comment] {
        &self.local
    }

    /// Appends the draft as a local comment and persists the whole sequence.
    /// Blank drafts do nothing. The stored sequence is re-read first; if it
    /// is unreadable nothing is written.
    pub fn submit<S: KeyValueStore + ?Sized>(
        &mut self,
        storage: &S,
        now: DateTime<Utc>,
    ) -> Result<Option<Comment>, StorageError> {
        let body = self.draft.trim();
        if body.is_empty() {
            return Ok(None);
        }

        let mut updated = read_local_comments(storage, self.post_id)?;
        let id = next_id(updated.iter().chain(&self.local), now);
        let comment = Comment::local(id, body, now);

        updated.push(comment.clone());
        save_local_comments(storage, self.post_id, &updated)?;

        self.local = updated;
        self.draft.clear();
        debug!(post_id = self.post_id, comment_id = id, "local comment stored");
        Ok(Some(comment))
    }

    /// API comments in fetched order, then local comments in submission order.
    pub fn displayed_comments(&self, api: &[Comment]) -> Vec<Comment> {
        api.iter().chain(self.local.iter()).cloned().collect()
    }
}

fn next_id<'a>(existing: impl Iterator<Item = &'a Comment>, now: DateTime<Utc>) -> u64 {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    let after_last = existing.map(|c| c.id.saturating_add(1)).max().unwrap_or(0);
    millis.max(after_last)
}
