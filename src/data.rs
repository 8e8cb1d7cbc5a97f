use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Result};
use parking_lot::Mutex;

use crate::item::{Comment, ItemId, Post};

/// An item as the remote store reports it, before the cache decides whether it
/// is the kind the caller expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceItem {
    Post(Post),
    Comment(Comment),
    Other { id: ItemId, kind: String },
}

impl SourceItem {
    pub fn kind_name(&self) -> &str {
        match self {
            SourceItem::Post(_) => "post",
            SourceItem::Comment(_) => "comment",
            SourceItem::Other { kind, .. } => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub submitted: Vec<ItemId>,
}

pub trait ItemSource: Send + Sync {
    fn fetch_item(&self, id: ItemId) -> Result<SourceItem>;
    fn fetch_user(&self, username: &str) -> Result<User>;
}

/// In-memory source with scripted items and failures. Counts every fetch so
/// callers can assert on how often the remote store would have been hit.
#[derive(Default)]
pub struct MockItemSource {
    items: Mutex<HashMap<ItemId, SourceItem>>,
    failures: Mutex<HashMap<ItemId, String>>,
    users: Mutex<HashMap<String, User>>,
    fetches: Mutex<HashMap<ItemId, usize>>,
    latency: Duration,
}

impl MockItemSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post(self, id: u64, title: &str, children: &[u64]) -> Self {
        let post = Post {
            id: ItemId::new(id),
            title: title.to_string(),
            child_ids: children.iter().copied().map(ItemId::new).collect(),
        };
        self.items
            .lock()
            .insert(post.id, SourceItem::Post(post));
        self
    }

    pub fn with_comment(self, id: u64, author: &str, body: &str) -> Self {
        let comment = Comment::new(ItemId::new(id), author, body);
        self.items
            .lock()
            .insert(comment.id, SourceItem::Comment(comment));
        self
    }

    pub fn with_other(self, id: u64, kind: &str) -> Self {
        let id = ItemId::new(id);
        self.items.lock().insert(
            id,
            SourceItem::Other {
                id,
                kind: kind.to_string(),
            },
        );
        self
    }

    pub fn with_user(self, name: &str, submitted: &[u64]) -> Self {
        self.users.lock().insert(
            name.to_string(),
            User {
                id: name.to_string(),
                submitted: submitted.iter().copied().map(ItemId::new).collect(),
            },
        );
        self
    }

    /// Delays every item fetch, widening the window for racing callers.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Makes every fetch of `id` fail until [`MockItemSource::recover`] is called.
    pub fn fail(&self, id: u64, message: &str) {
        self.failures
            .lock()
            .insert(ItemId::new(id), message.to_string());
    }

    pub fn recover(&self, id: u64) {
        self.failures.lock().remove(&ItemId::new(id));
    }

    pub fn fetch_count(&self, id: u64) -> usize {
        self.fetches
            .lock()
            .get(&ItemId::new(id))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().values().sum()
    }
}

impl ItemSource for MockItemSource {
    fn fetch_item(&self, id: ItemId) -> Result<SourceItem> {
        *self.fetches.lock().entry(id).or_insert(0) += 1;
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        if let Some(message) = self.failures.lock().get(&id) {
            return Err(anyhow!("{message}"));
        }
        self.items
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| anyhow!("item {id} does not exist"))
    }

    fn fetch_user(&self, username: &str) -> Result<User> {
        self.users
            .lock()
            .get(username)
            .cloned()
            .ok_or_else(|| anyhow!("user {username} does not exist"))
    }
}
