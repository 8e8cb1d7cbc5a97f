use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use parking_lot::{Mutex, RwLock};

use crate::data::{ItemSource, SourceItem};
use crate::item::{newest_first, Comment, ItemId, Kind, Post};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("item {0} not found")]
    NotFound(ItemId),
    #[error("item {id} is a {found}, expected a {expected}")]
    WrongKind {
        id: ItemId,
        expected: Kind,
        found: String,
    },
    #[error("item {id} unavailable: {reason}")]
    SourceUnavailable { id: ItemId, reason: String },
}

impl CacheError {
    pub fn id(&self) -> ItemId {
        match self {
            CacheError::NotFound(id)
            | CacheError::WrongKind { id, .. }
            | CacheError::SourceUnavailable { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedItem {
    Post(Arc<Post>),
    Comment(Comment),
}

#[derive(Debug)]
enum EntryState {
    Unfetched,
    Fetched(CachedItem),
    /// Last attempt failed. The next access fetches again.
    Failed(String),
}

#[derive(Debug)]
struct Entry {
    expected: Kind,
    state: EntryState,
}

impl Entry {
    fn unfetched(expected: Kind) -> Self {
        Self {
            expected,
            state: EntryState::Unfetched,
        }
    }
}

enum Lookup {
    Hit(CachedItem),
    Miss(Kind),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub known: usize,
    pub fetched: usize,
    pub failed: usize,
}

/// Memoizing front for an [`ItemSource`].
///
/// Only ids that are known to exist can be fetched: the root ids handed to the
/// constructor (expected to be posts) and the children of every fetched post
/// (expected to be comments). Each id is fetched successfully at most once; the
/// fetch lock serializes misses so concurrent callers for the same id share a
/// single request, while hits only take the read lock.
pub struct ItemCache {
    source: Arc<dyn ItemSource>,
    roots: Vec<ItemId>,
    entries: RwLock<HashMap<ItemId, Entry>>,
    fetch_lock: Mutex<()>,
}

impl ItemCache {
    pub fn new(source: Arc<dyn ItemSource>, roots: &[ItemId]) -> Self {
        let roots = newest_first(roots);
        let entries = roots
            .iter()
            .map(|id| (*id, Entry::unfetched(Kind::Post)))
            .collect();
        Self {
            source,
            roots,
            entries: RwLock::new(entries),
            fetch_lock: Mutex::new(()),
        }
    }

    /// Seeds the root list from a user's submissions.
    pub fn for_user(source: Arc<dyn ItemSource>, username: &str) -> Result<Self> {
        let user = source
            .fetch_user(username)
            .with_context(|| format!("fetch submissions of {username}"))?;
        if user.submitted.is_empty() {
            bail!("user {username} has no submissions");
        }
        log::info!(
            "seeded {} root posts from user {}",
            user.submitted.len(),
            user.id
        );
        Ok(Self::new(source, &user.submitted))
    }

    pub fn get(&self, id: ItemId) -> Result<CachedItem, CacheError> {
        if let Lookup::Hit(item) = self.lookup(id)? {
            return Ok(item);
        }

        let _guard = self.fetch_lock.lock();
        // Another caller may have committed while we waited for the lock.
        let expected = match self.lookup(id)? {
            Lookup::Hit(item) => return Ok(item),
            Lookup::Miss(expected) => expected,
        };

        log::debug!("cache miss for {expected} {id}");
        let fetched = self.source.fetch_item(id);
        self.commit(id, expected, fetched)
    }

    pub fn post(&self, id: ItemId) -> Result<Arc<Post>, CacheError> {
        match self.get(id)? {
            CachedItem::Post(post) => Ok(post),
            CachedItem::Comment(_) => Err(CacheError::WrongKind {
                id,
                expected: Kind::Post,
                found: Kind::Comment.to_string(),
            }),
        }
    }

    pub fn comment(&self, id: ItemId) -> Result<Comment, CacheError> {
        match self.get(id)? {
            CachedItem::Comment(comment) => Ok(comment),
            CachedItem::Post(_) => Err(CacheError::WrongKind {
                id,
                expected: Kind::Comment,
                found: Kind::Post.to_string(),
            }),
        }
    }

    /// Root post ids, newest first.
    pub fn list_root_posts(&self) -> Vec<ItemId> {
        self.roots.clone()
    }

    /// Child ids of a post, newest first. Fetches the post on a miss.
    pub fn list_children(&self, post_id: ItemId) -> Result<Vec<ItemId>, CacheError> {
        let post = self.post(post_id)?;
        Ok(newest_first(&post.child_ids))
    }

    /// Flips the local read flag of a comment that has already been fetched.
    pub fn toggle_read(&self, id: ItemId) -> Result<Comment, CacheError> {
        let mut entries = self.entries.write();
        let entry = entries.get_mut(&id).ok_or(CacheError::NotFound(id))?;
        match &mut entry.state {
            EntryState::Fetched(CachedItem::Comment(comment)) => {
                comment.read = !comment.read;
                log::debug!("comment {id} read={}", comment.read);
                Ok(comment.clone())
            }
            EntryState::Fetched(CachedItem::Post(_)) => Err(CacheError::WrongKind {
                id,
                expected: Kind::Comment,
                found: Kind::Post.to_string(),
            }),
            EntryState::Unfetched | EntryState::Failed(_) => Err(CacheError::NotFound(id)),
        }
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.read();
        let mut stats = CacheStats {
            known: entries.len(),
            ..CacheStats::default()
        };
        for entry in entries.values() {
            match entry.state {
                EntryState::Fetched(_) => stats.fetched += 1,
                EntryState::Failed(_) => stats.failed += 1,
                EntryState::Unfetched => {}
            }
        }
        stats
    }

    fn lookup(&self, id: ItemId) -> Result<Lookup, CacheError> {
        let entries = self.entries.read();
        let entry = entries.get(&id).ok_or(CacheError::NotFound(id))?;
        Ok(match &entry.state {
            EntryState::Fetched(item) => Lookup::Hit(item.clone()),
            EntryState::Unfetched => Lookup::Miss(entry.expected),
            EntryState::Failed(reason) => {
                log::debug!("retrying {id} after earlier failure: {reason}");
                Lookup::Miss(entry.expected)
            }
        })
    }

    fn commit(
        &self,
        id: ItemId,
        expected: Kind,
        fetched: anyhow::Result<SourceItem>,
    ) -> Result<CachedItem, CacheError> {
        let mut entries = self.entries.write();

        let outcome = match fetched {
            Ok(SourceItem::Post(post)) if expected == Kind::Post => {
                for child in &post.child_ids {
                    entries
                        .entry(*child)
                        .or_insert_with(|| Entry::unfetched(Kind::Comment));
                }
                Ok(CachedItem::Post(Arc::new(post)))
            }
            Ok(SourceItem::Comment(comment)) if expected == Kind::Comment => {
                Ok(CachedItem::Comment(comment))
            }
            Ok(other) => Err(CacheError::WrongKind {
                id,
                expected,
                found: other.kind_name().to_string(),
            }),
            Err(err) => Err(CacheError::SourceUnavailable {
                id,
                reason: format!("{err:#}"),
            }),
        };

        let entry = entries
            .get_mut(&id)
            .ok_or(CacheError::NotFound(id))?;
        match &outcome {
            Ok(item) => entry.state = EntryState::Fetched(item.clone()),
            Err(err) => {
                log::warn!("fetch of {id} failed: {err}");
                entry.state = EntryState::Failed(err.to_string());
            }
        }
        outcome
    }
}
