use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a Hacker News item. Ordered numerically; higher ids are newer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Post,
    Comment,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Post => "post",
            Kind::Comment => "comment",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: ItemId,
    pub title: String,
    pub child_ids: Vec<ItemId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: ItemId,
    pub author: String,
    /// Raw HTML body as served upstream. Empty when the comment was deleted.
    pub body: String,
    pub read: bool,
}

impl Comment {
    pub fn new(id: ItemId, author: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            author: author.into(),
            body: body.into(),
            read: false,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.body.trim().is_empty()
    }
}

/// Sorts ids newest first and drops duplicates.
pub fn newest_first(ids: &[ItemId]) -> Vec<ItemId> {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted.dedup();
    sorted
}
