use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::USER_AGENT;
use serde::Deserialize;

use crate::data::{ItemSource, SourceItem, User};
use crate::item::{Comment, ItemId, Post};

pub const HN_API_BASE: &str = "https://hacker-news.firebaseio.com/v0";
pub const HN_USER_URL: &str = "https://news.ycombinator.com/user";
pub const HN_ITEM_URL: &str = "https://news.ycombinator.com/item";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub user_agent: String,
    pub base_url: String,
    pub timeout: Duration,
    pub http_client: Option<HttpClient>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("hn-hiring/{}", crate::VERSION),
            base_url: HN_API_BASE.to_string(),
            timeout: Duration::from_secs(20),
            http_client: None,
        }
    }
}

pub struct Client {
    http: HttpClient,
    user_agent: String,
    base_url: String,
}

impl Client {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.user_agent.trim().is_empty() {
            bail!("hackernews client user agent required");
        }

        let http = match config.http_client {
            Some(client) => client,
            None => HttpClient::builder()
                .timeout(config.timeout)
                .build()
                .context("build http client")?,
        };

        Ok(Client {
            http,
            user_agent: config.user_agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn get_item(&self, id: ItemId) -> Result<Item> {
        let url = format!("{}/item/{}.json", self.base_url, id);
        log::debug!("GET {url}");
        // The API answers `null` for ids it does not know.
        let item: Option<Item> = self
            .http
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .with_context(|| format!("request item {id}"))?
            .error_for_status()
            .with_context(|| format!("request item {id}"))?
            .json()
            .with_context(|| format!("decode item {id}"))?;
        item.ok_or_else(|| anyhow!("item {id} does not exist"))
    }

    pub fn get_user(&self, username: &str) -> Result<User> {
        let url = format!("{}/user/{}.json", self.base_url, username);
        log::debug!("GET {url}");
        let user: Option<HnUser> = self
            .http
            .get(&url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .with_context(|| format!("request user {username}"))?
            .error_for_status()
            .with_context(|| format!("request user {username}"))?
            .json()
            .with_context(|| format!("decode user {username}"))?;
        let user = user.ok_or_else(|| anyhow!("user {username} does not exist"))?;
        Ok(User {
            id: user.id,
            submitted: user.submitted.into_iter().map(ItemId::new).collect(),
        })
    }
}

impl ItemSource for Client {
    fn fetch_item(&self, id: ItemId) -> Result<SourceItem> {
        Ok(self.get_item(id)?.into_source_item())
    }

    fn fetch_user(&self, username: &str) -> Result<User> {
        self.get_user(username)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub id: u64,
    #[serde(rename = "type", default)]
    pub item_type: String,
    #[serde(default)]
    pub by: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub dead: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub kids: Option<Vec<u64>>,
    #[serde(default)]
    pub title: Option<String>,
}

impl Item {
    pub fn into_source_item(self) -> SourceItem {
        let id = ItemId::new(self.id);
        match self.item_type.as_str() {
            "story" | "job" => SourceItem::Post(Post {
                id,
                title: self.title.unwrap_or_default(),
                child_ids: self
                    .kids
                    .unwrap_or_default()
                    .into_iter()
                    .map(ItemId::new)
                    .collect(),
            }),
            "comment" => {
                let body = if self.deleted || self.dead {
                    String::new()
                } else {
                    self.text.unwrap_or_default()
                };
                SourceItem::Comment(Comment::new(id, self.by.unwrap_or_default(), body))
            }
            other => SourceItem::Other {
                id,
                kind: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct HnUser {
    id: String,
    #[serde(default)]
    submitted: Vec<u64>,
}

pub fn user_url(username: &str) -> String {
    format!("{}?id={}", HN_USER_URL, username)
}

pub fn item_url(id: ItemId) -> String {
    format!("{}?id={}", HN_ITEM_URL, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> SourceItem {
        serde_json::from_str::<Item>(json)
            .unwrap()
            .into_source_item()
    }

    #[test]
    fn story_becomes_post_with_kids_in_source_order() {
        let item = decode(
            r#"{"id": 100, "type": "story", "by": "whoishiring",
                "title": "Ask HN: Who is hiring?", "kids": [9, 5, 7]}"#,
        );
        match item {
            SourceItem::Post(post) => {
                assert_eq!(post.title, "Ask HN: Who is hiring?");
                assert_eq!(
                    post.child_ids,
                    vec![ItemId::new(9), ItemId::new(5), ItemId::new(7)]
                );
            }
            other => panic!("expected post, got {other:?}"),
        }
    }

    #[test]
    fn deleted_comment_has_empty_body() {
        let item = decode(r#"{"id": 5, "type": "comment", "deleted": true, "text": "gone"}"#);
        match item {
            SourceItem::Comment(comment) => {
                assert!(comment.body.is_empty());
                assert!(comment.author.is_empty());
                assert!(!comment.read);
            }
            other => panic!("expected comment, got {other:?}"),
        }
    }

    #[test]
    fn unused_api_fields_are_ignored() {
        let item = decode(
            r#"{"id": 9, "type": "comment", "by": "alice", "parent": 100,
                "time": 1700000000, "text": "Acme | Remote", "kids": [11]}"#,
        );
        assert_eq!(
            item,
            SourceItem::Comment(Comment::new(ItemId::new(9), "alice", "Acme | Remote"))
        );
    }

    #[test]
    fn poll_is_reported_as_other() {
        let item = decode(r#"{"id": 8, "type": "poll", "title": "Vote"}"#);
        assert!(matches!(item, SourceItem::Other { ref kind, .. } if kind == "poll"));
    }

    #[test]
    fn client_requires_user_agent() {
        let cfg = ClientConfig {
            user_agent: "  ".into(),
            ..ClientConfig::default()
        };
        assert!(Client::new(cfg).is_err());
    }

    #[test]
    fn profile_links() {
        assert_eq!(
            user_url("pg"),
            "https://news.ycombinator.com/user?id=pg"
        );
        assert_eq!(
            item_url(ItemId::new(42)),
            "https://news.ycombinator.com/item?id=42"
        );
    }
}
