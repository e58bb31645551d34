use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use super::types::{CommunityPost, PostSource};
use super::SearchError;
use crate::config::RedditConfig;

/// Permalinks are relative; posts link back to the canonical host.
const PERMALINK_BASE: &str = "https://reddit.com";

/// Blocking client for the public Reddit search listing.
pub struct RedditClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl RedditClient {
    pub fn new(base_url: &str, user_agent: &str, timeout_secs: u64) -> Result<Self, SearchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .map_err(|e| SearchError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &RedditConfig) -> Result<Self, SearchError> {
        Self::new(&config.base_url, &config.user_agent, config.timeout_secs)
    }

    fn search_url(&self, forum: Option<&str>) -> String {
        match forum {
            Some(forum) => format!("{}/r/{forum}/search.json", self.base_url),
            None => format!("{}/search.json", self.base_url),
        }
    }
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Deserialize)]
struct ListingChild {
    data: RawPost,
}

#[derive(Deserialize)]
struct RawPost {
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: u64,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    author: String,
}

impl From<RawPost> for CommunityPost {
    fn from(raw: RawPost) -> Self {
        Self {
            title: raw.title,
            selftext: raw.selftext,
            url: format!("{PERMALINK_BASE}{}", raw.permalink),
            score: raw.score,
            num_comments: raw.num_comments,
            created_utc: raw.created_utc,
            subreddit: raw.subreddit,
            author: raw.author,
        }
    }
}

fn parse_listing(body: &str) -> Result<Vec<CommunityPost>, SearchError> {
    let listing: Listing =
        serde_json::from_str(body).map_err(|e| SearchError::MalformedResponse(e.to_string()))?;
    Ok(listing
        .data
        .children
        .into_iter()
        .map(|c| c.data.into())
        .collect())
}

impl PostSource for RedditClient {
    fn search(&self, query: &str, forum: Option<&str>) -> Result<Vec<CommunityPost>, SearchError> {
        let mut params = vec![
            ("q", query),
            ("sort", "relevance"),
            ("t", "year"),
            ("limit", "10"),
        ];
        if forum.is_some() {
            params.push(("restrict_sr", "on"));
        }

        let response = self
            .client
            .get(self.search_url(forum))
            .query(&params)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    SearchError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    SearchError::Timeout(self.timeout_secs)
                } else {
                    SearchError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status(status.as_u16()));
        }
        let body = response
            .text()
            .map_err(|e| SearchError::MalformedResponse(e.to_string()))?;
        parse_listing(&body)
    }
}

/// Mock forum for testing: canned posts per (query, forum) pair.
#[derive(Default)]
pub struct MockPostSource {
    responses: HashMap<(String, Option<String>), Vec<CommunityPost>>,
    failing: Vec<(String, Option<String>)>,
    calls: std::sync::Mutex<Vec<(String, Option<String>)>>,
}

impl MockPostSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_posts(
        mut self,
        query: &str,
        forum: Option<&str>,
        posts: Vec<CommunityPost>,
    ) -> Self {
        self.responses
            .insert((query.to_string(), forum.map(str::to_string)), posts);
        self
    }

    pub fn with_failure(mut self, query: &str, forum: Option<&str>) -> Self {
        self.failing
            .push((query.to_string(), forum.map(str::to_string)));
        self
    }

    /// Every (query, forum) pair searched, in order.
    pub fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl PostSource for MockPostSource {
    fn search(&self, query: &str, forum: Option<&str>) -> Result<Vec<CommunityPost>, SearchError> {
        let key = (query.to_string(), forum.map(str::to_string));
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(key.clone());
        }
        if self.failing.contains(&key) {
            return Err(SearchError::Status(503));
        }
        Ok(self.responses.get(&key).cloned().unwrap_or_default())
    }
}
