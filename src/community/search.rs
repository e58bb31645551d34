use std::collections::HashSet;

use super::types::{CommunityPost, CommunitySearchResult, PostSource, SearchMode, SearchQuery};
use crate::analysis::common_symptoms;
use crate::models::HealthLog;

pub const MAX_SEARCH_SYMPTOMS: usize = 3;
pub const MAX_RESULTS: usize = 8;
pub const MIN_BODY_CHARS: usize = 100;

/// Most frequent symptom labels across the logs.
pub fn top_symptoms(logs: &[HealthLog], limit: usize) -> Vec<String> {
    common_symptoms(logs, limit)
}

/// Query plan: for each symptom the plain label and one per mode qualifier,
/// each run site-wide and then once per forum. Two or more symptoms add a
/// combined query and a qualified combined query, both site-wide.
pub fn build_queries(symptoms: &[String], mode: SearchMode) -> Vec<SearchQuery> {
    let mut queries = Vec::new();
    for symptom in symptoms {
        let texts = std::iter::once(symptom.clone())
            .chain(mode.qualifiers().iter().map(|q| format!("{symptom} {q}")));
        for text in texts {
            queries.push(SearchQuery {
                text: text.clone(),
                forum: None,
            });
            for forum in mode.forums() {
                queries.push(SearchQuery {
                    text: text.clone(),
                    forum: Some(forum),
                });
            }
        }
    }

    if symptoms.len() >= 2 {
        let combined = symptoms[..2].join(" ");
        let qualified = format!("{combined} {}", mode.combined_qualifier());
        queries.push(SearchQuery {
            text: combined,
            forum: None,
        });
        queries.push(SearchQuery {
            text: qualified,
            forum: None,
        });
    }
    queries
}

/// Enough body text and at least one relevance term in title or body.
pub fn is_relevant(post: &CommunityPost, mode: SearchMode) -> bool {
    if post.selftext.chars().count() < MIN_BODY_CHARS {
        return false;
    }
    let title = post.title.to_lowercase();
    let body = post.selftext.to_lowercase();
    mode.relevance_terms()
        .iter()
        .any(|term| title.contains(term) || body.contains(term))
}

/// Drop repeated URLs, keeping the first occurrence.
pub fn dedupe_by_url(posts: Vec<CommunityPost>) -> Vec<CommunityPost> {
    let mut seen = HashSet::new();
    posts
        .into_iter()
        .filter(|p| seen.insert(p.url.clone()))
        .collect()
}

/// Search the source for posts resembling the user's symptoms. Failed queries
/// contribute nothing; the search as a whole never fails.
pub fn search_similar_cases(
    source: &dyn PostSource,
    logs: &[HealthLog],
    mode: SearchMode,
) -> CommunitySearchResult {
    let symptoms = top_symptoms(logs, MAX_SEARCH_SYMPTOMS);
    if symptoms.is_empty() {
        return CommunitySearchResult::default();
    }

    let queries = build_queries(&symptoms, mode);
    let _span = tracing::info_span!("community_search", ?mode, queries = queries.len()).entered();

    let mut collected = Vec::new();
    let mut failures = 0usize;
    for query in &queries {
        match source.search(&query.text, query.forum) {
            Ok(posts) => collected.extend(posts),
            Err(e) => {
                failures += 1;
                tracing::debug!(
                    query = %query.text,
                    forum = ?query.forum,
                    error = %e,
                    "Forum query failed"
                );
            }
        }
    }
    if failures > 0 {
        tracing::warn!(failures, total = queries.len(), "Some forum queries failed");
    }

    let mut posts: Vec<CommunityPost> = dedupe_by_url(collected)
        .into_iter()
        .filter(|p| is_relevant(p, mode))
        .collect();
    posts.sort_by(|a, b| b.score.cmp(&a.score));
    posts.truncate(MAX_RESULTS);

    tracing::info!(results = posts.len(), "Community search complete");
    CommunitySearchResult {
        posts,
        search_terms: symptoms,
    }
}
