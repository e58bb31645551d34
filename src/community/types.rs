use serde::{Deserialize, Serialize};

use super::SearchError;

/// Medical mode looks for diagnosis discussions, general mode for lifestyle ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    General,
    Medical,
}

impl SearchMode {
    /// Forums searched in addition to the site-wide query.
    pub fn forums(&self) -> &'static [&'static str] {
        match self {
            Self::Medical => &["AskDocs", "DiagnoseMe", "medical_advice"],
            Self::General => &["Health", "HealthAnxiety", "Wellness"],
        }
    }

    /// Suffixes appended to each symptom to form extra queries.
    pub fn qualifiers(&self) -> &'static [&'static str] {
        match self {
            Self::Medical => &["diagnosis", "medical advice", "doctor"],
            Self::General => &["lifestyle", "wellness", "natural"],
        }
    }

    /// Suffix for the combined two-symptom query.
    pub fn combined_qualifier(&self) -> &'static str {
        match self {
            Self::Medical => "diagnosis medical",
            Self::General => "lifestyle wellness",
        }
    }

    /// A post is relevant when its lower-cased title or body contains one of these.
    pub fn relevance_terms(&self) -> &'static [&'static str] {
        match self {
            Self::Medical => &[
                "diagnosis",
                "medical advice",
                "doctor",
                "symptoms",
                "i have",
                "experiencing",
            ],
            Self::General => &[
                "lifestyle",
                "wellness",
                "natural",
                "i have",
                "experiencing",
                "anyone else",
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityPost {
    pub title: String,
    pub selftext: String,
    pub url: String,
    pub score: i64,
    pub num_comments: u64,
    pub created_utc: f64,
    pub subreddit: String,
    pub author: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunitySearchResult {
    pub posts: Vec<CommunityPost>,
    pub search_terms: Vec<String>,
}

/// One search call: a query, optionally restricted to one forum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub forum: Option<&'static str>,
}

/// A searchable forum backend.
pub trait PostSource {
    fn search(&self, query: &str, forum: Option<&str>) -> Result<Vec<CommunityPost>, SearchError>;
}
