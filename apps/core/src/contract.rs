use serde::{Deserialize, Serialize};

use crate::search::{find_highlight_span, RankedApp, Span};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResultDto {
    pub id: String,
    pub name: String,
    pub comment: String,
    pub score: i64,
    pub name_highlight: Option<Span>,
    pub comment_highlight: Option<Span>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResultDto>,
}

impl SearchResultDto {
    pub fn from_ranked(ranked: &RankedApp, query_lower: &str) -> Self {
        let app = &ranked.application;
        Self {
            id: app.id.clone(),
            name: app.name.clone(),
            comment: app.comment.clone(),
            score: ranked.score,
            name_highlight: find_highlight_span(&app.name, query_lower),
            comment_highlight: find_highlight_span(&app.comment, query_lower),
        }
    }
}

impl SearchResponse {
    pub fn new(query: &str, ranked: &[RankedApp]) -> Self {
        let query_lower = query.to_lowercase();
        Self {
            query: query.to_string(),
            results: ranked
                .iter()
                .map(|r| SearchResultDto::from_ranked(r, &query_lower))
                .collect(),
        }
    }
}
