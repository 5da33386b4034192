use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::launch_counts::LaunchCounts;
use crate::model::Application;

pub const RESULT_CAP: usize = 10;

const KEYWORD_SLOTS: i64 = 100;
const PREFIX_MULTIPLIER: i64 = 10_000;
const INTERIOR_MULTIPLIER: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedApp {
    pub application: Arc<Application>,
    pub score: i64,
}

/// Byte range inside the original-case string that matched the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Relevance of `app` for an already-lowercased query; 0 means no match.
///
/// The first keyword containing the query decides the score. Preconditions: fewer than 100
/// keywords per application and launch counts far below 100, otherwise the ordering classes
/// below stop being strictly separated.
pub fn score(query_lower: &str, app: &Application, launch_count: u32) -> i64 {
    if query_lower.is_empty() {
        return 0;
    }

    for (index, keyword) in app.keywords().iter().enumerate() {
        let Some(position) = keyword.text.find(query_lower) else {
            continue;
        };
        let multiplier = if position == 0 {
            PREFIX_MULTIPLIER
        } else {
            INTERIOR_MULTIPLIER
        };
        return (KEYWORD_SLOTS - index as i64) * i64::from(keyword.weight) * multiplier
            + i64::from(launch_count);
    }

    0
}

/// Scores the whole catalog, keeps matches, and returns at most [`RESULT_CAP`] entries in
/// descending score order. Exact ties keep catalog order.
pub fn rank(
    query_lower: &str,
    catalog: &[Arc<Application>],
    counts: &impl LaunchCounts,
) -> Vec<RankedApp> {
    if query_lower.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<RankedApp> = catalog
        .iter()
        .filter_map(|app| {
            let score = score(query_lower, app, counts.count(&app.id));
            (score > 0).then(|| RankedApp {
                application: Arc::clone(app),
                score,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(RESULT_CAP);
    ranked
}

/// Locates `query_lower` case-insensitively inside `original` and reports the span in
/// `original`'s own byte offsets.
pub fn find_highlight_span(original: &str, query_lower: &str) -> Option<Span> {
    if query_lower.is_empty() {
        return None;
    }

    for (start, _) in original.char_indices() {
        if let Some(len) = match_len_at(&original[start..], query_lower) {
            return Some(Span { start, len });
        }
    }
    None
}

/// A needle that ends partway through a char's lowercase expansion still matches; the span then
/// covers that whole source char.
fn match_len_at(haystack: &str, query_lower: &str) -> Option<usize> {
    let mut needle = query_lower.chars().peekable();
    let mut consumed = 0;

    for ch in haystack.chars() {
        if needle.peek().is_none() {
            break;
        }
        for lower in ch.to_lowercase() {
            match needle.next() {
                Some(expected) if expected == lower => {}
                Some(_) => return None,
                None => break,
            }
        }
        consumed += ch.len_utf8();
    }

    if needle.peek().is_none() {
        Some(consumed)
    } else {
        None
    }
}
