use std::collections::HashMap;
use std::sync::Arc;

use keylaunch_core::contract::SearchResponse;
use keylaunch_core::model::{Application, RawApplication};
use keylaunch_core::search::{rank, Span};

#[test]
fn response_carries_scores_and_original_case_spans() {
    let catalog = vec![Arc::new(Application::from_raw(RawApplication::new(
        "files",
        "Files",
        "File manager",
        "nautilus",
    )))];
    let ranked = rank("fil", &catalog, &HashMap::new());
    let response = SearchResponse::new("FIL", &ranked);

    assert_eq!(response.query, "FIL");
    assert_eq!(response.results.len(), 1);
    let result = &response.results[0];
    assert_eq!(result.id, "files");
    assert_eq!(result.name_highlight, Some(Span { start: 0, len: 3 }));
    assert_eq!(result.comment_highlight, Some(Span { start: 0, len: 3 }));
}

#[test]
fn response_serializes_to_json() {
    let response = SearchResponse::new("x", &[]);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json, serde_json::json!({ "query": "x", "results": [] }));

    let back: SearchResponse = serde_json::from_value(json).unwrap();
    assert_eq!(back, response);
}
