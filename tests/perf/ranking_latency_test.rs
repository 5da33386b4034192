use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::model::{Application, RawApplication};
use crate::search::rank;

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

#[test]
fn keystroke_rank_p95_under_budget() {
    let catalog: Vec<Arc<Application>> = (0..2_000)
        .map(|i| {
            Arc::new(Application::from_raw(
                RawApplication::new(
                    &format!("/usr/share/applications/app-{i:04}.desktop"),
                    &format!("Application {i:04} Suite"),
                    &format!("Utility number {i} for everyday desktop tasks"),
                    &format!("app-{i:04} %U"),
                )
                .with_generic_name("Desktop Utility")
                .with_keywords("tool;utility;desktop;"),
            ))
        })
        .collect();
    let counts: HashMap<String, u32> = HashMap::new();

    for _ in 0..20 {
        let _ = rank("task", &catalog, &counts);
    }

    let mut batch_p95 = Vec::with_capacity(5);
    for _ in 0..5 {
        let mut samples = Vec::with_capacity(60);
        for _ in 0..60 {
            let start = Instant::now();
            let _ = rank("task", &catalog, &counts);
            samples.push(start.elapsed().as_secs_f64() * 1000.0);
        }
        batch_p95.push(p95_ms(&mut samples));
    }

    batch_p95.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median_p95 = batch_p95[batch_p95.len() / 2];

    assert!(
        median_p95 <= 50.0,
        "median batch p95 too high: {median_p95:.3}ms (budget 50.0ms); batches={batch_p95:?}",
    );
}
