use std::cell::OnceCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CountsError {
    #[error("failed to write launch counts to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read-only view of per-application launch counts used by the ranker.
pub trait LaunchCounts {
    fn count(&self, id: &str) -> u32;
}

impl LaunchCounts for HashMap<String, u32> {
    fn count(&self, id: &str) -> u32 {
        self.get(id).copied().unwrap_or(0)
    }
}

/// Persisted `id=count` mapping. The backing file is read on first access and rewritten in
/// full after every increment.
#[derive(Debug)]
pub struct LaunchCountStore {
    path: Option<PathBuf>,
    counts: OnceCell<BTreeMap<String, u32>>,
}

impl LaunchCountStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            counts: OnceCell::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            counts: OnceCell::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, id: &str) -> u32 {
        self.loaded().get(id).copied().unwrap_or(0)
    }

    /// Bumps the count for `id` and persists the whole map before returning.
    ///
    /// The in-memory count is updated even when the write fails.
    pub fn increment(&mut self, id: &str) -> Result<u32, CountsError> {
        let mut counts = self
            .counts
            .take()
            .unwrap_or_else(|| self.read_persisted());
        let entry = counts.entry(id.to_string()).or_insert(0);
        *entry = entry.saturating_add(1);
        let updated = *entry;

        let written = match &self.path {
            Some(path) => write_counts(path, &counts).map_err(|source| CountsError::Write {
                path: path.clone(),
                source,
            }),
            None => Ok(()),
        };
        let _ = self.counts.set(counts);
        written?;

        debug!("recorded launch id={id} count={updated}");
        Ok(updated)
    }

    pub fn snapshot(&self) -> BTreeMap<String, u32> {
        self.loaded().clone()
    }

    fn loaded(&self) -> &BTreeMap<String, u32> {
        self.counts.get_or_init(|| self.read_persisted())
    }

    fn read_persisted(&self) -> BTreeMap<String, u32> {
        match &self.path {
            Some(path) => read_counts(path),
            None => BTreeMap::new(),
        }
    }
}

impl LaunchCounts for LaunchCountStore {
    fn count(&self, id: &str) -> u32 {
        self.get(id)
    }
}

fn read_counts(path: &Path) -> BTreeMap<String, u32> {
    match fs::read_to_string(path) {
        Ok(contents) => parse_counts(&contents),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
        Err(error) => {
            warn!(
                "launch counts unreadable at {}; starting from zero: {error}",
                path.display()
            );
            BTreeMap::new()
        }
    }
}

/// Parses the flat `id=count` listing. Bad lines are skipped one by one.
pub fn parse_counts(contents: &str) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('[') || line.starts_with('#') {
            continue;
        }

        let Some((id, value)) = line.rsplit_once('=') else {
            debug!("skipping launch count line without '=': {line}");
            continue;
        };
        let id = id.trim();
        if id.is_empty() {
            continue;
        }
        match value.trim().parse::<u32>() {
            Ok(count) => {
                counts.insert(id.to_string(), count);
            }
            Err(_) => debug!("skipping launch count line with bad value: {line}"),
        }
    }
    counts
}

pub fn render_counts(counts: &BTreeMap<String, u32>) -> String {
    counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(id, count)| format!("{id}={count}\n"))
        .collect()
}

fn write_counts(path: &Path, counts: &BTreeMap<String, u32>) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(render_counts(counts).as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}
