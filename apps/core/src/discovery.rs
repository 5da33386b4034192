use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error, info, warn};
use thiserror::Error;
use walkdir::WalkDir;

use crate::desktop_entry::read_desktop_entry;
use crate::model::{Application, RawApplication};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SourceError {
    message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub trait CatalogSource: Send + Sync {
    fn source_name(&self) -> &'static str;
    fn discover(&self) -> Result<Vec<RawApplication>, SourceError>;
}

/// Scans descriptor directories in priority order. Unreadable directories and files are skipped.
pub struct DesktopEntrySource {
    dirs: Vec<PathBuf>,
}

impl DesktopEntrySource {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }
}

impl CatalogSource for DesktopEntrySource {
    fn source_name(&self) -> &'static str {
        "desktop-entries"
    }

    fn discover(&self) -> Result<Vec<RawApplication>, SourceError> {
        let mut records = Vec::new();
        for dir in &self.dirs {
            if !dir.is_dir() {
                debug!("skipping missing application dir {}", dir.display());
                continue;
            }

            let walker = WalkDir::new(dir)
                .min_depth(1)
                .max_depth(1)
                .follow_links(true)
                .sort_by_file_name();
            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        warn!("skipping unreadable entry in {}: {err}", dir.display());
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                match read_desktop_entry(entry.path()) {
                    Ok(raw) => records.push(raw),
                    Err(err) => warn!(
                        "skipping unreadable descriptor {}: {err}",
                        entry.path().display()
                    ),
                }
            }
        }
        Ok(records)
    }
}

pub struct FixtureSource {
    apps: Vec<RawApplication>,
}

impl FixtureSource {
    pub fn from_apps(apps: Vec<RawApplication>) -> Self {
        Self { apps }
    }

    pub fn deterministic_fixture() -> Self {
        Self {
            apps: vec![
                RawApplication::new(
                    "fixture-firefox",
                    "Firefox",
                    "Browse the World Wide Web",
                    "firefox %u",
                )
                .with_generic_name("Web Browser")
                .with_keywords("Internet;WWW;Browser;Web;"),
                RawApplication::new(
                    "fixture-files",
                    "Files",
                    "Access and organize files",
                    "nautilus --new-window",
                )
                .with_generic_name("File manager")
                .with_keywords("folder;manager;explore;disk;filesystem;"),
                RawApplication::new(
                    "fixture-terminal",
                    "Terminal",
                    "Use the command line",
                    "gnome-terminal",
                )
                .with_keywords("shell;prompt;command;commandline;cmd;"),
                RawApplication::new("fixture-editor", "Text Editor", "Edit text files", "gedit %U")
                    .with_keywords("Text;Editor;Plaintext;Write;"),
            ],
        }
    }
}

impl CatalogSource for FixtureSource {
    fn source_name(&self) -> &'static str {
        "fixture"
    }

    fn discover(&self) -> Result<Vec<RawApplication>, SourceError> {
        Ok(self.apps.clone())
    }
}

/// Indexed applications in discovery order. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    apps: Vec<Arc<Application>>,
}

impl Catalog {
    pub fn from_raw(records: Vec<RawApplication>) -> Self {
        Self {
            apps: records
                .into_iter()
                .map(|raw| Arc::new(Application::from_raw(raw)))
                .collect(),
        }
    }

    pub fn apps(&self) -> &[Arc<Application>] {
        &self.apps
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}

pub fn build_catalog(sources: &[Box<dyn CatalogSource>]) -> Catalog {
    build_catalog_until(sources, &AtomicBool::new(false))
}

fn build_catalog_until(sources: &[Box<dyn CatalogSource>], cancelled: &AtomicBool) -> Catalog {
    let mut records = Vec::new();
    for source in sources {
        if cancelled.load(Ordering::Relaxed) {
            info!("catalog load cancelled before source {}", source.source_name());
            return Catalog::default();
        }
        match source.discover() {
            Ok(found) => {
                debug!("source {} produced {} records", source.source_name(), found.len());
                records.extend(found);
            }
            Err(err) => warn!("source {} failed: {err}", source.source_name()),
        }
    }
    Catalog::from_raw(records)
}

/// Builds the catalog off the interactive thread.
pub struct CatalogLoader;

impl CatalogLoader {
    pub fn spawn(sources: Vec<Box<dyn CatalogSource>>) -> PendingCatalog {
        let (tx, rx) = mpsc::sync_channel(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let handle = thread::Builder::new()
            .name("catalog-loader".to_string())
            .spawn(move || {
                let catalog = build_catalog_until(&sources, &flag);
                info!("catalog loaded applications={}", catalog.len());
                let _ = tx.send(catalog);
            });

        match handle {
            Ok(handle) => PendingCatalog {
                rx,
                handle: Some(handle),
                cancelled,
            },
            Err(err) => {
                error!("failed to spawn catalog loader thread: {err}");
                let (tx, rx) = mpsc::sync_channel(1);
                let _ = tx.send(Catalog::default());
                PendingCatalog {
                    rx,
                    handle: None,
                    cancelled,
                }
            }
        }
    }
}

/// One-shot handle to the background load.
pub struct PendingCatalog {
    rx: Receiver<Catalog>,
    handle: Option<JoinHandle<()>>,
    cancelled: Arc<AtomicBool>,
}

impl PendingCatalog {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Blocks until the loader publishes its catalog.
    pub fn wait(mut self) -> Catalog {
        let catalog = match self.rx.recv() {
            Ok(catalog) => catalog,
            Err(_) => {
                error!("catalog loader exited without a result; continuing with an empty catalog");
                Catalog::default()
            }
        };
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        catalog
    }
}

/// Session-side holder: the pending load is joined on first use and cached afterwards.
pub enum CatalogSlot {
    Pending(PendingCatalog),
    Ready(Arc<Catalog>),
}

impl CatalogSlot {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn get(&mut self) -> Arc<Catalog> {
        if let Self::Ready(catalog) = self {
            return Arc::clone(catalog);
        }

        let previous = std::mem::replace(self, Self::Ready(Arc::new(Catalog::default())));
        if let Self::Pending(pending) = previous {
            debug!("waiting for background catalog load");
            *self = Self::Ready(Arc::new(pending.wait()));
        }
        match self {
            Self::Ready(catalog) => Arc::clone(catalog),
            Self::Pending(_) => Arc::new(Catalog::default()),
        }
    }
}

impl From<PendingCatalog> for CatalogSlot {
    fn from(value: PendingCatalog) -> Self {
        Self::Pending(value)
    }
}

impl From<Catalog> for CatalogSlot {
    fn from(value: Catalog) -> Self {
        Self::Ready(Arc::new(value))
    }
}
