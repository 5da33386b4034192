use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{LevelFilter, Log, Metadata, Record};

const LOG_FILE_NAME: &str = "keylaunch.log";
const ARCHIVE_PREFIX: &str = "keylaunch-";
const MAX_LOG_BYTES: u64 = 1_000_000;
const MAX_ARCHIVES: usize = 5;
const LEVEL_ENV: &str = "KEYLAUNCH_LOG";

static LOGGER: OnceLock<FileLogger> = OnceLock::new();
static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();

struct FileLogger {
    file: Mutex<File>,
    level: LevelFilter,
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let Ok(mut file) = self.file.lock() else {
            return;
        };
        let line = format_line(now_secs(), record.level().as_str(), &record.args().to_string());
        let _ = file.write_all(line.as_bytes());
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Installs the file logger under `log_dir`. Safe to call more than once; later calls are no-ops.
pub fn init(log_dir: &Path) -> Result<PathBuf, std::io::Error> {
    fs::create_dir_all(log_dir)?;
    let log_path = log_dir.join(LOG_FILE_NAME);
    rotate_if_needed(&log_path, log_dir)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let level = level_from_env(std::env::var(LEVEL_ENV).ok().as_deref());
    let logger = LOGGER.get_or_init(|| FileLogger {
        file: Mutex::new(file),
        level,
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(logger.level);
    }

    install_panic_hook();
    Ok(log_path)
}

pub fn level_from_env(value: Option<&str>) -> LevelFilter {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("off") => LevelFilter::Off,
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn format_line(ts: u64, level: &str, message: &str) -> String {
    format!("[{ts}] [{level}] {message}\n")
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn rotate_if_needed(log_path: &Path, log_dir: &Path) -> Result<(), std::io::Error> {
    let meta = match fs::metadata(log_path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(err),
    };

    if meta.len() < MAX_LOG_BYTES {
        return Ok(());
    }

    let archived = log_dir.join(format!("{ARCHIVE_PREFIX}{}.log", now_secs()));
    fs::rename(log_path, archived)?;
    prune_old_archives(log_dir)
}

fn prune_old_archives(log_dir: &Path) -> Result<(), std::io::Error> {
    let mut archives = fs::read_dir(log_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(ARCHIVE_PREFIX) && n.ends_with(".log"))
                .unwrap_or(false)
        })
        .collect::<Vec<_>>();

    archives.sort();
    while archives.len() > MAX_ARCHIVES {
        let oldest = archives.remove(0);
        let _ = fs::remove_file(oldest);
    }
    Ok(())
}

fn install_panic_hook() {
    let _ = PANIC_HOOK_INSTALLED.get_or_init(|| {
        let prior = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            let location = panic_info
                .location()
                .map(|l| format!("{}:{}", l.file(), l.line()))
                .unwrap_or_else(|| "unknown".to_string());
            let payload = panic_info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic payload unavailable".to_string());
            log::error!("panic at {location}: {payload}");
            log::logger().flush();
            prior(panic_info);
        }));
    });
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use log::LevelFilter;

    use super::{format_line, level_from_env, prune_old_archives, MAX_ARCHIVES};

    #[test]
    fn level_defaults_to_info() {
        assert_eq!(level_from_env(None), LevelFilter::Info);
        assert_eq!(level_from_env(Some("nonsense")), LevelFilter::Info);
        assert_eq!(level_from_env(Some(" DEBUG ")), LevelFilter::Debug);
        assert_eq!(level_from_env(Some("off")), LevelFilter::Off);
    }

    #[test]
    fn line_format_is_stable() {
        assert_eq!(format_line(42, "WARN", "hello"), "[42] [WARN] hello\n");
    }

    #[test]
    fn prune_keeps_newest_archives() {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("keylaunch-logs-{unique}"));
        std::fs::create_dir_all(&dir).unwrap();
        for i in 0..(MAX_ARCHIVES + 3) {
            std::fs::write(dir.join(format!("keylaunch-{:04}.log", i)), b"x").unwrap();
        }
        std::fs::write(dir.join("keylaunch.log"), b"live").unwrap();

        prune_old_archives(&dir).unwrap();

        let remaining = std::fs::read_dir(&dir).unwrap().count();
        assert_eq!(remaining, MAX_ARCHIVES + 1);
        assert!(!dir.join("keylaunch-0000.log").exists());
        assert!(dir.join("keylaunch.log").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
