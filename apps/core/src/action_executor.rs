use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Mutex;

use log::{info, warn};
use thiserror::Error;

use crate::launch_counts::LaunchCountStore;
use crate::model::Application;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("empty launch command for {0}")]
    EmptyCommand(String),
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub trait Spawner {
    fn spawn(&self, argv: &[String]) -> Result<(), LaunchError>;
}

/// Starts the program as a detached child in a fixed working directory.
pub struct ProcessSpawner {
    working_dir: PathBuf,
}

impl ProcessSpawner {
    pub fn new(working_dir: PathBuf) -> Self {
        Self { working_dir }
    }
}

impl Spawner for ProcessSpawner {
    fn spawn(&self, argv: &[String]) -> Result<(), LaunchError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(LaunchError::EmptyCommand(String::new()));
        };

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if self.working_dir.is_dir() {
            command.current_dir(&self.working_dir);
        }

        command
            .spawn()
            .map(|child| info!("spawned {program} pid={}", child.id()))
            .map_err(|source| LaunchError::Spawn {
                program: program.clone(),
                source,
            })
    }
}

/// Records every argv it is asked to spawn instead of starting processes.
#[derive(Default)]
pub struct RecordingSpawner {
    spawned: Mutex<Vec<Vec<String>>>,
}

impl RecordingSpawner {
    pub fn spawned(&self) -> Vec<Vec<String>> {
        self.spawned
            .lock()
            .map(|spawned| spawned.clone())
            .unwrap_or_default()
    }
}

impl Spawner for RecordingSpawner {
    fn spawn(&self, argv: &[String]) -> Result<(), LaunchError> {
        if let Ok(mut spawned) = self.spawned.lock() {
            spawned.push(argv.to_vec());
        }
        Ok(())
    }
}

/// Splits a descriptor command line on whitespace and drops `%` field codes.
pub fn command_argv(launch_command: &str) -> Vec<String> {
    launch_command
        .split_whitespace()
        .filter(|token| !token.starts_with('%'))
        .map(str::to_string)
        .collect()
}

/// Counts the launch first, then hands the command to the spawner. A failed count write is
/// logged and does not prevent the spawn.
pub fn launch(
    app: &Application,
    counts: &mut LaunchCountStore,
    spawner: &dyn Spawner,
) -> Result<(), LaunchError> {
    match counts.increment(&app.id) {
        Ok(count) => info!("launching {} count={count}", app.id),
        Err(err) => warn!("launch count not persisted for {}: {err}", app.id),
    }

    let argv = command_argv(&app.launch_command);
    if argv.is_empty() {
        return Err(LaunchError::EmptyCommand(app.id.clone()));
    }
    spawner.spawn(&argv)
}
