use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use thiserror::Error;

use crate::action_executor::{ProcessSpawner, Spawner};
use crate::config::{self, Config, ConfigError};
use crate::contract::SearchResponse;
use crate::core_service::{Effect, Session, View};
use crate::discovery::{CatalogLoader, CatalogSource, DesktopEntrySource, FixtureSource};
use crate::input_state::Command;
use crate::launch_counts::LaunchCountStore;
use crate::logging;
use crate::model::Application;
use crate::terminal::TerminalPlatform;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("platform error: {0}")]
    Platform(#[from] std::io::Error),
    #[error("failed to encode results: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Raw input already translated by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    Command(Command),
    FocusLost,
    Redraw,
}

pub trait EventSource {
    /// Returns the next pending event, waiting at most `timeout`.
    fn poll(&mut self, timeout: Duration) -> Result<Option<PlatformEvent>, RuntimeError>;
}

pub trait Renderer {
    fn render(&mut self, view: &View, cursor_visible: bool) -> Result<(), RuntimeError>;
    fn render_cursor(&mut self, view: &View, cursor_visible: bool) -> Result<(), RuntimeError>;
}

/// Cosmetic cursor blink; a pure comparison against the last toggle time.
#[derive(Debug, Clone, Copy)]
pub struct BlinkTimer {
    interval: Duration,
    last_toggle: Instant,
    visible: bool,
}

impl BlinkTimer {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_toggle: now,
            visible: true,
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_toggle) > self.interval
    }

    pub fn toggle(&mut self, now: Instant) -> bool {
        self.visible = !self.visible;
        self.last_toggle = now;
        self.visible
    }

    pub fn reset(&mut self, now: Instant) {
        self.visible = true;
        self.last_toggle = now;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Cancelled,
    Launched(Arc<Application>),
}

pub struct Scheduler {
    tick: Duration,
    blink: BlinkTimer,
}

impl Scheduler {
    pub fn new(tick: Duration, blink_interval: Duration) -> Self {
        Self {
            tick,
            blink: BlinkTimer::new(blink_interval, Instant::now()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Duration::from_millis(config.tick_interval_ms),
            Duration::from_millis(config.blink_interval_ms),
        )
    }

    /// Drives the session until a launch or cancel. Events are applied in arrival order and each
    /// one that changes visible state is rendered before the next is read.
    pub fn run<P>(
        &mut self,
        session: &mut Session,
        platform: &mut P,
        spawner: &dyn Spawner,
    ) -> Result<RunOutcome, RuntimeError>
    where
        P: EventSource + Renderer,
    {
        platform.render(&session.view(), true)?;
        self.blink.reset(Instant::now());

        loop {
            let mut next = platform.poll(self.tick)?;
            while let Some(event) = next {
                let effects = match event {
                    PlatformEvent::Command(command) => session.apply(&command),
                    PlatformEvent::FocusLost => {
                        info!("focus lost; exiting");
                        vec![Effect::Exit]
                    }
                    PlatformEvent::Redraw => vec![Effect::Render],
                };

                for effect in effects {
                    match effect {
                        Effect::Render => {
                            platform.render(&session.view(), true)?;
                            self.blink.reset(Instant::now());
                        }
                        Effect::Launch(app) => {
                            if let Err(err) = session.launch(&app, spawner) {
                                error!("launch of {} failed: {err}", app.id);
                            }
                            return Ok(RunOutcome::Launched(app));
                        }
                        Effect::Exit => return Ok(RunOutcome::Cancelled),
                    }
                }
                next = platform.poll(Duration::ZERO)?;
            }

            let now = Instant::now();
            if self.blink.due(now) {
                let visible = self.blink.toggle(now);
                platform.render_cursor(&session.view(), visible)?;
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub config_path: Option<PathBuf>,
    pub query: Option<String>,
    pub fixture: bool,
    pub help: bool,
}

pub const USAGE: &str = "usage: keylaunch [--config <path>] [--query <text>] [--fixture] [--help]";

pub fn parse_cli_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--config requires a path".to_string())?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--query" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--query requires a value".to_string())?;
                options.query = Some(value.clone());
            }
            "--fixture" => options.fixture = true,
            "--help" | "-h" => options.help = true,
            other => return Err(format!("unknown argument '{other}'\n{USAGE}")),
        }
    }
    Ok(options)
}

pub fn run_with_options(options: CliOptions) -> Result<(), RuntimeError> {
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = config::load(options.config_path.as_deref())?;
    match logging::init(&config.log_dir) {
        Ok(path) => info!("logging to {}", path.display()),
        Err(err) => eprintln!("[keylaunch] logging disabled: {err}"),
    }
    info!(
        "startup config_path={} counts_path={} app_dirs={}",
        config.config_path.display(),
        config.counts_path.display(),
        config.app_dirs.len()
    );

    let sources: Vec<Box<dyn CatalogSource>> = if options.fixture {
        vec![Box::new(FixtureSource::deterministic_fixture())]
    } else {
        vec![Box::new(DesktopEntrySource::new(config.app_dirs.clone()))]
    };
    let pending = CatalogLoader::spawn(sources);
    let mut session = Session::new(pending, LaunchCountStore::open(&config.counts_path));

    if let Some(query) = options.query {
        let ranked = session.search_now(&query);
        let response = SearchResponse::new(&query, &ranked);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let spawner = ProcessSpawner::new(config.working_dir.clone());
    let mut platform = TerminalPlatform::enter()?;
    let outcome = Scheduler::from_config(&config).run(&mut session, &mut platform, &spawner);
    if let Err(err) = platform.leave() {
        warn!("failed to restore terminal: {err}");
    }

    match outcome? {
        RunOutcome::Cancelled => info!("session cancelled"),
        RunOutcome::Launched(app) => info!("session ended with launch of {}", app.id),
    }
    log::logger().flush();
    Ok(())
}
