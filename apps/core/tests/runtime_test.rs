use std::collections::VecDeque;
use std::time::Duration;

use keylaunch_core::action_executor::RecordingSpawner;
use keylaunch_core::core_service::{Session, View};
use keylaunch_core::discovery::{Catalog, CatalogSource, FixtureSource};
use keylaunch_core::input_state::Command;
use keylaunch_core::launch_counts::LaunchCountStore;
use keylaunch_core::runtime::{
    EventSource, PlatformEvent, Renderer, RunOutcome, RuntimeError, Scheduler,
};

/// Replays a fixed event script; `None` entries simulate idle ticks.
struct ScriptedPlatform {
    script: VecDeque<Option<PlatformEvent>>,
    renders: Vec<View>,
    cursor_toggles: Vec<bool>,
}

impl ScriptedPlatform {
    fn new(script: Vec<Option<PlatformEvent>>) -> Self {
        Self {
            script: script.into(),
            renders: Vec::new(),
            cursor_toggles: Vec::new(),
        }
    }
}

impl EventSource for ScriptedPlatform {
    fn poll(&mut self, timeout: Duration) -> Result<Option<PlatformEvent>, RuntimeError> {
        match self.script.pop_front() {
            Some(Some(event)) => Ok(Some(event)),
            Some(None) => {
                std::thread::sleep(timeout);
                Ok(None)
            }
            None => Ok(Some(PlatformEvent::Command(Command::Cancel))),
        }
    }
}

impl Renderer for ScriptedPlatform {
    fn render(&mut self, view: &View, _cursor_visible: bool) -> Result<(), RuntimeError> {
        self.renders.push(view.clone());
        Ok(())
    }

    fn render_cursor(&mut self, _view: &View, cursor_visible: bool) -> Result<(), RuntimeError> {
        self.cursor_toggles.push(cursor_visible);
        Ok(())
    }
}

fn session() -> Session {
    let catalog = Catalog::from_raw(FixtureSource::deterministic_fixture().discover().unwrap());
    Session::new(catalog, LaunchCountStore::in_memory())
}

fn key(command: Command) -> Option<PlatformEvent> {
    Some(PlatformEvent::Command(command))
}

#[test]
fn every_edit_is_rendered_in_arrival_order() {
    let mut session = session();
    let mut platform = ScriptedPlatform::new(vec![
        key(Command::InsertText("t".to_string())),
        key(Command::InsertText("e".to_string())),
        key(Command::MoveLeft),
        key(Command::Cancel),
    ]);
    let mut scheduler = Scheduler::new(Duration::from_millis(1), Duration::from_millis(500));

    let outcome = scheduler
        .run(&mut session, &mut platform, &RecordingSpawner::default())
        .unwrap();

    assert_eq!(outcome, RunOutcome::Cancelled);
    let queries: Vec<(&str, usize)> = platform
        .renders
        .iter()
        .map(|view| (view.query.as_str(), view.cursor))
        .collect();
    assert_eq!(queries, vec![("", 0), ("t", 1), ("te", 2), ("te", 1)]);
    assert!(!platform.renders[2].rows.is_empty());
}

#[test]
fn activate_launches_selection_and_ends_session() {
    let mut session = session();
    let spawner = RecordingSpawner::default();
    let mut platform = ScriptedPlatform::new(vec![
        key(Command::InsertText("term".to_string())),
        key(Command::Activate),
    ]);
    let mut scheduler = Scheduler::new(Duration::from_millis(1), Duration::from_millis(500));

    let outcome = scheduler.run(&mut session, &mut platform, &spawner).unwrap();

    match outcome {
        RunOutcome::Launched(app) => assert_eq!(app.id, "fixture-terminal"),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(session.counts().get("fixture-terminal"), 1);
    assert_eq!(spawner.spawned(), vec![vec!["gnome-terminal".to_string()]]);
}

#[test]
fn focus_loss_cancels() {
    let mut session = session();
    let mut platform = ScriptedPlatform::new(vec![
        key(Command::InsertText("f".to_string())),
        Some(PlatformEvent::FocusLost),
        key(Command::Activate),
    ]);
    let mut scheduler = Scheduler::new(Duration::from_millis(1), Duration::from_millis(500));

    let outcome = scheduler
        .run(&mut session, &mut platform, &RecordingSpawner::default())
        .unwrap();

    assert_eq!(outcome, RunOutcome::Cancelled);
    assert!(session.counts().snapshot().is_empty());
}

#[test]
fn blink_toggles_while_idle() {
    let mut session = session();
    let mut script: Vec<Option<PlatformEvent>> = (0..40).map(|_| None).collect();
    script.push(key(Command::Cancel));
    let mut platform = ScriptedPlatform::new(script);
    let mut scheduler = Scheduler::new(Duration::from_millis(5), Duration::from_millis(100));

    scheduler
        .run(&mut session, &mut platform, &RecordingSpawner::default())
        .unwrap();

    assert!(!platform.cursor_toggles.is_empty());
    assert!(!platform.cursor_toggles[0]);
    assert!(platform
        .cursor_toggles
        .windows(2)
        .all(|pair| pair[0] != pair[1]));
    assert_eq!(platform.renders.len(), 1);
}
