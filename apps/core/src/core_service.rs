use std::sync::Arc;

use log::debug;

use crate::action_executor::{self, LaunchError, Spawner};
use crate::discovery::CatalogSlot;
use crate::input_state::{Command, InputState, Transition};
use crate::launch_counts::LaunchCountStore;
use crate::model::Application;
use crate::search::{find_highlight_span, rank, RankedApp, Span};

/// Side effects requested by a command; the scheduler is the only place that performs them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Render,
    Launch(Arc<Application>),
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub name: String,
    pub comment: String,
    pub name_highlight: Option<Span>,
    pub comment_highlight: Option<Span>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub query: String,
    pub cursor: usize,
    pub rows: Vec<ResultRow>,
}

/// All mutable launcher state for one interactive run.
pub struct Session {
    catalog: CatalogSlot,
    counts: LaunchCountStore,
    input: InputState,
    results: Vec<RankedApp>,
}

impl Session {
    pub fn new(catalog: impl Into<CatalogSlot>, counts: LaunchCountStore) -> Self {
        Self {
            catalog: catalog.into(),
            counts,
            input: InputState::default(),
            results: Vec::new(),
        }
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn results(&self) -> &[RankedApp] {
        &self.results
    }

    pub fn counts(&self) -> &LaunchCountStore {
        &self.counts
    }

    pub fn catalog_ready(&self) -> bool {
        self.catalog.is_ready()
    }

    pub fn apply(&mut self, command: &Command) -> Vec<Effect> {
        match self.input.apply(command, self.results.len()) {
            Transition::Unchanged => Vec::new(),
            Transition::CursorMoved | Transition::SelectionMoved => vec![Effect::Render],
            Transition::QueryChanged => {
                self.refresh();
                vec![Effect::Render]
            }
            Transition::Activate(index) => self
                .results
                .get(index)
                .map(|selected| vec![Effect::Launch(Arc::clone(&selected.application))])
                .unwrap_or_default(),
            Transition::Cancel => vec![Effect::Exit],
        }
    }

    /// Ranks `query` against the catalog, waiting for the background load if needed.
    pub fn search_now(&mut self, query: &str) -> Vec<RankedApp> {
        let query_lower = query.to_lowercase();
        if query_lower.is_empty() {
            return Vec::new();
        }
        let catalog = self.catalog.get();
        rank(&query_lower, catalog.apps(), &self.counts)
    }

    pub fn launch(&mut self, app: &Application, spawner: &dyn Spawner) -> Result<(), LaunchError> {
        action_executor::launch(app, &mut self.counts, spawner)
    }

    pub fn view(&self) -> View {
        let query_lower = self.input.query_lower();
        let rows = self
            .results
            .iter()
            .enumerate()
            .map(|(index, ranked)| ResultRow {
                name: ranked.application.name.clone(),
                comment: ranked.application.comment.clone(),
                name_highlight: find_highlight_span(&ranked.application.name, &query_lower),
                comment_highlight: find_highlight_span(&ranked.application.comment, &query_lower),
                selected: index == self.input.selected(),
            })
            .collect();

        View {
            query: self.input.query().to_string(),
            cursor: self.input.cursor(),
            rows,
        }
    }

    fn refresh(&mut self) {
        let query = self.input.query().to_string();
        self.results = self.search_now(&query);
        self.input.clamp_selection(self.results.len());
        debug!("query={query:?} results={}", self.results.len());
    }
}

#[cfg(test)]
mod tests {
    use super::{Effect, Session};
    use crate::discovery::{Catalog, CatalogSource, FixtureSource};
    use crate::input_state::Command;
    use crate::launch_counts::LaunchCountStore;

    fn fixture_session() -> Session {
        let records = FixtureSource::deterministic_fixture().discover().unwrap();
        Session::new(Catalog::from_raw(records), LaunchCountStore::in_memory())
    }

    #[test]
    fn typing_reranks_and_requests_render() {
        let mut session = fixture_session();
        let effects = session.apply(&Command::InsertText("term".to_string()));

        assert_eq!(effects, vec![Effect::Render]);
        assert_eq!(session.results()[0].application.id, "fixture-terminal");
    }

    #[test]
    fn clearing_query_empties_results() {
        let mut session = fixture_session();
        session.apply(&Command::InsertText("f".to_string()));
        assert!(!session.results().is_empty());

        session.apply(&Command::DeleteBackward { to_start: false });
        assert!(session.results().is_empty());
        assert!(session.view().rows.is_empty());
    }

    #[test]
    fn activate_emits_selected_application() {
        let mut session = fixture_session();
        session.apply(&Command::InsertText("fi".to_string()));
        session.apply(&Command::NavigateDown);

        let expected = session.results()[1].application.id.clone();
        match session.apply(&Command::Activate).as_slice() {
            [Effect::Launch(app)] => assert_eq!(app.id, expected),
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn selection_resets_when_results_shrink() {
        let mut session = fixture_session();
        session.apply(&Command::InsertText("e".to_string()));
        assert!(session.results().len() > 1);
        session.apply(&Command::NavigateUp);
        assert!(session.input().selected() > 0);

        session.apply(&Command::InsertText("rminal".to_string()));
        assert_eq!(session.results().len(), 1);
        assert_eq!(session.input().selected(), 0);
    }

    #[test]
    fn cancel_requests_exit() {
        let mut session = fixture_session();
        assert_eq!(session.apply(&Command::Cancel), vec![Effect::Exit]);
    }

    #[test]
    fn view_marks_selected_row_and_highlights() {
        let mut session = fixture_session();
        session.apply(&Command::InsertText("FI".to_string()));
        let view = session.view();

        assert_eq!(view.query, "FI");
        assert_eq!(view.cursor, 2);
        assert!(view.rows[0].selected);
        assert!(view.rows[1..].iter().all(|row| !row.selected));
        let span = view.rows[0].name_highlight.expect("name should highlight");
        assert_eq!(&view.rows[0].name[span.start..span.end()], "Fi");
    }
}
