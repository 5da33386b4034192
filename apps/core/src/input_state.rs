/// Discrete edit and navigation commands produced by the platform layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    MoveHome,
    MoveEnd,
    /// Removes one character before the cursor, or everything before it when `to_start`.
    DeleteBackward { to_start: bool },
    /// Removes one character after the cursor, or everything after it when `to_end`.
    DeleteForward { to_end: bool },
    InsertText(String),
    NavigateUp,
    NavigateDown,
    Activate,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    CursorMoved,
    QueryChanged,
    SelectionMoved,
    Activate(usize),
    Cancel,
}

/// Live query text, byte-offset cursor (always on a char boundary) and selected result row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    query: String,
    cursor: usize,
    selected: usize,
}

impl InputState {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn query_lower(&self) -> String {
        self.query.to_lowercase()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn apply(&mut self, command: &Command, result_count: usize) -> Transition {
        match command {
            Command::MoveLeft => match self.prev_boundary() {
                Some(prev) => self.move_cursor(prev),
                None => Transition::Unchanged,
            },
            Command::MoveRight => match self.next_boundary() {
                Some(next) => self.move_cursor(next),
                None => Transition::Unchanged,
            },
            Command::MoveHome => self.move_cursor(0),
            Command::MoveEnd => self.move_cursor(self.query.len()),
            Command::DeleteBackward { to_start } => {
                let start = if *to_start {
                    Some(0).filter(|_| self.cursor > 0)
                } else {
                    self.prev_boundary()
                };
                match start {
                    Some(start) => {
                        self.query.replace_range(start..self.cursor, "");
                        self.cursor = start;
                        Transition::QueryChanged
                    }
                    None => Transition::Unchanged,
                }
            }
            Command::DeleteForward { to_end } => {
                let end = if *to_end {
                    Some(self.query.len()).filter(|_| self.cursor < self.query.len())
                } else {
                    self.next_boundary()
                };
                match end {
                    Some(end) => {
                        self.query.replace_range(self.cursor..end, "");
                        Transition::QueryChanged
                    }
                    None => Transition::Unchanged,
                }
            }
            Command::InsertText(text) => {
                if text.is_empty() {
                    return Transition::Unchanged;
                }
                self.query.insert_str(self.cursor, text);
                self.cursor += text.len();
                Transition::QueryChanged
            }
            Command::NavigateUp => {
                if result_count == 0 {
                    return Transition::Unchanged;
                }
                self.selected = if self.selected == 0 {
                    result_count - 1
                } else {
                    (self.selected - 1).min(result_count - 1)
                };
                Transition::SelectionMoved
            }
            Command::NavigateDown => {
                if result_count == 0 {
                    return Transition::Unchanged;
                }
                self.selected = if self.selected + 1 >= result_count {
                    0
                } else {
                    self.selected + 1
                };
                Transition::SelectionMoved
            }
            Command::Activate => {
                if result_count == 0 {
                    Transition::Unchanged
                } else {
                    Transition::Activate(self.selected.min(result_count - 1))
                }
            }
            Command::Cancel => Transition::Cancel,
        }
    }

    /// Called after every re-rank; an out-of-range selection goes back to the first row.
    pub fn clamp_selection(&mut self, result_count: usize) {
        if self.selected >= result_count {
            self.selected = 0;
        }
    }

    fn move_cursor(&mut self, to: usize) -> Transition {
        if to == self.cursor {
            return Transition::Unchanged;
        }
        self.cursor = to;
        Transition::CursorMoved
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.query[..self.cursor]
            .chars()
            .next_back()
            .map(|ch| self.cursor - ch.len_utf8())
    }

    fn next_boundary(&self) -> Option<usize> {
        self.query[self.cursor..]
            .chars()
            .next()
            .map(|ch| self.cursor + ch.len_utf8())
    }
}
