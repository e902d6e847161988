use std::io;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use crate::chunk::{self, Chunk};
use crate::clipboard::Clipboard;
use crate::config::Config;
use crate::dataset::PackedDataset;
use crate::editor;
use crate::fileio::FileIO;
use crate::gridview::GridView;
use crate::history::History;
use crate::keymap::{CommandTable, SequenceAction, SequenceResult};
use crate::mode::Mode;
use crate::selection::Selection;
use crate::ui;
use crate::util::fmt_value;

pub struct App {
    pub dataset: PackedDataset,
    pub view: GridView,
    pub clipboard: Clipboard,
    pub history: History,
    pub mode: Mode,
    pub file_io: FileIO,
    pub config: Config,
    pub dirty: bool,
    pub message: Option<String>,
    pub should_quit: bool,
    pub edit_buffer: String,
    pub command_buffer: String,
    command_table: CommandTable,
    pending_keys: Vec<char>,
}

impl App {
    pub fn new(dataset: PackedDataset, file_io: FileIO, config: Config) -> Self {
        let mut view = GridView::new();
        view.recompute_widths(&dataset, config.precision);
        let max_cells = config.max_cells;
        let undo_depth = config.undo_depth;
        Self {
            dataset,
            view,
            clipboard: Clipboard::new(max_cells),
            history: History::new(undo_depth),
            mode: Mode::Normal,
            file_io,
            config,
            dirty: false,
            message: None,
            should_quit: false,
            edit_buffer: String::new(),
            command_buffer: String::new(),
            command_table: CommandTable::default(),
            pending_keys: Vec::new(),
        }
    }

    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
        while !self.should_quit {
            let size = terminal.size()?;
            self.view.fit_viewport(size.width, size.height, &self.dataset);
            terminal.draw(|f| ui::render(f, self))?;

            if poll(Duration::from_millis(100))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != event::KeyEventKind::Press {
                        continue;
                    }
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            Mode::Normal | Mode::Visual | Mode::VisualRow | Mode::VisualCol => {
                self.handle_grid_key(key)
            }
            Mode::Insert => self.handle_insert_key(key),
            Mode::Command => self.handle_command_key(key),
        }
    }

    // === Edit plumbing ===

    /// The selection the current mode and cursor describe.
    fn current_selection(&self) -> Selection {
        self.view.selection(self.mode, &self.dataset)
    }

    /// Install an edited dataset: snapshot the old one for undo, clamp the
    /// cursor, and refresh column widths.
    fn apply_edit(&mut self, result: Result<PackedDataset, crate::error::EditError>) {
        match result {
            Ok(next) => {
                let before = std::mem::replace(&mut self.dataset, next);
                self.history.record(before);
                self.dirty = true;
                self.view.clamp_cursor(&self.dataset);
                self.view.scroll_to_cursor();
                self.view
                    .recompute_widths(&self.dataset, self.config.precision);
            }
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    fn yank_selection(&mut self, selection: Selection) {
        match chunk::extract(&self.dataset, selection) {
            Ok(chunk) => {
                let rows = chunk.row_count();
                self.clipboard.yank(chunk);
                self.message = Some(format!("Yanked {} row(s)", rows));
            }
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    fn delete_selection(&mut self, selection: Selection) {
        // Cut semantics: the removed region lands in the register.
        if let Ok(chunk) = chunk::extract(&self.dataset, selection) {
            self.clipboard.yank(chunk);
        }
        self.apply_edit(editor::remove(&self.dataset, selection));
        self.mode = Mode::Normal;
    }

    fn paste(&mut self, replace: bool) {
        let Some(chunk) = self.clipboard.chunk().cloned() else {
            self.message = Some("Nothing to paste".to_string());
            return;
        };
        let selection = self.current_selection();
        self.apply_edit(editor::insert(&self.dataset, selection, &chunk, replace));
        self.mode = Mode::Normal;
    }

    fn paste_chunk(&mut self, chunk: &Chunk, replace: bool) {
        let selection = self.current_selection();
        self.apply_edit(editor::insert(&self.dataset, selection, chunk, replace));
        self.mode = Mode::Normal;
    }

    fn add_row_or_col(&mut self, is_column: bool, is_append: bool) {
        let selection = Some(self.current_selection());
        self.apply_edit(editor::insert_new_row_or_col(
            &self.dataset,
            is_column,
            is_append,
            selection,
        ));
        self.mode = Mode::Normal;
    }

    fn undo(&mut self) {
        let current = self.dataset.clone();
        match self.history.undo(current) {
            Some(previous) => {
                self.dataset = previous;
                self.dirty = true;
                self.view.clamp_cursor(&self.dataset);
                self.view
                    .recompute_widths(&self.dataset, self.config.precision);
            }
            None => self.message = Some("Nothing to undo".to_string()),
        }
    }

    fn redo(&mut self) {
        let current = self.dataset.clone();
        match self.history.redo(current) {
            Some(next) => {
                self.dataset = next;
                self.dirty = true;
                self.view.clamp_cursor(&self.dataset);
                self.view
                    .recompute_widths(&self.dataset, self.config.precision);
            }
            None => self.message = Some("Nothing to redo".to_string()),
        }
    }

    // === Normal / visual mode ===

    fn handle_grid_key(&mut self, key: KeyEvent) {
        self.message = None;

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            self.pending_keys.clear();
            match key.code {
                KeyCode::Char('r') => self.redo(),
                KeyCode::Char('v') => self.enter_visual(Mode::VisualCol),
                _ => {}
            }
            return;
        }

        // With a visual selection active, y and d act on it immediately
        // instead of starting a two-key sequence.
        if self.mode.is_visual() && self.pending_keys.is_empty() {
            match key.code {
                KeyCode::Char('y') => {
                    let sel = self.current_selection();
                    self.yank_selection(sel);
                    self.mode = Mode::Normal;
                    return;
                }
                KeyCode::Char('d') => {
                    let sel = self.current_selection();
                    self.delete_selection(sel);
                    return;
                }
                _ => {}
            }
        }

        // Two-key sequences (gg, dd, yr, ...) run through the command table
        // first; anything it rejects falls to the single-key bindings.
        if let KeyCode::Char(c) = key.code {
            self.pending_keys.push(c);
            match self.command_table.lookup(&self.pending_keys) {
                SequenceResult::Action(action) => {
                    self.pending_keys.clear();
                    self.run_sequence_action(action);
                    return;
                }
                SequenceResult::Pending => return,
                SequenceResult::Fallthrough => {
                    self.pending_keys.clear();
                }
            }
        } else {
            self.pending_keys.clear();
        }

        match key.code {
            KeyCode::Char('h') | KeyCode::Left => self.view.move_left(),
            KeyCode::Char('j') | KeyCode::Down => self.view.move_down(&self.dataset),
            KeyCode::Char('k') | KeyCode::Up => self.view.move_up(),
            KeyCode::Char('l') | KeyCode::Right => self.view.move_right(&self.dataset),
            KeyCode::Char('G') => self.view.move_to_bottom(&self.dataset),
            KeyCode::Char('0') | KeyCode::Home => self.view.move_to_row_start(),
            KeyCode::Char('$') | KeyCode::End => self.view.move_to_row_end(&self.dataset),

            KeyCode::Char('v') => self.enter_visual(Mode::Visual),
            KeyCode::Char('V') => self.enter_visual(Mode::VisualRow),
            KeyCode::Esc => {
                self.mode = Mode::Normal;
            }

            KeyCode::Char('x') => {
                let sel = self.current_selection();
                self.delete_selection(sel);
            }
            KeyCode::Char('p') => self.paste(false),
            KeyCode::Char('P') => self.paste(true),

            KeyCode::Char('o') => {
                // Open a row below the cursor; at the last row this is an append.
                let at_end = self.view.cursor_row + 1 >= self.dataset.length();
                if !at_end {
                    self.view.cursor_row += 1;
                }
                self.add_row_or_col(false, at_end);
                if at_end && self.dataset.length() > 0 {
                    self.view.cursor_row = self.dataset.length() - 1;
                    self.view.scroll_to_cursor();
                }
            }
            KeyCode::Char('O') => self.add_row_or_col(false, false),
            KeyCode::Char('I') => self.add_row_or_col(true, false),
            KeyCode::Char('A') => self.add_row_or_col(true, true),

            KeyCode::Char('u') => self.undo(),

            KeyCode::Char('i') | KeyCode::Enter => self.enter_insert(),

            KeyCode::Char('Y') => match self.clipboard.to_system() {
                Ok(msg) | Err(msg) => self.message = Some(msg),
            },
            KeyCode::Char('R') => match self.clipboard.from_system() {
                Ok(msg) => {
                    self.message = Some(msg);
                    if let Some(chunk) = self.clipboard.chunk().cloned() {
                        self.paste_chunk(&chunk, false);
                    }
                }
                Err(msg) => self.message = Some(msg),
            },

            KeyCode::Char(':') => {
                self.command_buffer.clear();
                self.mode = Mode::Command;
            }
            _ => {}
        }
    }

    fn run_sequence_action(&mut self, action: SequenceAction) {
        match action {
            SequenceAction::MoveToTop => self.view.move_to_top(),
            SequenceAction::Delete => {
                let sel = self.current_selection();
                self.delete_selection(sel);
            }
            SequenceAction::DeleteRow => {
                let sel = self.row_selection();
                self.delete_selection(sel);
            }
            SequenceAction::DeleteCol => {
                let sel = self.col_selection();
                self.delete_selection(sel);
            }
            SequenceAction::Yank => {
                let sel = self.current_selection();
                self.yank_selection(sel);
                self.mode = Mode::Normal;
            }
            SequenceAction::YankRow => {
                let sel = self.row_selection();
                self.yank_selection(sel);
            }
            SequenceAction::YankCol => {
                let sel = self.col_selection();
                self.yank_selection(sel);
            }
        }
    }

    fn row_selection(&self) -> Selection {
        Selection::new(self.view.cursor_row, 1, 0, self.dataset.breadth().max(1))
    }

    fn col_selection(&self) -> Selection {
        Selection::new(0, self.dataset.length().max(1), self.view.cursor_col, 1)
    }

    fn enter_visual(&mut self, mode: Mode) {
        if self.mode == mode {
            self.mode = Mode::Normal;
            return;
        }
        self.view.set_support();
        self.mode = mode;
    }

    // === Insert mode ===

    fn enter_insert(&mut self) {
        if self.dataset.is_empty() {
            self.message = Some("Dataset is empty; paste or open a row first".to_string());
            return;
        }
        self.edit_buffer = self
            .dataset
            .get(self.view.cursor_row, self.view.cursor_col)
            .map(|v| fmt_value(v, self.config.precision))
            .unwrap_or_default();
        self.mode = Mode::Insert;
    }

    fn handle_insert_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.edit_buffer.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => self.commit_insert(),
            KeyCode::Backspace => {
                self.edit_buffer.pop();
            }
            KeyCode::Char(c) => self.edit_buffer.push(c),
            _ => {}
        }
    }

    fn commit_insert(&mut self) {
        let text = self.edit_buffer.trim();
        let value = if text.eq_ignore_ascii_case("nan") {
            Ok(f32::NAN)
        } else {
            text.parse::<f32>()
        };
        match value {
            Ok(value) => {
                let before = self.dataset.clone();
                if self
                    .dataset
                    .set_cell(self.view.cursor_row, self.view.cursor_col, value)
                {
                    self.history.record(before);
                    self.dirty = true;
                    self.view
                        .recompute_widths(&self.dataset, self.config.precision);
                }
                self.edit_buffer.clear();
                self.mode = Mode::Normal;
            }
            Err(_) => {
                self.message = Some(format!("Not a number: '{}'", text));
            }
        }
    }

    // === Command mode ===

    fn handle_command_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.command_buffer.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                let cmd = std::mem::take(&mut self.command_buffer);
                self.mode = Mode::Normal;
                self.execute_command(cmd.trim());
            }
            KeyCode::Backspace => {
                if self.command_buffer.pop().is_none() {
                    self.mode = Mode::Normal;
                }
            }
            KeyCode::Char(c) => self.command_buffer.push(c),
            _ => {}
        }
    }

    fn execute_command(&mut self, cmd: &str) {
        match cmd {
            "w" => self.save(),
            "q" => {
                if self.dirty {
                    self.message =
                        Some("Unsaved changes (use :q! to discard, :wq to save)".to_string());
                } else {
                    self.should_quit = true;
                }
            }
            "q!" => self.should_quit = true,
            "wq" | "x" => {
                self.save();
                if !self.dirty {
                    self.should_quit = true;
                }
            }
            "" => {}
            other => self.message = Some(format!("Unknown command: '{}'", other)),
        }
    }

    fn save(&mut self) {
        match self.file_io.write(&self.dataset) {
            Ok(()) => {
                self.dirty = false;
                info!(file = %self.file_io.file_name(), "saved");
                self.message = Some(format!("Wrote {}", self.file_io.file_name()));
            }
            Err(err) => self.message = Some(format!("Write failed: {}", err)),
        }
    }
}
