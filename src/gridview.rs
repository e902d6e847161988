use std::cmp;

use rayon::prelude::*;

use crate::dataset::PackedDataset;
use crate::mode::Mode;
use crate::selection::Selection;
use crate::util::fmt_value;

/// Threshold for parallel width recomputation (rows * cols).
const PARALLEL_THRESHOLD: usize = 10_000;

const MIN_COL_WIDTH: usize = 3;
const MAX_COL_WIDTH: usize = 30;

/// View state for the dataset grid (cursor, visual anchor, viewport,
/// cached column widths). Selections handed to the editor are derived
/// from here; the core never sees this struct.
#[derive(Debug, Clone)]
pub struct GridView {
    pub cursor_row: usize,
    pub cursor_col: usize,

    // Anchor for visual mode
    pub support_row: usize,
    pub support_col: usize,

    // Viewport offset (top-left visible cell)
    pub viewport_row: usize,
    pub viewport_col: usize,

    // Visible area size (set from the terminal each frame)
    pub visible_rows: usize,
    pub visible_cols: usize,

    pub col_widths: Vec<usize>,
}

impl GridView {
    pub fn new() -> Self {
        Self {
            cursor_row: 0,
            cursor_col: 0,
            support_row: 0,
            support_col: 0,
            viewport_row: 0,
            viewport_col: 0,
            visible_rows: 20,
            visible_cols: 10,
            col_widths: Vec::new(),
        }
    }

    pub fn set_support(&mut self) {
        self.support_row = self.cursor_row;
        self.support_col = self.cursor_col;
    }

    /// The selection the current mode describes, as a value for the editor.
    /// Row-visual spans every column, column-visual every row; outside
    /// visual modes it is just the cursor cell.
    pub fn selection(&self, mode: Mode, dataset: &PackedDataset) -> Selection {
        if !mode.is_visual() {
            return Selection::cell(self.cursor_row, self.cursor_col);
        }
        let first_row = cmp::min(self.cursor_row, self.support_row);
        let last_row = cmp::max(self.cursor_row, self.support_row);
        let first_col = cmp::min(self.cursor_col, self.support_col);
        let last_col = cmp::max(self.cursor_col, self.support_col);

        match mode {
            Mode::VisualRow => Selection::new(
                first_row,
                last_row - first_row + 1,
                0,
                dataset.breadth().max(1),
            ),
            Mode::VisualCol => Selection::new(
                0,
                dataset.length().max(1),
                first_col,
                last_col - first_col + 1,
            ),
            _ => Selection::new(
                first_row,
                last_row - first_row + 1,
                first_col,
                last_col - first_col + 1,
            ),
        }
    }

    /// Whether a cell belongs to the active visual highlight.
    pub fn is_selected(&self, row: usize, col: usize, mode: Mode) -> bool {
        if !mode.is_visual() {
            return false;
        }
        let row_ok = mode == Mode::VisualCol
            || (cmp::min(self.cursor_row, self.support_row) <= row
                && row <= cmp::max(self.cursor_row, self.support_row));
        let col_ok = mode == Mode::VisualRow
            || (cmp::min(self.cursor_col, self.support_col) <= col
                && col <= cmp::max(self.cursor_col, self.support_col));
        row_ok && col_ok
    }

    /// Keep the cursor inside the dataset after a structural change.
    pub fn clamp_cursor(&mut self, dataset: &PackedDataset) {
        if dataset.length() > 0 {
            self.cursor_row = self.cursor_row.min(dataset.length() - 1);
        } else {
            self.cursor_row = 0;
        }
        if dataset.breadth() > 0 {
            self.cursor_col = self.cursor_col.min(dataset.breadth() - 1);
        } else {
            self.cursor_col = 0;
        }
        self.support_row = self.support_row.min(self.cursor_row);
        self.support_col = self.support_col.min(self.cursor_col);
    }

    /// Ensure the viewport contains the cursor.
    pub fn scroll_to_cursor(&mut self) {
        if self.cursor_row < self.viewport_row {
            self.viewport_row = self.cursor_row;
        } else if self.visible_rows > 0 && self.cursor_row >= self.viewport_row + self.visible_rows
        {
            self.viewport_row = self.cursor_row.saturating_sub(self.visible_rows - 1);
        }

        if self.cursor_col < self.viewport_col {
            self.viewport_col = self.cursor_col;
        } else if self.visible_cols > 0 && self.cursor_col >= self.viewport_col + self.visible_cols
        {
            self.viewport_col = self.cursor_col.saturating_sub(self.visible_cols - 1);
        }
    }

    // === Navigation ===

    pub fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
            self.scroll_to_cursor();
        }
    }

    pub fn move_right(&mut self, dataset: &PackedDataset) {
        if self.cursor_col + 1 < dataset.breadth() {
            self.cursor_col += 1;
            self.scroll_to_cursor();
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.scroll_to_cursor();
        }
    }

    pub fn move_down(&mut self, dataset: &PackedDataset) {
        if self.cursor_row + 1 < dataset.length() {
            self.cursor_row += 1;
            self.scroll_to_cursor();
        }
    }

    pub fn move_to_top(&mut self) {
        self.cursor_row = 0;
        self.scroll_to_cursor();
    }

    pub fn move_to_bottom(&mut self, dataset: &PackedDataset) {
        self.cursor_row = dataset.length().saturating_sub(1);
        self.scroll_to_cursor();
    }

    pub fn move_to_row_start(&mut self) {
        self.cursor_col = 0;
        self.scroll_to_cursor();
    }

    pub fn move_to_row_end(&mut self, dataset: &PackedDataset) {
        self.cursor_col = dataset.breadth().saturating_sub(1);
        self.scroll_to_cursor();
    }

    /// Size the viewport to the terminal: 5 lines of chrome (border, header,
    /// status, command line), and as many columns as fit after the row
    /// number gutter.
    pub fn fit_viewport(&mut self, width: u16, height: u16, dataset: &PackedDataset) {
        self.visible_rows = (height as usize).saturating_sub(5).max(1);

        let gutter = dataset.length().to_string().len().max(3) + 3;
        let mut used = gutter;
        let mut cols = 0;
        for w in self.col_widths.iter().skip(self.viewport_col) {
            used += w + 2;
            if used > width as usize {
                break;
            }
            cols += 1;
        }
        self.visible_cols = cols.max(1);
        self.scroll_to_cursor();
    }

    // === Column widths ===

    /// Recompute cached column widths from formatted tokens.
    /// Parallel over columns for large datasets.
    pub fn recompute_widths(&mut self, dataset: &PackedDataset, precision: Option<usize>) {
        let breadth = dataset.breadth();
        let size = dataset.length() * breadth;

        let width_of = |col: usize| {
            (0..dataset.length())
                .filter_map(|row| dataset.get(row, col))
                .map(|v| fmt_value(v, precision).len())
                .max()
                .unwrap_or(MIN_COL_WIDTH)
                .clamp(MIN_COL_WIDTH, MAX_COL_WIDTH)
        };

        self.col_widths = if size >= PARALLEL_THRESHOLD && breadth > 1 {
            (0..breadth).into_par_iter().map(width_of).collect()
        } else {
            (0..breadth).map(width_of).collect()
        };
    }
}

impl Default for GridView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DataFormat;

    fn points(rows: &[[f32; 2]]) -> PackedDataset {
        let raw: Vec<f32> = rows.iter().flatten().copied().collect();
        PackedDataset::create("pts", DataFormat::Points, vec![], rows.len(), 2, raw).unwrap()
    }

    #[test]
    fn test_selection_normal_is_cursor_cell() {
        let ds = points(&[[1.0, 2.0], [3.0, 4.0]]);
        let mut view = GridView::new();
        view.cursor_row = 1;
        view.cursor_col = 1;
        assert_eq!(view.selection(Mode::Normal, &ds), Selection::cell(1, 1));
    }

    #[test]
    fn test_selection_visual_block() {
        let ds = points(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        let mut view = GridView::new();
        view.cursor_row = 2;
        view.cursor_col = 0;
        view.support_row = 1;
        view.support_col = 1;
        assert_eq!(
            view.selection(Mode::Visual, &ds),
            Selection::new(1, 2, 0, 2)
        );
    }

    #[test]
    fn test_selection_visual_row_spans_cols() {
        let ds = points(&[[1.0, 2.0], [3.0, 4.0]]);
        let mut view = GridView::new();
        view.cursor_row = 1;
        view.support_row = 0;
        view.cursor_col = 1;
        let sel = view.selection(Mode::VisualRow, &ds);
        assert_eq!(sel, Selection::new(0, 2, 0, 2));
        assert!(sel.spans_all_cols(ds.breadth()));
    }

    #[test]
    fn test_selection_visual_col_spans_rows() {
        let ds = points(&[[1.0, 2.0], [3.0, 4.0]]);
        let mut view = GridView::new();
        view.cursor_col = 1;
        view.support_col = 1;
        let sel = view.selection(Mode::VisualCol, &ds);
        assert_eq!(sel, Selection::new(0, 2, 1, 1));
        assert!(sel.spans_all_rows(ds.length()));
    }

    #[test]
    fn test_clamp_cursor_after_shrink() {
        let ds = points(&[[1.0, 2.0]]);
        let mut view = GridView::new();
        view.cursor_row = 5;
        view.cursor_col = 5;
        view.clamp_cursor(&ds);
        assert_eq!((view.cursor_row, view.cursor_col), (0, 1));
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let mut view = GridView::new();
        view.visible_rows = 5;
        view.cursor_row = 12;
        view.scroll_to_cursor();
        assert_eq!(view.viewport_row, 8);
        view.cursor_row = 2;
        view.scroll_to_cursor();
        assert_eq!(view.viewport_row, 2);
    }

    #[test]
    fn test_recompute_widths() {
        let ds = points(&[[1.0, 123.456], [2.0, 4.0]]);
        let mut view = GridView::new();
        view.recompute_widths(&ds, None);
        assert_eq!(view.col_widths.len(), 2);
        assert_eq!(view.col_widths[0], 3); // min width
        assert_eq!(view.col_widths[1], "123.456".len());
    }
}
