/// A rectangular selection handed in by the table widget.
///
/// The core never owns live selection state; every structural operation
/// takes one of these by value, already resolved by the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub first_row: usize,
    pub row_count: usize,
    pub first_col: usize,
    pub col_count: usize,
}

impl Selection {
    pub fn new(first_row: usize, row_count: usize, first_col: usize, col_count: usize) -> Self {
        Self {
            first_row,
            row_count,
            first_col,
            col_count,
        }
    }

    /// Single-cell selection.
    pub fn cell(row: usize, col: usize) -> Self {
        Self::new(row, 1, col, 1)
    }

    /// Clip this selection to `[0, length) x [0, breadth)`.
    /// Returns `None` when nothing of it survives.
    pub fn clipped(&self, length: usize, breadth: usize) -> Option<Selection> {
        if self.first_row >= length || self.first_col >= breadth {
            return None;
        }
        let row_count = self.row_count.min(length - self.first_row);
        let col_count = self.col_count.min(breadth - self.first_col);
        if row_count == 0 || col_count == 0 {
            return None;
        }
        Some(Selection {
            first_row: self.first_row,
            row_count,
            first_col: self.first_col,
            col_count,
        })
    }

    /// Exclusive end row.
    #[inline]
    pub fn end_row(&self) -> usize {
        self.first_row + self.row_count
    }

    /// Exclusive end column.
    #[inline]
    pub fn end_col(&self) -> usize {
        self.first_col + self.col_count
    }

    #[inline]
    pub fn spans_all_rows(&self, length: usize) -> bool {
        self.first_row == 0 && self.row_count >= length
    }

    #[inline]
    pub fn spans_all_cols(&self, breadth: usize) -> bool {
        self.first_col == 0 && self.col_count >= breadth
    }

    #[inline]
    pub fn covers(&self, length: usize, breadth: usize) -> bool {
        self.spans_all_rows(length) && self.spans_all_cols(breadth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipped_inside() {
        let sel = Selection::new(1, 2, 0, 3);
        assert_eq!(sel.clipped(5, 4), Some(sel));
    }

    #[test]
    fn test_clipped_truncates() {
        let sel = Selection::new(2, 10, 1, 10);
        let clipped = sel.clipped(4, 3).unwrap();
        assert_eq!(clipped, Selection::new(2, 2, 1, 2));
    }

    #[test]
    fn test_clipped_out_of_range() {
        assert_eq!(Selection::new(5, 1, 0, 1).clipped(5, 3), None);
        assert_eq!(Selection::new(0, 0, 0, 1).clipped(5, 3), None);
        assert_eq!(Selection::new(0, 1, 3, 1).clipped(5, 3), None);
    }

    #[test]
    fn test_span_predicates() {
        let sel = Selection::new(0, 3, 1, 2);
        assert!(sel.spans_all_rows(3));
        assert!(!sel.spans_all_rows(4));
        assert!(!sel.spans_all_cols(3));
        assert!(Selection::new(0, 3, 0, 3).covers(3, 3));
    }
}
