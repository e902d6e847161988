use crate::error::{EditError, EditResult};
use crate::format::DataFormat;

/// Maximum length of a dataset id.
pub const MAX_ID_LEN: usize = 16;

/// A numeric dataset packed into a single flat array of `f32`.
///
/// Rectangular formats store `length * breadth` values row-major. The
/// jagged raster format stores one length entry per row (as a float)
/// followed by the concatenation of every row's samples; its `breadth`
/// field is only the longest raster length, kept for display.
///
/// The dataset is immutable except through [`set_cell`](Self::set_cell)
/// (deliberate in-place single-value writes) and the structural operations
/// in [`crate::editor`], which replace the whole value.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedDataset {
    id: String,
    format: DataFormat,
    params: Vec<f32>,
    raw: Vec<f32>,
    length: usize,
    breadth: usize,
}

fn validate_id(id: &str) -> EditResult<()> {
    let ok = !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if ok {
        Ok(())
    } else {
        Err(EditError::InvalidId(id.to_string()))
    }
}

impl PackedDataset {
    /// Build a dataset, validating every shape invariant.
    ///
    /// For jagged data the length-prefix entries must be non-negative
    /// integral floats whose sum accounts for the rest of `raw`; the
    /// display breadth is recomputed from them, so `breadth` is ignored.
    pub fn create(
        id: impl Into<String>,
        format: DataFormat,
        params: Vec<f32>,
        length: usize,
        breadth: usize,
        raw: Vec<f32>,
    ) -> EditResult<Self> {
        let id = id.into();
        validate_id(&id)?;

        if params.len() != format.param_count() {
            return Err(EditError::SizeMismatch {
                expected: format.param_count(),
                got: params.len(),
            });
        }

        if format.is_jagged() {
            if raw.len() < length {
                return Err(EditError::SizeMismatch {
                    expected: length,
                    got: raw.len(),
                });
            }
            let mut total = 0usize;
            let mut max_len = 0usize;
            for row in 0..length {
                let v = raw[row];
                if !v.is_finite() || v < 0.0 || v.fract() != 0.0 || v > u32::MAX as f32 {
                    return Err(EditError::BadRowLength { row });
                }
                let n = v as usize;
                total += n;
                max_len = max_len.max(n);
            }
            if raw.len() != length + total {
                return Err(EditError::SizeMismatch {
                    expected: length + total,
                    got: raw.len(),
                });
            }
            Ok(Self {
                id,
                format,
                params,
                raw,
                length,
                breadth: max_len,
            })
        } else {
            if !format.accepts_breadth(breadth) {
                let d = format.descriptor();
                return Err(EditError::ShapeViolation {
                    format,
                    breadth,
                    min: d.min_breadth,
                    max: d.max_breadth,
                });
            }
            if raw.len() != length * breadth {
                return Err(EditError::SizeMismatch {
                    expected: length * breadth,
                    got: raw.len(),
                });
            }
            Ok(Self {
                id,
                format,
                params,
                raw,
                length,
                breadth,
            })
        }
    }

    /// An empty dataset: no rows, zeroed params, minimal legal breadth.
    pub fn empty(id: impl Into<String>, format: DataFormat) -> EditResult<Self> {
        let breadth = if format.is_jagged() {
            0
        } else {
            format.descriptor().min_breadth
        };
        Self::create(
            id,
            format,
            vec![0.0; format.param_count()],
            0,
            breadth,
            Vec::new(),
        )
    }

    // === Accessors ===

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn format(&self) -> DataFormat {
        self.format
    }

    pub fn params(&self) -> &[f32] {
        &self.params
    }

    pub fn raw(&self) -> &[f32] {
        &self.raw
    }

    /// Logical row count (tuple count, or raster count for jagged data).
    pub fn length(&self) -> usize {
        self.length
    }

    /// Logical column count (longest raster length for jagged data).
    pub fn breadth(&self) -> usize {
        self.breadth
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Number of real samples in `row` (excluding display padding).
    pub fn row_len(&self, row: usize) -> usize {
        if row >= self.length {
            return 0;
        }
        if self.format.is_jagged() {
            self.raw[row] as usize
        } else {
            self.breadth
        }
    }

    /// Offset of `row`'s first sample within the raw buffer.
    #[inline]
    fn sample_offset(&self, row: usize) -> usize {
        if self.format.is_jagged() {
            self.length + self.raw[..row].iter().map(|&v| v as usize).sum::<usize>()
        } else {
            row * self.breadth
        }
    }

    /// The real samples of `row` as a slice (no padding).
    pub fn row_slice(&self, row: usize) -> &[f32] {
        let n = self.row_len(row);
        let off = self.sample_offset(row);
        &self.raw[off..off + n]
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.length || col >= self.row_len(row) {
            return None;
        }
        Some(self.raw[self.sample_offset(row) + col])
    }

    /// Write a single value in place, sharing the existing buffer.
    ///
    /// This is the one mutation that does not replace the dataset; it keeps
    /// single-datum edits on large sets allocation-free. Returns whether
    /// anything changed: writes to nonexistent cells (out of range, or past
    /// a raster's real length) and writes of the value already present
    /// report `false` so the caller can skip notification.
    pub fn set_cell(&mut self, row: usize, col: usize, value: f32) -> bool {
        if row >= self.length || col >= self.row_len(row) {
            return false;
        }
        let idx = self.sample_offset(row) + col;
        // Bitwise compare so overwriting NaN with NaN counts as a no-op.
        if self.raw[idx].to_bits() == value.to_bits() {
            return false;
        }
        self.raw[idx] = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn points(rows: &[[f32; 2]]) -> PackedDataset {
        let raw: Vec<f32> = rows.iter().flatten().copied().collect();
        PackedDataset::create("pts", DataFormat::Points, vec![], rows.len(), 2, raw).unwrap()
    }

    pub fn raster(rows: &[&[f32]]) -> PackedDataset {
        let mut raw: Vec<f32> = rows.iter().map(|r| r.len() as f32).collect();
        for r in rows {
            raw.extend_from_slice(r);
        }
        PackedDataset::create("ras", DataFormat::Raster, vec![0.0, 1.0], rows.len(), 0, raw)
            .unwrap()
    }

    #[test]
    fn test_create_rect() {
        let ds = points(&[[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(ds.length(), 2);
        assert_eq!(ds.breadth(), 2);
        assert_eq!(ds.get(1, 0), Some(3.0));
        assert_eq!(ds.get(1, 2), None);
        assert_eq!(ds.get(2, 0), None);
    }

    #[test]
    fn test_create_rect_size_mismatch() {
        let err = PackedDataset::create(
            "pts",
            DataFormat::Points,
            vec![],
            2,
            2,
            vec![1.0, 2.0, 3.0],
        )
        .unwrap_err();
        assert_eq!(err, EditError::SizeMismatch { expected: 4, got: 3 });
    }

    #[test]
    fn test_create_rect_breadth_violation() {
        let err =
            PackedDataset::create("pts", DataFormat::Points, vec![], 2, 1, vec![1.0, 2.0])
                .unwrap_err();
        assert!(matches!(err, EditError::ShapeViolation { breadth: 1, .. }));
    }

    #[test]
    fn test_create_jagged() {
        let ds = raster(&[&[1.0], &[2.0, 3.0]]);
        assert_eq!(ds.length(), 2);
        assert_eq!(ds.breadth(), 2); // longest raster
        assert_eq!(ds.row_len(0), 1);
        assert_eq!(ds.row_len(1), 2);
        assert_eq!(ds.get(0, 0), Some(1.0));
        assert_eq!(ds.get(0, 1), None); // padding cell
        assert_eq!(ds.get(1, 1), Some(3.0));
    }

    #[test]
    fn test_create_jagged_inconsistent_prefix() {
        // Prefix claims 3 samples but only 2 follow.
        let err = PackedDataset::create(
            "ras",
            DataFormat::Raster,
            vec![0.0, 1.0],
            1,
            0,
            vec![3.0, 1.0, 2.0],
        )
        .unwrap_err();
        assert_eq!(err, EditError::SizeMismatch { expected: 4, got: 3 });

        let err = PackedDataset::create(
            "ras",
            DataFormat::Raster,
            vec![0.0, 1.0],
            1,
            0,
            vec![-1.0],
        )
        .unwrap_err();
        assert_eq!(err, EditError::BadRowLength { row: 0 });
    }

    #[test]
    fn test_create_bad_id() {
        for id in ["", "has space", "way_too_long_for_an_id"] {
            let err =
                PackedDataset::create(id, DataFormat::Points, vec![], 0, 2, vec![]).unwrap_err();
            assert_eq!(err, EditError::InvalidId(id.to_string()));
        }
    }

    #[test]
    fn test_create_bad_param_count() {
        let err =
            PackedDataset::create("s", DataFormat::Series, vec![0.0], 0, 1, vec![]).unwrap_err();
        assert_eq!(err, EditError::SizeMismatch { expected: 2, got: 1 });
    }

    #[test]
    fn test_set_cell_rect() {
        let mut ds = points(&[[1.0, 2.0], [3.0, 4.0]]);
        assert!(ds.set_cell(0, 1, 9.0));
        assert_eq!(ds.get(0, 1), Some(9.0));
        // same value again: no change reported
        assert!(!ds.set_cell(0, 1, 9.0));
        // out of bounds: no change, no panic
        assert!(!ds.set_cell(5, 0, 1.0));
        assert!(!ds.set_cell(0, 5, 1.0));
    }

    #[test]
    fn test_set_cell_nan_over_nan_is_noop() {
        let mut ds = points(&[[f32::NAN, 2.0]]);
        assert!(!ds.set_cell(0, 0, f32::NAN));
        assert!(ds.set_cell(0, 1, f32::NAN));
    }

    #[test]
    fn test_set_cell_jagged_padding_cell() {
        let mut ds = raster(&[&[1.0], &[2.0, 3.0]]);
        // col 1 of row 0 is display padding, not a real cell
        assert!(!ds.set_cell(0, 1, 9.0));
        assert!(ds.set_cell(1, 1, 9.0));
        assert_eq!(ds.get(1, 1), Some(9.0));
    }

    #[test]
    fn test_row_slice() {
        let ds = raster(&[&[1.0], &[2.0, 3.0]]);
        assert_eq!(ds.row_slice(0), &[1.0]);
        assert_eq!(ds.row_slice(1), &[2.0, 3.0]);

        let ds = points(&[[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(ds.row_slice(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_empty() {
        let ds = PackedDataset::empty("e", DataFormat::Points).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.breadth(), 2);
        let ds = PackedDataset::empty("e", DataFormat::Raster).unwrap();
        assert_eq!(ds.breadth(), 0);
    }
}
