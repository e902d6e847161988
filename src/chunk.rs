use crate::dataset::PackedDataset;
use crate::error::{EditError, EditResult};
use crate::selection::Selection;

/// A self-contained, detachable block of dataset content.
///
/// Chunks carry the shape tag of the format they were extracted from but
/// are otherwise format-agnostic: a chunk cut from a raster set can be
/// pasted into a rectangular one and vice versa, with reshaping handled by
/// the insert operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Chunk {
    /// `rows * cols` values, row-major.
    Rect {
        rows: usize,
        cols: usize,
        cells: Vec<f32>,
    },
    /// One length per raster, then every raster's samples concatenated.
    Jagged { lengths: Vec<u32>, samples: Vec<f32> },
}

impl Chunk {
    pub fn is_jagged(&self) -> bool {
        matches!(self, Chunk::Jagged { .. })
    }

    /// Number of logical rows (rasters) in the chunk.
    pub fn row_count(&self) -> usize {
        match self {
            Chunk::Rect { rows, .. } => *rows,
            Chunk::Jagged { lengths, .. } => lengths.len(),
        }
    }

    /// Length of the widest row.
    pub fn longest_row(&self) -> usize {
        match self {
            Chunk::Rect { cols, .. } => *cols,
            Chunk::Jagged { lengths, .. } => {
                lengths.iter().map(|&n| n as usize).max().unwrap_or(0)
            }
        }
    }

    /// Build a chunk from logical rows: rectangular when every row has the
    /// same length, jagged otherwise.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Chunk {
        let uniform = rows
            .first()
            .map(|first| rows.iter().all(|r| r.len() == first.len()))
            .unwrap_or(true);
        if uniform {
            let cols = rows.first().map(|r| r.len()).unwrap_or(0);
            Chunk::Rect {
                rows: rows.len(),
                cols,
                cells: rows.into_iter().flatten().collect(),
            }
        } else {
            let lengths: Vec<u32> = rows.iter().map(|r| r.len() as u32).collect();
            Chunk::Jagged {
                lengths,
                samples: rows.into_iter().flatten().collect(),
            }
        }
    }

    /// The chunk's content as logical rows at their natural lengths.
    pub fn to_rows(&self) -> Vec<Vec<f32>> {
        match self {
            Chunk::Rect { rows, cols, cells } => (0..*rows)
                .map(|r| cells[r * cols..(r + 1) * cols].to_vec())
                .collect(),
            Chunk::Jagged { lengths, samples } => {
                let mut out = Vec::with_capacity(lengths.len());
                let mut off = 0usize;
                for &n in lengths {
                    let n = n as usize;
                    out.push(samples[off..off + n].to_vec());
                    off += n;
                }
                out
            }
        }
    }

    // === Float wire layout, used for cross-format transfer ===
    //
    //   [0]    0 = rectangular, nonzero = jagged
    //   [1]    rect: row count      jagged: total sample count
    //   [2]    rect: column count   jagged: raster count
    //   [3..]  rect: row-major payload
    //          jagged: per-raster lengths, then all samples

    pub fn encode(&self) -> Vec<f32> {
        match self {
            Chunk::Rect { rows, cols, cells } => {
                let mut out = Vec::with_capacity(3 + cells.len());
                out.push(0.0);
                out.push(*rows as f32);
                out.push(*cols as f32);
                out.extend_from_slice(cells);
                out
            }
            Chunk::Jagged { lengths, samples } => {
                let mut out = Vec::with_capacity(3 + lengths.len() + samples.len());
                out.push(1.0);
                out.push(samples.len() as f32);
                out.push(lengths.len() as f32);
                out.extend(lengths.iter().map(|&n| n as f32));
                out.extend_from_slice(samples);
                out
            }
        }
    }

    pub fn decode(wire: &[f32]) -> EditResult<Chunk> {
        if wire.len() < 3 {
            return Err(EditError::SizeMismatch {
                expected: 3,
                got: wire.len(),
            });
        }
        let payload = &wire[3..];
        if wire[0] == 0.0 {
            let rows = wire[1] as usize;
            let cols = wire[2] as usize;
            if payload.len() != rows * cols {
                return Err(EditError::SizeMismatch {
                    expected: rows * cols,
                    got: payload.len(),
                });
            }
            Ok(Chunk::Rect {
                rows,
                cols,
                cells: payload.to_vec(),
            })
        } else {
            let total = wire[1] as usize;
            let rasters = wire[2] as usize;
            if payload.len() != rasters + total {
                return Err(EditError::SizeMismatch {
                    expected: rasters + total,
                    got: payload.len(),
                });
            }
            let lengths: Vec<u32> = payload[..rasters].iter().map(|&v| v as u32).collect();
            let declared: usize = lengths.iter().map(|&n| n as usize).sum();
            if declared != total {
                return Err(EditError::SizeMismatch {
                    expected: rasters + declared,
                    got: payload.len(),
                });
            }
            Ok(Chunk::Jagged {
                lengths,
                samples: payload[rasters..].to_vec(),
            })
        }
    }
}

/// Copy the selected region of a dataset out into a chunk.
///
/// Rectangular sources allow any contiguous block. Jagged sources only
/// allow whole rasters (full column span, any rows) or a sub-span of a
/// single raster; anything else has no well-defined reinsertion shape and
/// is reported as not copyable.
pub fn extract(dataset: &PackedDataset, selection: Selection) -> EditResult<Chunk> {
    let sel = selection
        .clipped(dataset.length(), dataset.breadth())
        .ok_or(EditError::UndefinedSelection)?;

    if !dataset.format().is_jagged() {
        let breadth = dataset.breadth();
        if sel.col_count == breadth {
            // Full row span: one contiguous run of the raw buffer.
            let cells = dataset.raw()[sel.first_row * breadth..sel.end_row() * breadth].to_vec();
            return Ok(Chunk::Rect {
                rows: sel.row_count,
                cols: breadth,
                cells,
            });
        }
        let mut cells = Vec::with_capacity(sel.row_count * sel.col_count);
        for row in sel.first_row..sel.end_row() {
            cells.extend_from_slice(&dataset.row_slice(row)[sel.first_col..sel.end_col()]);
        }
        return Ok(Chunk::Rect {
            rows: sel.row_count,
            cols: sel.col_count,
            cells,
        });
    }

    if sel.spans_all_cols(dataset.breadth()) {
        // Whole rasters.
        let mut lengths = Vec::with_capacity(sel.row_count);
        let mut samples = Vec::new();
        for row in sel.first_row..sel.end_row() {
            let slice = dataset.row_slice(row);
            lengths.push(slice.len() as u32);
            samples.extend_from_slice(slice);
        }
        return Ok(Chunk::Jagged { lengths, samples });
    }

    if sel.row_count == 1 {
        // Sub-span of one raster, truncated to its real length.
        let slice = dataset.row_slice(sel.first_row);
        if sel.first_col >= slice.len() {
            return Err(EditError::UndefinedSelection);
        }
        let end = sel.end_col().min(slice.len());
        let samples = slice[sel.first_col..end].to_vec();
        return Ok(Chunk::Jagged {
            lengths: vec![samples.len() as u32],
            samples,
        });
    }

    Err(EditError::UnsupportedShape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DataFormat;

    fn points(rows: &[[f32; 2]]) -> PackedDataset {
        let raw: Vec<f32> = rows.iter().flatten().copied().collect();
        PackedDataset::create("pts", DataFormat::Points, vec![], rows.len(), 2, raw).unwrap()
    }

    fn raster(rows: &[&[f32]]) -> PackedDataset {
        let mut raw: Vec<f32> = rows.iter().map(|r| r.len() as f32).collect();
        for r in rows {
            raw.extend_from_slice(r);
        }
        PackedDataset::create("ras", DataFormat::Raster, vec![0.0, 1.0], rows.len(), 0, raw)
            .unwrap()
    }

    #[test]
    fn test_extract_full_rows() {
        let ds = points(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        let chunk = extract(&ds, Selection::new(1, 2, 0, 2)).unwrap();
        assert_eq!(
            chunk,
            Chunk::Rect {
                rows: 2,
                cols: 2,
                cells: vec![3.0, 4.0, 5.0, 6.0]
            }
        );
    }

    #[test]
    fn test_extract_interior_block() {
        let raw: Vec<f32> = (1..=9).map(|v| v as f32).collect();
        let ds = PackedDataset::create("f", DataFormat::Field, vec![0.0; 4], 3, 3, raw).unwrap();
        let chunk = extract(&ds, Selection::new(0, 2, 1, 2)).unwrap();
        assert_eq!(
            chunk,
            Chunk::Rect {
                rows: 2,
                cols: 2,
                cells: vec![2.0, 3.0, 5.0, 6.0]
            }
        );
    }

    #[test]
    fn test_extract_whole_rasters() {
        let ds = raster(&[&[1.0], &[2.0, 3.0]]);
        let chunk = extract(&ds, Selection::new(0, 2, 0, 2)).unwrap();
        assert_eq!(
            chunk,
            Chunk::Jagged {
                lengths: vec![1, 2],
                samples: vec![1.0, 2.0, 3.0]
            }
        );
    }

    #[test]
    fn test_extract_single_raster_truncates_to_real_length() {
        // Selecting row 0 across the full display breadth copies only its
        // one real sample.
        let ds = raster(&[&[1.0], &[2.0, 3.0]]);
        let chunk = extract(&ds, Selection::new(0, 1, 0, 2)).unwrap();
        assert_eq!(
            chunk,
            Chunk::Jagged {
                lengths: vec![1],
                samples: vec![1.0]
            }
        );
        assert_eq!(chunk.encode(), vec![1.0, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_extract_raster_subspan() {
        let ds = raster(&[&[1.0, 2.0, 3.0, 4.0]]);
        let chunk = extract(&ds, Selection::new(0, 1, 1, 2)).unwrap();
        assert_eq!(
            chunk,
            Chunk::Jagged {
                lengths: vec![2],
                samples: vec![2.0, 3.0]
            }
        );
    }

    #[test]
    fn test_extract_jagged_multirow_partial_fails() {
        let ds = raster(&[&[1.0, 2.0], &[3.0, 4.0]]);
        let err = extract(&ds, Selection::new(0, 2, 1, 1)).unwrap_err();
        assert_eq!(err, EditError::UnsupportedShape);
    }

    #[test]
    fn test_extract_raster_padding_only_fails() {
        let ds = raster(&[&[1.0], &[2.0, 3.0, 4.0]]);
        // Row 0 has one sample; columns 1.. are padding.
        let err = extract(&ds, Selection::new(0, 1, 1, 2)).unwrap_err();
        assert_eq!(err, EditError::UndefinedSelection);
    }

    #[test]
    fn test_extract_empty_selection_fails() {
        let ds = points(&[[1.0, 2.0]]);
        assert_eq!(
            extract(&ds, Selection::new(3, 1, 0, 1)).unwrap_err(),
            EditError::UndefinedSelection
        );
    }

    #[test]
    fn test_wire_round_trip_rect() {
        let chunk = Chunk::Rect {
            rows: 2,
            cols: 3,
            cells: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        };
        let wire = chunk.encode();
        assert_eq!(&wire[..3], &[0.0, 2.0, 3.0]);
        assert_eq!(Chunk::decode(&wire).unwrap(), chunk);
    }

    #[test]
    fn test_wire_round_trip_jagged() {
        let chunk = Chunk::Jagged {
            lengths: vec![3, 2],
            samples: vec![1.0, 2.0, 3.0, 4.0, 5.0],
        };
        let wire = chunk.encode();
        assert_eq!(&wire[..3], &[1.0, 5.0, 2.0]);
        assert_eq!(Chunk::decode(&wire).unwrap(), chunk);
    }

    #[test]
    fn test_decode_rejects_bad_sizes() {
        assert!(Chunk::decode(&[0.0, 1.0]).is_err());
        assert!(Chunk::decode(&[0.0, 2.0, 2.0, 1.0]).is_err());
        assert!(Chunk::decode(&[1.0, 2.0, 1.0, 3.0, 1.0, 2.0]).is_err());
    }

    #[test]
    fn test_from_rows_inference() {
        let chunk = Chunk::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert!(!chunk.is_jagged());
        let chunk = Chunk::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0]]);
        assert_eq!(
            chunk,
            Chunk::Jagged {
                lengths: vec![3, 2],
                samples: vec![1.0, 2.0, 3.0, 4.0, 5.0]
            }
        );
    }

    #[test]
    fn test_to_rows() {
        let chunk = Chunk::Jagged {
            lengths: vec![1, 2],
            samples: vec![1.0, 2.0, 3.0],
        };
        assert_eq!(chunk.to_rows(), vec![vec![1.0], vec![2.0, 3.0]]);
    }
}
