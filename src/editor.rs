//! Structural edits on packed datasets.
//!
//! Every operation here is copy-on-write: it either returns a fully
//! validated replacement dataset or fails without touching the input.
//! Single-cell writes are the one in-place mutation and live on
//! [`PackedDataset::set_cell`] instead.

use crate::chunk::Chunk;
use crate::dataset::PackedDataset;
use crate::error::{EditError, EditResult};
use crate::selection::Selection;

fn rebuild_rect(
    ds: &PackedDataset,
    length: usize,
    breadth: usize,
    raw: Vec<f32>,
) -> EditResult<PackedDataset> {
    PackedDataset::create(
        ds.id().to_string(),
        ds.format(),
        ds.params().to_vec(),
        length,
        breadth,
        raw,
    )
}

fn rebuild_jagged(ds: &PackedDataset, rows: Vec<Vec<f32>>) -> EditResult<PackedDataset> {
    let mut raw: Vec<f32> = rows.iter().map(|r| r.len() as f32).collect();
    let length = rows.len();
    for row in &rows {
        raw.extend_from_slice(row);
    }
    PackedDataset::create(
        ds.id().to_string(),
        ds.format(),
        ds.params().to_vec(),
        length,
        0,
        raw,
    )
}

fn all_rows(ds: &PackedDataset) -> Vec<Vec<f32>> {
    (0..ds.length()).map(|r| ds.row_slice(r).to_vec()).collect()
}

/// Pad with NaN or truncate a row to exactly `breadth` values.
fn fit_row(row: &[f32], breadth: usize) -> Vec<f32> {
    let mut out = row[..row.len().min(breadth)].to_vec();
    out.resize(breadth, f32::NAN);
    out
}

fn shape_violation(ds: &PackedDataset, breadth: usize) -> EditError {
    let d = ds.format().descriptor();
    EditError::ShapeViolation {
        format: ds.format(),
        breadth,
        min: d.min_breadth,
        max: d.max_breadth,
    }
}

// === Removal ===

/// Delete the selected region.
///
/// Depending on how the selection relates to the grid this removes whole
/// rows, whole columns, samples within one raster, everything, or (for an
/// interior rectangular block) blanks the cells to NaN without changing
/// shape. Column removal that would leave the breadth outside the format's
/// bounds fails instead of committing.
pub fn remove(ds: &PackedDataset, selection: Selection) -> EditResult<PackedDataset> {
    let sel = selection
        .clipped(ds.length(), ds.breadth())
        .ok_or(EditError::UndefinedSelection)?;
    let length = ds.length();
    let breadth = ds.breadth();

    if sel.covers(length, breadth) {
        return if ds.format().is_jagged() {
            rebuild_jagged(ds, Vec::new())
        } else {
            rebuild_rect(ds, 0, breadth, Vec::new())
        };
    }

    if ds.format().is_jagged() {
        if sel.spans_all_cols(breadth) {
            // Whole rasters go away; prefix and sample region both compact.
            let mut rows = all_rows(ds);
            rows.drain(sel.first_row..sel.end_row());
            return rebuild_jagged(ds, rows);
        }
        if sel.row_count != 1 {
            return Err(EditError::UnsupportedShape);
        }
        let row_len = ds.row_len(sel.first_row);
        if sel.first_col >= row_len {
            return Err(EditError::UndefinedSelection);
        }
        let mut rows = all_rows(ds);
        rows[sel.first_row].drain(sel.first_col..sel.end_col().min(row_len));
        return rebuild_jagged(ds, rows);
    }

    if sel.spans_all_cols(breadth) {
        // Whole rows: one contiguous splice out of the row-major buffer.
        let mut raw = ds.raw().to_vec();
        raw.drain(sel.first_row * breadth..sel.end_row() * breadth);
        return rebuild_rect(ds, length - sel.row_count, breadth, raw);
    }

    if sel.spans_all_rows(length) {
        let new_breadth = breadth - sel.col_count;
        if !ds.format().accepts_breadth(new_breadth) {
            return Err(shape_violation(ds, new_breadth));
        }
        // Copy each row's surviving ranges; deleting the trailing columns
        // takes the same path as an interior block.
        let mut raw = Vec::with_capacity(length * new_breadth);
        for row in 0..length {
            let slice = ds.row_slice(row);
            raw.extend_from_slice(&slice[..sel.first_col]);
            raw.extend_from_slice(&slice[sel.end_col()..]);
        }
        return rebuild_rect(ds, length, new_breadth, raw);
    }

    // Interior block: no structure changes, the cells just become NaN.
    let mut raw = ds.raw().to_vec();
    for row in sel.first_row..sel.end_row() {
        for col in sel.first_col..sel.end_col() {
            raw[row * breadth + col] = f32::NAN;
        }
    }
    rebuild_rect(ds, length, breadth, raw)
}

/// Whether [`remove`] would succeed, for menu/key enablement.
pub fn can_remove(ds: &PackedDataset, selection: Selection) -> bool {
    let Some(sel) = selection.clipped(ds.length(), ds.breadth()) else {
        return false;
    };
    if sel.covers(ds.length(), ds.breadth()) || sel.spans_all_cols(ds.breadth()) {
        return true;
    }
    if ds.format().is_jagged() {
        return sel.row_count == 1 && sel.first_col < ds.row_len(sel.first_row);
    }
    if sel.spans_all_rows(ds.length()) {
        return ds.format().accepts_breadth(ds.breadth() - sel.col_count);
    }
    true
}

// === Insertion ===

/// Reshape a chunk into the entire content of a dataset.
///
/// An empty rectangular target takes its new breadth from the chunk
/// (clamped into the format bounds); a non-empty one keeps its own.
fn replace_whole(ds: &PackedDataset, chunk: &Chunk) -> EditResult<PackedDataset> {
    if ds.format().is_jagged() {
        return rebuild_jagged(ds, chunk.to_rows());
    }
    let breadth = if ds.is_empty() {
        ds.format().clamp_breadth(chunk.longest_row())
    } else {
        ds.breadth()
    };
    let rows = chunk.to_rows();
    let mut raw = Vec::with_capacity(rows.len() * breadth);
    for row in &rows {
        raw.extend(fit_row(row, breadth));
    }
    rebuild_rect(ds, rows.len(), breadth, raw)
}

/// Insert a chunk relative to the selection, optionally replacing it.
///
/// The chunk may have come from a dataset of any format; it is reshaped
/// (NaN-padded or truncated) so the result always satisfies the target
/// format. See the module-level cases for how the selection's relation to
/// the grid picks row insertion, column insertion, raster splicing, or
/// whole-grid replacement.
pub fn insert(
    ds: &PackedDataset,
    selection: Selection,
    chunk: &Chunk,
    replace: bool,
) -> EditResult<PackedDataset> {
    if ds.is_empty() {
        return replace_whole(ds, chunk);
    }
    let length = ds.length();
    let breadth = ds.breadth();
    let sel = selection
        .clipped(length, breadth)
        .ok_or(EditError::UndefinedSelection)?;

    if replace && sel.covers(length, breadth) {
        return replace_whole(ds, chunk);
    }

    if ds.format().is_jagged() {
        if sel.spans_all_cols(breadth) {
            // Whole rasters in, whole rasters (optionally) out. Rows keep
            // their natural lengths, no padding involved.
            let mut rows = all_rows(ds);
            let tail_from = if replace { sel.end_row() } else { sel.first_row };
            let mut new_rows = rows[..sel.first_row].to_vec();
            new_rows.extend(chunk.to_rows());
            new_rows.extend(rows.drain(tail_from..));
            return rebuild_jagged(ds, new_rows);
        }
        if sel.row_count != 1 {
            return Err(EditError::UnsupportedShape);
        }
        // Splice the chunk's first row into this one raster.
        let mut rows = all_rows(ds);
        let row_len = rows[sel.first_row].len();
        let at = sel.first_col.min(row_len);
        if replace {
            rows[sel.first_row].drain(at..sel.end_col().min(row_len));
        }
        let incoming = chunk.to_rows().into_iter().next().unwrap_or_default();
        rows[sel.first_row].splice(at..at, incoming);
        return rebuild_jagged(ds, rows);
    }

    let full_rows = sel.spans_all_rows(length);
    let full_cols = sel.spans_all_cols(breadth);

    if full_cols || (!full_rows && !replace) {
        // Row insertion before the first selected row, breadth unchanged.
        let remove_rows = if replace && full_cols { sel.row_count } else { 0 };
        let chunk_rows = chunk.to_rows();
        let mut raw = Vec::with_capacity((length + chunk_rows.len()) * breadth);
        raw.extend_from_slice(&ds.raw()[..sel.first_row * breadth]);
        for row in &chunk_rows {
            raw.extend(fit_row(row, breadth));
        }
        raw.extend_from_slice(&ds.raw()[(sel.first_row + remove_rows) * breadth..]);
        return rebuild_rect(ds, length + chunk_rows.len() - remove_rows, breadth, raw);
    }

    if full_rows {
        return insert_cols(ds, sel, chunk, replace);
    }

    // Interior block with replace: overwrite in place, shape unchanged.
    let grid = chunk.to_rows();
    let mut raw = ds.raw().to_vec();
    for r in 0..sel.row_count {
        for c in 0..sel.col_count {
            let v = grid
                .get(r)
                .and_then(|row| row.get(c))
                .copied()
                .unwrap_or(f32::NAN);
            raw[(sel.first_row + r) * breadth + sel.first_col + c] = v;
        }
    }
    rebuild_rect(ds, length, breadth, raw)
}

/// Column insertion into a rectangular dataset (selection spans all rows).
fn insert_cols(
    ds: &PackedDataset,
    sel: Selection,
    chunk: &Chunk,
    replace: bool,
) -> EditResult<PackedDataset> {
    let length = ds.length();
    let breadth = ds.breadth();
    let d = ds.format().descriptor();

    if !replace && breadth >= d.max_breadth {
        return Err(shape_violation(ds, breadth + chunk.longest_row()));
    }

    let removed = if replace { sel.col_count } else { 0 };
    let kept = breadth - removed;
    // Pad or truncate the incoming columns so the result lands on the
    // nearest breadth the format can represent.
    let new_breadth = ds.format().clamp_breadth(kept + chunk.longest_row());
    let inserted = new_breadth - kept;

    let grid = chunk.to_rows();
    let cell = |r: usize, c: usize| {
        grid.get(r)
            .and_then(|row| row.get(c))
            .copied()
            .unwrap_or(f32::NAN)
    };

    let mut raw = Vec::with_capacity(length * new_breadth);
    for row in 0..length {
        let slice = ds.row_slice(row);
        raw.extend_from_slice(&slice[..sel.first_col]);
        for c in 0..inserted {
            raw.push(cell(row, c));
        }
        raw.extend_from_slice(&slice[sel.first_col + removed..]);
    }
    rebuild_rect(ds, length, new_breadth, raw)
}

/// Append a chunk's rows/rasters at the end of the dataset.
pub fn append(ds: &PackedDataset, chunk: &Chunk) -> EditResult<PackedDataset> {
    if ds.is_empty() {
        return replace_whole(ds, chunk);
    }
    if ds.format().is_jagged() {
        let mut rows = all_rows(ds);
        rows.extend(chunk.to_rows());
        return rebuild_jagged(ds, rows);
    }
    let breadth = ds.breadth();
    let chunk_rows = chunk.to_rows();
    let mut raw = ds.raw().to_vec();
    for row in &chunk_rows {
        raw.extend(fit_row(row, breadth));
    }
    rebuild_rect(ds, ds.length() + chunk_rows.len(), breadth, raw)
}

// === Single row/column addition ===

/// Add one NaN-filled row or column.
///
/// Appending a row is always legal; inserting needs a selection for the
/// insertion point. A "column" on a jagged dataset means one extra sample
/// in a single selected raster, never a structural column. A column on a
/// rectangular dataset must keep the breadth within the format's bounds.
pub fn insert_new_row_or_col(
    ds: &PackedDataset,
    is_column: bool,
    is_append: bool,
    selection: Option<Selection>,
) -> EditResult<PackedDataset> {
    let sel = selection.and_then(|s| s.clipped(ds.length(), ds.breadth().max(1)));

    if !is_column {
        let at = if is_append {
            ds.length()
        } else {
            sel.ok_or(EditError::UndefinedSelection)?.first_row
        };
        if ds.format().is_jagged() {
            let mut rows = all_rows(ds);
            rows.insert(at, vec![f32::NAN]);
            return rebuild_jagged(ds, rows);
        }
        let breadth = ds.breadth();
        let mut raw = ds.raw().to_vec();
        raw.splice(at * breadth..at * breadth, vec![f32::NAN; breadth]);
        return rebuild_rect(ds, ds.length() + 1, breadth, raw);
    }

    if ds.format().is_jagged() {
        let sel = sel.ok_or(EditError::UndefinedSelection)?;
        if sel.row_count != 1 {
            return Err(EditError::UnsupportedShape);
        }
        let mut rows = all_rows(ds);
        let row_len = rows[sel.first_row].len();
        let at = if is_append {
            row_len
        } else {
            sel.first_col.min(row_len)
        };
        rows[sel.first_row].insert(at, f32::NAN);
        return rebuild_jagged(ds, rows);
    }

    let breadth = ds.breadth();
    if !ds.format().accepts_breadth(breadth + 1) {
        return Err(shape_violation(ds, breadth + 1));
    }
    let at = if is_append {
        breadth
    } else {
        sel.ok_or(EditError::UndefinedSelection)?.first_col
    };
    let mut raw = Vec::with_capacity(ds.length() * (breadth + 1));
    for row in 0..ds.length() {
        let slice = ds.row_slice(row);
        raw.extend_from_slice(&slice[..at]);
        raw.push(f32::NAN);
        raw.extend_from_slice(&slice[at..]);
    }
    rebuild_rect(ds, ds.length(), breadth + 1, raw)
}
