//! Plain-text round trip for datasets and chunks.
//!
//! Each logical row renders as whitespace-separated float tokens followed
//! by `\r\n`; jagged rows naturally produce lines of unequal token count.
//! Parsing is all-or-nothing: one bad token fails the whole conversion.

use std::fmt::Write;

use crate::chunk::Chunk;
use crate::dataset::PackedDataset;
use crate::error::{EditError, EditResult};

fn push_line(out: &mut String, row: &[f32]) {
    for (i, v) in row.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // `{}` keeps full round-trip precision; NaN prints as "NaN",
        // which parses back.
        let _ = write!(out, "{}", v);
    }
    out.push_str("\r\n");
}

/// Render a dataset's rows (at their real lengths) as text.
pub fn to_text(dataset: &PackedDataset) -> String {
    let mut out = String::new();
    for row in 0..dataset.length() {
        push_line(&mut out, dataset.row_slice(row));
    }
    out
}

/// Render a chunk's rows as text.
pub fn chunk_to_text(chunk: &Chunk) -> String {
    let mut out = String::new();
    for row in chunk.to_rows() {
        push_line(&mut out, &row);
    }
    out
}

/// Parse text into a chunk, line by line.
///
/// Equal token counts on every line give a rectangular chunk, anything
/// else a jagged one. Blank lines (as text widgets tend to append) are
/// ignored; input with no tokens at all is an error.
pub fn from_text(text: &str) -> EditResult<Chunk> {
    let mut rows: Vec<Vec<f32>> = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut row = Vec::new();
        for token in line.split_whitespace() {
            let value: f32 = token.parse().map_err(|_| EditError::ParseFailure {
                line: line_no + 1,
                token: token.to_string(),
            })?;
            row.push(value);
        }
        rows.push(row);
    }
    if rows.is_empty() {
        return Err(EditError::ParseFailure {
            line: 1,
            token: String::new(),
        });
    }
    Ok(Chunk::from_rows(rows))
}
