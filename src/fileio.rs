use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::chunk::Chunk;
use crate::dataset::{PackedDataset, MAX_ID_LEN};
use crate::editor;
use crate::error::EditError;
use crate::format::DataFormat;
use crate::selection::Selection;
use crate::textcodec;

/// Result of loading a file, including any warnings.
pub struct LoadResult {
    pub dataset: PackedDataset,
    pub warnings: Vec<String>,
}

pub struct FileIO {
    pub file_path: Option<PathBuf>,
    format_hint: Option<DataFormat>,
    read_only: bool,
    max_cells: usize,
}

/// Default parameter values for a freshly created dataset of `format`.
fn default_params(format: DataFormat) -> Vec<f32> {
    match format {
        DataFormat::Series | DataFormat::Raster => vec![0.0, 1.0],
        DataFormat::Field => vec![0.0, 0.0, 1.0, 1.0],
        DataFormat::Points => vec![],
    }
}

/// Pick a format for parsed content when none was given on the command
/// line: unequal lines are rasters; otherwise the column count decides.
fn infer_format(chunk: &Chunk) -> DataFormat {
    if chunk.is_jagged() {
        return DataFormat::Raster;
    }
    match chunk.longest_row() {
        0 | 1 => DataFormat::Series,
        2..=6 => DataFormat::Points,
        _ => DataFormat::Field,
    }
}

/// Derive a dataset id from the file stem, restricted to the id charset.
fn id_from_stem(path: Option<&PathBuf>) -> String {
    let stem = path
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .take(MAX_ID_LEN)
        .collect();
    if cleaned.is_empty() {
        "data".to_string()
    } else {
        cleaned
    }
}

fn to_io_error(e: EditError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e.to_string())
}

impl FileIO {
    pub fn new(
        file_path: Option<PathBuf>,
        format_hint: Option<DataFormat>,
        read_only: bool,
        max_cells: usize,
    ) -> Self {
        Self {
            file_path,
            format_hint,
            read_only,
            max_cells,
        }
    }

    pub fn file_name(&self) -> String {
        self.file_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    pub fn read_only(&self) -> bool {
        self.read_only
    }

    fn fresh_dataset(&self) -> io::Result<PackedDataset> {
        let format = self.format_hint.unwrap_or(DataFormat::Points);
        PackedDataset::empty(id_from_stem(self.file_path.as_ref()), format)
            .map_err(to_io_error)
    }

    /// Load the dataset, returning warnings about anything noteworthy.
    pub fn load_dataset(&self) -> io::Result<LoadResult> {
        let Some(path) = self.file_path.as_ref() else {
            return Ok(LoadResult {
                dataset: self.fresh_dataset()?,
                warnings: Vec::new(),
            });
        };

        if !path.exists() {
            return Ok(LoadResult {
                dataset: self.fresh_dataset()?,
                warnings: vec![format!("New file: {}", path.display())],
            });
        }

        let text = fs::read_to_string(path)?;
        if text.trim().is_empty() {
            return Ok(LoadResult {
                dataset: self.fresh_dataset()?,
                warnings: vec!["File is empty".to_string()],
            });
        }

        let chunk = textcodec::from_text(&text).map_err(to_io_error)?;
        let cells: usize = chunk.to_rows().iter().map(|r| r.len()).sum();
        if cells > self.max_cells {
            return Err(to_io_error(EditError::CapacityExceeded {
                cells,
                max: self.max_cells,
            }));
        }

        let format = self.format_hint.unwrap_or_else(|| infer_format(&chunk));
        let mut warnings = Vec::new();
        if self.format_hint.is_none() {
            warnings.push(format!("Format: {}", format));
        }
        if !chunk.is_jagged() && !format.is_jagged() && !format.accepts_breadth(chunk.longest_row())
        {
            warnings.push(format!(
                "Rows reshaped to {} columns for {} data",
                format.clamp_breadth(chunk.longest_row()),
                format
            ));
        }

        let breadth = if format.is_jagged() {
            0
        } else {
            format.descriptor().min_breadth
        };
        let empty = PackedDataset::create(
            id_from_stem(self.file_path.as_ref()),
            format,
            default_params(format),
            0,
            breadth,
            Vec::new(),
        )
        .map_err(to_io_error)?;
        let dataset = editor::insert(&empty, Selection::new(0, 0, 0, 0), &chunk, true)
            .map_err(to_io_error)?;

        Ok(LoadResult { dataset, warnings })
    }

    /// Write the dataset back out as whitespace text.
    pub fn write(&self, dataset: &PackedDataset) -> io::Result<()> {
        if self.read_only {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "File opened read-only",
            ));
        }
        let Some(path) = self.file_path.as_ref() else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                "No file path specified",
            ));
        };
        let file = fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(textcodec::to_text(dataset).as_bytes())?;
        writer.flush()
    }
}
