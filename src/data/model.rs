use std::path::Path;

use anyhow::{Context, Result};

// ---------------------------------------------------------------------------
// UploadedFile – one user-supplied buffer
// ---------------------------------------------------------------------------

/// A named byte buffer handed in by the upload control (or the CLI).
///
/// Lives for one pipeline run; nothing about it is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// File name shown in warnings (no directory part).
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        UploadedFile {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a whole file from disk into memory.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(UploadedFile { name, bytes })
    }

    /// Whether the extension is one the upload control advertises.
    ///
    /// Advisory only: content is validated by the parser, not by the name.
    pub fn has_supported_extension(&self) -> bool {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }
}

/// Read every path that can be read.
///
/// An unreadable path does not stop the batch: its error (with the path as
/// context) is returned next to the files that did load, in input order.
pub fn read_all<P: AsRef<Path>>(paths: &[P]) -> (Vec<UploadedFile>, Vec<anyhow::Error>) {
    let mut files = Vec::with_capacity(paths.len());
    let mut errors = Vec::new();
    for path in paths {
        match UploadedFile::read(path.as_ref()) {
            Ok(file) => files.push(file),
            Err(e) => {
                log::warn!("{e:#}");
                errors.push(e);
            }
        }
    }
    (files, errors)
}

/// Extensions offered by the file picker.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["txt", "xvg"];

// ---------------------------------------------------------------------------
// DataTable – parsed numeric rows
// ---------------------------------------------------------------------------

/// A rectangular numeric table, stored row-major.
///
/// Columns are positional: column 0 is time, column 1 the raw RMSD value.
/// Any further columns are kept but never plotted.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    n_cols: usize,
    values: Vec<f64>,
}

impl DataTable {
    /// Build from row-major values. `values.len()` must be a multiple of
    /// `n_cols`.
    pub(crate) fn from_flat(n_cols: usize, values: Vec<f64>) -> Self {
        debug_assert!(n_cols > 0 && values.len() % n_cols == 0);
        DataTable { n_cols, values }
    }

    pub fn n_rows(&self) -> usize {
        self.values.len() / self.n_cols
    }

    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// One row as a slice.
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.n_cols)?;
        self.values.get(start..start + self.n_cols)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.values.chunks_exact(self.n_cols)
    }

    /// All values of one column, or `None` if the table is too narrow.
    pub fn column(&self, index: usize) -> Option<impl Iterator<Item = f64> + '_> {
        if index >= self.n_cols {
            return None;
        }
        Some(self.rows().map(move |r| r[index]))
    }
}
