//! One full pass: uploads + unit → figure + per-file warnings.
//!
//! Every call starts from scratch; nothing from a previous run is reused.

use std::fmt;

use crate::color;
use crate::data::loader::{self, ParseError};
use crate::data::model::UploadedFile;
use crate::figure::Figure;
use crate::units::UnitChoice;

/// A file that was skipped, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct FileWarning {
    pub index: usize,
    pub file_name: String,
    pub error: ParseError,
}

impl fmt::Display for FileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not process {}: {}", self.file_name, self.error)
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Nothing uploaded: show the upload prompt.
    Empty,
    /// At least one upload. `figure` may still be empty if every file failed.
    Processed {
        uploaded: usize,
        figure: Figure,
        warnings: Vec<FileWarning>,
    },
}

impl RunOutcome {
    /// Whether there is something to draw and download.
    pub fn is_rendered(&self) -> bool {
        self.figure().is_some_and(|f| !f.is_empty())
    }

    /// Every upload failed to parse.
    pub fn all_failed(&self) -> bool {
        matches!(self, RunOutcome::Processed { figure, .. } if figure.is_empty())
    }

    pub fn figure(&self) -> Option<&Figure> {
        match self {
            RunOutcome::Empty => None,
            RunOutcome::Processed { figure, .. } => Some(figure),
        }
    }

    pub fn warnings(&self) -> &[FileWarning] {
        match self {
            RunOutcome::Empty => &[],
            RunOutcome::Processed { warnings, .. } => warnings,
        }
    }

    pub fn uploaded(&self) -> usize {
        match self {
            RunOutcome::Empty => 0,
            RunOutcome::Processed { uploaded, .. } => *uploaded,
        }
    }
}

/// Parse every upload and collect the plottable ones into a figure.
///
/// A failing file never aborts the batch: it becomes a [`FileWarning`] and
/// keeps its slot, so later files still get the colour and label of their
/// upload position.
pub fn run(files: &[UploadedFile], unit: UnitChoice) -> RunOutcome {
    if files.is_empty() {
        return RunOutcome::Empty;
    }

    let mut figure = Figure::new(unit);
    let mut warnings = Vec::new();

    for (index, file) in files.iter().enumerate() {
        let result = loader::parse(&file.bytes)
            .and_then(|table| figure.add_series(index, file.name.as_str(), table));

        match result {
            Ok(()) => log::debug!(
                "{}: plotted as dataset {} ({})",
                file.name,
                index + 1,
                color::color_name(index)
            ),
            Err(error) => {
                log::warn!("Could not process {}: {error}", file.name);
                warnings.push(FileWarning {
                    index,
                    file_name: file.name.clone(),
                    error,
                });
            }
        }
    }

    log::info!(
        "{} of {} file(s) plotted in {}",
        figure.series.len(),
        files.len(),
        unit.axis_label()
    );

    RunOutcome::Processed {
        uploaded: files.len(),
        figure,
        warnings,
    }
}
