use crate::config::PlotterConfig;
use crate::data::model::UploadedFile;
use crate::export::{self, ExportError, ExportOptions};
use crate::figure;
use crate::pipeline::{self, RunOutcome};
use crate::units::UnitChoice;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// The pipeline output is recomputed from `files` and `unit` whenever either
/// changes; nothing else is carried between runs.
pub struct AppState {
    /// Currently selected unit.
    pub unit: UnitChoice,

    /// Uploaded files, in upload order.
    pub files: Vec<UploadedFile>,

    /// Result of the latest pipeline run.
    pub outcome: RunOutcome,

    /// Status / error message shown in the UI (file dialogs, exports).
    pub status_message: Option<String>,

    /// Settings used for exports.
    pub config: PlotterConfig,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(PlotterConfig::default())
    }
}

impl AppState {
    pub fn new(config: PlotterConfig) -> Self {
        Self {
            unit: config.default_unit,
            files: Vec::new(),
            outcome: RunOutcome::Empty,
            status_message: None,
            config,
        }
    }

    /// Recompute the outcome from scratch.
    pub fn rerun(&mut self) {
        self.outcome = pipeline::run(&self.files, self.unit);
    }

    /// Change the unit; re-runs only when it actually changed.
    pub fn set_unit(&mut self, unit: UnitChoice) {
        if unit != self.unit {
            self.unit = unit;
            self.rerun();
        }
    }

    /// Replace the uploaded file set.
    pub fn set_files(&mut self, files: Vec<UploadedFile>) {
        self.files = files;
        self.status_message = None;
        self.rerun();
    }

    pub fn clear_files(&mut self) {
        self.set_files(Vec::new());
    }

    /// Name offered in the save dialog.
    pub fn export_file_name(&self) -> String {
        figure::export_file_name(self.unit)
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions::from(&self.config)
    }

    /// Encode the current figure as PNG.
    pub fn export_png(&self) -> Result<Vec<u8>, ExportError> {
        match self.outcome.figure() {
            Some(figure) => export::render_png(figure, &self.export_options()),
            None => Err(ExportError::NoSeries),
        }
    }

    /// Banner text summarising the latest run, if any.
    pub fn summary(&self) -> Option<String> {
        match &self.outcome {
            RunOutcome::Empty => None,
            RunOutcome::Processed { uploaded, .. } if self.outcome.all_failed() => Some(format!(
                "None of the {uploaded} uploaded file(s) could be plotted."
            )),
            RunOutcome::Processed { uploaded, .. } => {
                Some(format!("{uploaded} file(s) uploaded!"))
            }
        }
    }
}
