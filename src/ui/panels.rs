use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::{read_all, SUPPORTED_EXTENSIONS};
use crate::state::AppState;
use crate::ui::plot::color32;
use crate::units::UnitChoice;

const WARNING_COLOR: Color32 = Color32::from_rgb(230, 160, 0);
const SUCCESS_COLOR: Color32 = Color32::from_rgb(40, 160, 70);

// ---------------------------------------------------------------------------
// Left side panel – unit, uploads, download
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("📈 RMSD Plotter");
    ui.separator();

    // ---- Unit selector ----
    ui.strong("Select RMSD unit:");
    let mut unit = state.unit;
    egui::ComboBox::from_id_salt("rmsd_unit")
        .selected_text(unit.display_label())
        .show_ui(ui, |ui: &mut Ui| {
            for choice in UnitChoice::ALL {
                ui.selectable_value(&mut unit, choice, choice.display_label());
            }
        });
    state.set_unit(unit);
    ui.separator();

    // ---- Upload ----
    if ui
        .button("📂 Upload one or more RMSD data files (txt or xvg)")
        .clicked()
    {
        open_files_dialog(state);
    }

    if let Some(summary) = state.summary() {
        let color = if state.outcome.is_rendered() {
            SUCCESS_COLOR
        } else {
            WARNING_COLOR
        };
        ui.label(RichText::new(summary).color(color));
    }

    ScrollArea::vertical()
        .auto_shrink([false, true])
        .max_height((ui.available_height() - 60.0).max(80.0))
        .show(ui, |ui: &mut Ui| {
            file_list(ui, state);
        });

    ui.separator();

    // ---- Download ----
    let can_download = state.outcome.is_rendered();
    if ui
        .add_enabled(
            can_download,
            egui::Button::new("💾 Download RMSD Plot (PNG)"),
        )
        .on_hover_text(state.export_file_name())
        .clicked()
    {
        save_png_dialog(state);
    }
}

/// One row per upload: colour swatch + label, or the warning for that file.
fn file_list(ui: &mut Ui, state: &AppState) {
    let figure = state.outcome.figure();
    for (index, file) in state.files.iter().enumerate() {
        let series = figure.and_then(|f| f.series.iter().find(|s| s.index == index));
        match series {
            Some(series) => {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(RichText::new("━━").strong().color(color32(&series.style)));
                    ui.label(&series.style.label);
                    ui.weak(format!("{} ({} rows)", file.name, series.len()));
                });
            }
            None => {
                if let Some(warning) = state.outcome.warnings().iter().find(|w| w.index == index) {
                    ui.label(RichText::new(format!("⚠ {warning}")).color(WARNING_COLOR));
                }
            }
        }
        if !file.has_supported_extension() {
            ui.weak(format!("{}: not a .txt/.xvg file", file.name));
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Upload…").clicked() {
                open_files_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.outcome.is_rendered(), egui::Button::new("Download PNG…"))
                .clicked()
            {
                save_png_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(!state.files.is_empty(), egui::Button::new("Clear"))
                .clicked()
            {
                state.clear_files();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(figure) = state.outcome.figure() {
            ui.label(format!(
                "{} of {} file(s) plotted",
                figure.series.len(),
                state.outcome.uploaded()
            ));
            ui.separator();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_files_dialog(state: &mut AppState) {
    let picked = rfd::FileDialog::new()
        .set_title("Upload RMSD data files")
        .add_filter("RMSD data (txt, xvg)", &SUPPORTED_EXTENSIONS)
        .add_filter("All files", &["*"])
        .pick_files();

    let Some(paths) = picked else {
        return;
    };
    let (files, errors) = read_all(&paths);
    log::info!("Uploaded {} of {} file(s)", files.len(), paths.len());
    state.set_files(files);
    state.status_message = unreadable_message(&errors);
}

fn unreadable_message(errors: &[anyhow::Error]) -> Option<String> {
    if errors.is_empty() {
        return None;
    }
    let details: Vec<String> = errors.iter().map(|e| format!("{e:#}")).collect();
    Some(format!("Skipped unreadable file(s): {}", details.join("; ")))
}

pub fn save_png_dialog(state: &mut AppState) {
    let target = rfd::FileDialog::new()
        .set_title("Download RMSD plot")
        .set_file_name(state.export_file_name())
        .add_filter("PNG image", &["png"])
        .save_file();

    let Some(path) = target else {
        return;
    };
    match write_png(state, &path) {
        Ok(bytes) => {
            log::info!("Saved {} ({bytes} bytes)", path.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Failed to save plot: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn write_png(state: &AppState, path: &Path) -> Result<usize> {
    let bytes = state.export_png().context("rendering PNG")?;
    std::fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(bytes.len())
}
