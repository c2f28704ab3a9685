use eframe::egui;

use crate::config::PlotterConfig;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RmsdPlotterApp {
    pub state: AppState,
}

impl Default for RmsdPlotterApp {
    fn default() -> Self {
        Self::new(PlotterConfig::default())
    }
}

impl RmsdPlotterApp {
    pub fn new(config: PlotterConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for RmsdPlotterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: unit, uploads, download ----
        egui::SidePanel::left("control_panel")
            .default_width(300.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::rmsd_plot(ui, &self.state);
        });
    }
}
