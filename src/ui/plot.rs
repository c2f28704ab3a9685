use eframe::egui::{Color32, TextStyle, Ui, Vec2b};
use egui_plot::{Corner, GridInput, GridMark, Legend, Line, Plot, PlotPoints, PlotResponse};

use crate::color::SeriesStyle;
use crate::figure::{policy, Figure};
use crate::state::AppState;

/// Prompt shown while nothing has been uploaded.
pub const EMPTY_PROMPT: &str = "Upload RMSD files to see the plot.";
/// Shown when files were uploaded but none could be parsed.
pub const ALL_FAILED_PROMPT: &str = "None of the uploaded files could be plotted. See the warnings.";

pub fn color32(style: &SeriesStyle) -> Color32 {
    Color32::from_rgb(style.color.red, style.color.green, style.color.blue)
}

/// Grid marks every 50 ns, coarsened by powers of ten when zoomed far out.
fn time_grid(input: GridInput) -> Vec<GridMark> {
    let (lo, hi) = input.bounds;
    let mut step = policy::X_TICKS[1] - policy::X_TICKS[0];
    while (hi - lo) / step > 20.0 {
        step *= 10.0;
    }
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last)
        .map(|k| GridMark {
            value: k as f64 * step,
            step_size: step,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// RMSD plot (central panel)
// ---------------------------------------------------------------------------

/// Render the overlaid RMSD chart in the central panel.
pub fn rmsd_plot(ui: &mut Ui, state: &AppState) {
    let figure = match state.outcome.figure() {
        Some(fig) if !fig.is_empty() => fig,
        _ => {
            let prompt = if state.outcome.all_failed() {
                ALL_FAILED_PROMPT
            } else {
                EMPTY_PROMPT
            };
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading(prompt);
            });
            return;
        }
    };

    show_figure(ui, figure);
}

/// The chart itself. x is pinned to the export's time window (also after a
/// double-click reset); y auto-fits the data.
fn show_figure(ui: &mut Ui, figure: &Figure) -> PlotResponse<()> {
    let (y_lo, y_hi) = figure.y_range();

    Plot::new("rmsd_plot")
        .legend(
            Legend::default()
                .position(Corner::RightTop)
                .text_style(TextStyle::Body),
        )
        .x_axis_label(figure.x_label())
        .y_axis_label(figure.y_label())
        .x_grid_spacer(time_grid)
        .include_x(policy::X_MIN)
        .include_x(policy::X_MAX)
        .include_y(y_lo)
        .include_y(y_hi)
        .auto_bounds(Vec2b::new(false, true))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for series in &figure.series {
                let points: PlotPoints = series.points().map(|(t, v)| [t, v]).collect();
                let line = Line::new(points)
                    .name(&series.style.label)
                    .color(color32(&series.style).gamma_multiply(policy::LINE_OPACITY as f32))
                    .width(policy::LINE_WIDTH as f32);
                plot_ui.line(line);
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(lo: f64, hi: f64) -> Vec<f64> {
        time_grid(GridInput {
            bounds: (lo, hi),
            base_step_size: 1.0,
        })
        .into_iter()
        .map(|m| m.value)
        .collect()
    }

    #[test]
    fn default_view_has_fifty_ns_marks() {
        assert_eq!(grid(0.0, 251.0), policy::X_TICKS.to_vec());
    }

    #[test]
    fn long_trajectory_opens_on_the_fixed_time_window() {
        let mut figure = Figure::new(crate::units::UnitChoice::Angstrom);
        let table = crate::data::loader::parse_text("0 1.0\n500 2.0\n1000 1.5\n").unwrap();
        figure.add_series(0, "long.xvg", table).unwrap();

        let ctx = eframe::egui::Context::default();
        let mut x_bounds = None;
        let _ = ctx.run(eframe::egui::RawInput::default(), |ctx| {
            eframe::egui::CentralPanel::default().show(ctx, |ui| {
                let bounds = *show_figure(ui, &figure).transform.bounds();
                x_bounds = Some((bounds.min()[0], bounds.max()[0]));
            });
        });

        let (lo, hi) = x_bounds.unwrap();
        assert!((lo - policy::X_MIN).abs() < 1e-9, "x starts at {lo}");
        assert!((hi - policy::X_MAX).abs() < 1e-9, "x ends at {hi}");
    }

    #[test]
    fn zoomed_out_view_coarsens_marks() {
        let marks = grid(0.0, 10_000.0);
        assert!(marks.len() <= 21);
        assert_eq!(marks[1] - marks[0], 500.0);
    }
}
