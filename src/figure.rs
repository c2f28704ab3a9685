//! Figure model shared by the on-screen chart and the PNG export.
//!
//! A [`Figure`] is rebuilt on every pipeline run and holds one
//! [`PlotSeries`] per successfully parsed upload. Scaled values are computed
//! on demand from the raw table; they are never stored.

use crate::color::{series_style, SeriesStyle};
use crate::data::loader::ParseError;
use crate::data::model::DataTable;
use crate::units::UnitChoice;

// ---------------------------------------------------------------------------
// Fixed axis / styling policy
// ---------------------------------------------------------------------------

/// Fixed cosmetic settings. Sizes are in typographic points.
pub mod policy {
    /// Visible x range (time, ns).
    pub const X_MIN: f64 = 0.0;
    pub const X_MAX: f64 = 251.0;
    /// Major x ticks: 0, 50, ..., 250.
    pub const X_TICKS: [f64; 6] = [0.0, 50.0, 100.0, 150.0, 200.0, 250.0];

    pub const X_LABEL: &str = "Time (ns)";

    pub const LINE_WIDTH: f64 = 1.5;
    pub const LINE_OPACITY: f64 = 1.0;
    pub const FONT_SIZE: f64 = 14.0;
    pub const LEGEND_LINE_WIDTH: f64 = 4.0;
    pub const SPINE_WIDTH: f64 = 1.5;
    pub const TICK_LENGTH: f64 = 6.0;
    pub const TICK_WIDTH: f64 = 1.5;

    /// Fraction of the data span added above and below the y data.
    pub const Y_MARGIN: f64 = 0.05;
}

/// y-axis label for a unit, e.g. `RMSD (nm)`.
pub fn y_label(unit: UnitChoice) -> String {
    format!("RMSD ({})", unit.axis_label())
}

/// Download filename for a unit, e.g. `RMSD_plot_Å.png`.
pub fn export_file_name(unit: UnitChoice) -> String {
    format!("RMSD_plot_{}.png", unit.axis_label())
}

// ---------------------------------------------------------------------------
// PlotSeries
// ---------------------------------------------------------------------------

/// One upload's data plus its positional style.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    /// Position among all uploads (successful or not).
    pub index: usize,
    /// Name of the file the series came from.
    pub source: String,
    pub style: SeriesStyle,
    table: DataTable,
    scale_factor: f64,
}

impl PlotSeries {
    /// Wrap a parsed table. Fails when the table has no value column.
    pub fn new(
        index: usize,
        source: impl Into<String>,
        table: DataTable,
        unit: UnitChoice,
    ) -> Result<Self, ParseError> {
        if table.n_cols() < 2 {
            return Err(ParseError::TooFewColumns {
                found: table.n_cols(),
            });
        }
        Ok(PlotSeries {
            index,
            source: source.into(),
            style: series_style(index),
            table,
            scale_factor: unit.scale_factor(),
        })
    }

    pub fn len(&self) -> usize {
        self.table.n_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Raw parsed table (unscaled).
    pub fn table(&self) -> &DataTable {
        &self.table
    }

    /// `(time, raw_value * scale_factor)` pairs in file order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let scale = self.scale_factor;
        self.table.rows().map(move |r| (r[0], r[1] * scale))
    }

    /// Min/max of the finite scaled values.
    fn value_bounds(&self) -> Option<(f64, f64)> {
        self.points()
            .map(|(_, y)| y)
            .filter(|y| y.is_finite())
            .fold(None, |acc, y| match acc {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            })
    }
}

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

/// Everything needed to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub unit: UnitChoice,
    pub series: Vec<PlotSeries>,
}

impl Figure {
    pub fn new(unit: UnitChoice) -> Self {
        Figure {
            unit,
            series: Vec::new(),
        }
    }

    /// Add the table parsed from upload `index`.
    pub fn add_series(
        &mut self,
        index: usize,
        source: impl Into<String>,
        table: DataTable,
    ) -> Result<(), ParseError> {
        let series = PlotSeries::new(index, source, table, self.unit)?;
        self.series.push(series);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn x_label(&self) -> &'static str {
        policy::X_LABEL
    }

    pub fn y_label(&self) -> String {
        y_label(self.unit)
    }

    pub fn export_file_name(&self) -> String {
        export_file_name(self.unit)
    }

    /// Auto-ranged y limits: data span padded by [`policy::Y_MARGIN`] on
    /// both sides. A flat series is padded by 5 % of its magnitude (or 1.0
    /// around zero); no finite data gives `0..1`.
    pub fn y_range(&self) -> (f64, f64) {
        let bounds = self
            .series
            .iter()
            .filter_map(PlotSeries::value_bounds)
            .reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)));

        let Some((lo, hi)) = bounds else {
            return (0.0, 1.0);
        };
        let span = hi - lo;
        let pad = if span > 0.0 {
            span * policy::Y_MARGIN
        } else if lo != 0.0 {
            lo.abs() * policy::Y_MARGIN
        } else {
            1.0
        };
        (lo - pad, hi + pad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_text;

    fn figure(unit: UnitChoice, texts: &[&str]) -> Figure {
        let mut fig = Figure::new(unit);
        for (i, text) in texts.iter().enumerate() {
            fig.add_series(i, format!("f{i}.xvg"), parse_text(text).unwrap())
                .unwrap();
        }
        fig
    }

    #[test]
    fn points_are_scaled_on_demand() {
        let fig = figure(UnitChoice::Nanometer, &["0 1.0\n1 2.0\n"]);
        let pts: Vec<(f64, f64)> = fig.series[0].points().collect();
        assert_eq!(pts, vec![(0.0, 0.1), (1.0, 0.2)]);
        // raw table is untouched
        let raw: Vec<f64> = fig.series[0].table().column(1).unwrap().collect();
        assert_eq!(raw, vec![1.0, 2.0]);
    }

    #[test]
    fn narrow_table_is_rejected() {
        let mut fig = Figure::new(UnitChoice::Angstrom);
        let err = fig
            .add_series(0, "one.txt", parse_text("1\n2\n").unwrap())
            .unwrap_err();
        assert_eq!(err, ParseError::TooFewColumns { found: 1 });
        assert!(fig.is_empty());
    }

    #[test]
    fn y_range_spans_all_series_with_margin() {
        let fig = figure(UnitChoice::Angstrom, &["0 1.0\n1 2.0\n", "0 5.0\n1 3.0\n"]);
        let (lo, hi) = fig.y_range();
        assert!((lo - 0.8).abs() < 1e-12);
        assert!((hi - 5.2).abs() < 1e-12);
    }

    #[test]
    fn y_range_handles_flat_and_non_finite_data() {
        let flat = figure(UnitChoice::Angstrom, &["0 2.0\n1 2.0\n"]);
        let (lo, hi) = flat.y_range();
        assert!((lo - 1.9).abs() < 1e-12 && (hi - 2.1).abs() < 1e-12);

        let zero = figure(UnitChoice::Angstrom, &["0 0\n1 0\n"]);
        assert_eq!(zero.y_range(), (-1.0, 1.0));

        let nan = figure(UnitChoice::Angstrom, &["0 nan\n1 inf\n"]);
        assert_eq!(nan.y_range(), (0.0, 1.0));
    }

    #[test]
    fn labels_follow_unit() {
        let fig = Figure::new(UnitChoice::Nanometer);
        assert_eq!(fig.x_label(), "Time (ns)");
        assert_eq!(fig.y_label(), "RMSD (nm)");
        assert_eq!(fig.export_file_name(), "RMSD_plot_nm.png");
        assert_eq!(export_file_name(UnitChoice::Angstrom), "RMSD_plot_Å.png");
    }
}
