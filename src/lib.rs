//! Overlay RMSD trajectories and export them as publication PNGs.
//!
//! The library is split so the pure parts can be driven without a window:
//!
//! * [`data::loader::parse`] turns an uploaded buffer into a [`data::model::DataTable`],
//! * [`pipeline::run`] parses a batch and builds a [`figure::Figure`],
//! * [`export::render_png`] encodes a figure as PNG bytes.
//!
//! [`app::RmsdPlotterApp`] wraps the same calls in an eframe UI.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod export;
pub mod figure;
pub mod pipeline;
pub mod state;
pub mod ui;
pub mod units;
