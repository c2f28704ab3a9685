/// Data layer: uploaded buffers and the line parser.
///
/// Architecture:
/// ```text
///  .xvg / .txt bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  drop '#'/'@' lines, parse rows → DataTable
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ DataTable │  rectangular f64 rows (time, value, ...)
///   └───────────┘
/// ```

pub mod loader;
pub mod model;
