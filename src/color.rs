use palette::named;
use palette::Srgb;

// ---------------------------------------------------------------------------
// Fixed series palette
// ---------------------------------------------------------------------------

/// Line colours, assigned to uploads in order and reused cyclically.
pub const PALETTE: [Srgb<u8>; 7] = [
    named::RED,
    named::GREEN,
    named::BLUE,
    named::MAGENTA,
    named::BLACK,
    named::ORANGE,
    named::PURPLE,
];

/// Colour names matching [`PALETTE`], for logs and tooltips.
pub const PALETTE_NAMES: [&str; 7] = [
    "red", "green", "blue", "magenta", "black", "orange", "purple",
];

// ---------------------------------------------------------------------------
// SeriesStyle – colour + legend label for one upload slot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStyle {
    pub color: Srgb<u8>,
    pub label: String,
}

/// Style for the upload at position `index` (0-based among *all* uploads,
/// whether or not earlier ones parsed).
pub fn series_style(index: usize) -> SeriesStyle {
    SeriesStyle {
        color: PALETTE[index % PALETTE.len()],
        label: format!("Dataset {}", index + 1),
    }
}

/// Human-readable palette name for the colour at `index`.
pub fn color_name(index: usize) -> &'static str {
    PALETTE_NAMES[index % PALETTE_NAMES.len()]
}
