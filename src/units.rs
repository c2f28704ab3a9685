use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// UnitChoice – RMSD axis unit
// ---------------------------------------------------------------------------

/// Unit the RMSD column is displayed in.
///
/// Trajectory tools write RMSD in nanometres or ångströms depending on the
/// package; the input files are assumed to be in ångströms and are rescaled
/// by [`UnitChoice::scale_factor`] for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitChoice {
    #[default]
    Angstrom,
    Nanometer,
}

impl UnitChoice {
    /// Choices in the order the selector shows them.
    pub const ALL: [UnitChoice; 2] = [UnitChoice::Angstrom, UnitChoice::Nanometer];

    const NANOMETER_LABEL: &'static str = "nm (Nanometer)";
    const ANGSTROM_LABEL: &'static str = "Å (Angstrom)";

    /// Map a selector label to a unit.
    ///
    /// Only the nanometre label is matched; every other label, including any
    /// future third option, falls back to ångström.
    pub fn from_label(label: &str) -> Self {
        if label == Self::NANOMETER_LABEL {
            UnitChoice::Nanometer
        } else {
            UnitChoice::Angstrom
        }
    }

    /// Label shown in the unit selector.
    pub fn display_label(self) -> &'static str {
        match self {
            UnitChoice::Angstrom => Self::ANGSTROM_LABEL,
            UnitChoice::Nanometer => Self::NANOMETER_LABEL,
        }
    }

    /// Multiplier applied to the raw RMSD column.
    pub fn scale_factor(self) -> f64 {
        match self {
            UnitChoice::Angstrom => 1.0,
            UnitChoice::Nanometer => 0.1,
        }
    }

    /// Short unit string used in the y-axis label and the export filename.
    pub fn axis_label(self) -> &'static str {
        match self {
            UnitChoice::Angstrom => "Å",
            UnitChoice::Nanometer => "nm",
        }
    }
}

impl fmt::Display for UnitChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

impl FromStr for UnitChoice {
    type Err = String;

    /// Parse the short names accepted on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "angstrom" | "a" | "å" | "Å" => Ok(UnitChoice::Angstrom),
            "nanometer" | "nanometre" | "nm" => Ok(UnitChoice::Nanometer),
            other => Err(format!(
                "unknown unit '{other}' (expected 'angstrom' or 'nanometer')"
            )),
        }
    }
}
