use thiserror::Error;

use super::model::DataTable;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why one uploaded file could not be turned into a plottable series.
///
/// Line numbers are 1-based positions in the original file, counting the
/// skipped comment lines.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("file is not valid UTF-8 text: {0}")]
    Decode(#[from] std::str::Utf8Error),

    #[error("no data rows left after skipping '#' and '@' lines")]
    Empty,

    #[error("line {line}: expected {expected} columns, found {found}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: could not convert '{token}' to a number")]
    InvalidNumber { line: usize, token: String },

    #[error("need at least 2 columns (time, value), found {found}")]
    TooFewColumns { found: usize },
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Prefixes marking comment (`#`) and plot-metadata (`@`) lines in
/// `.xvg`-style files.
pub const COMMENT_PREFIXES: [char; 2] = ['#', '@'];

/// Whether a raw line is a comment/metadata line.
///
/// Only the very first character counts here; `#` further into a line is
/// stripped by the parser.
pub fn is_metadata_line(line: &str) -> bool {
    line.starts_with(&COMMENT_PREFIXES[..])
}

/// Drop everything from the first `#` on, so trailing and indented comments
/// never reach the tokenizer.
fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(at) => &line[..at],
        None => line,
    }
}

/// Decode an uploaded buffer as UTF-8 and parse it.
pub fn parse(bytes: &[u8]) -> Result<DataTable, ParseError> {
    let text = std::str::from_utf8(bytes)?;
    parse_text(text)
}

/// Parse whitespace-delimited numeric text into a rectangular table.
///
/// Lines starting with `#` or `@` are dropped, as is anything after a `#`
/// elsewhere on a line; lines left blank are skipped. Every
/// remaining line must have the same number of columns as the first one and
/// every token must parse as `f64` (`nan` and `inf` are accepted).
pub fn parse_text(text: &str) -> Result<DataTable, ParseError> {
    // Trajectory writers sometimes emit a BOM.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut n_cols: Option<usize> = None;
    let mut values: Vec<f64> = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        if is_metadata_line(line) {
            continue;
        }
        let line_no = idx + 1;

        let row_start = values.len();
        for token in strip_comment(line).split_whitespace() {
            let v = token
                .parse::<f64>()
                .map_err(|_| ParseError::InvalidNumber {
                    line: line_no,
                    token: token.to_string(),
                })?;
            values.push(v);
        }

        let found = values.len() - row_start;
        if found == 0 {
            continue;
        }
        match n_cols {
            None => n_cols = Some(found),
            Some(expected) if expected != found => {
                return Err(ParseError::Ragged {
                    line: line_no,
                    expected,
                    found,
                });
            }
            Some(_) => {}
        }
    }

    match n_cols {
        Some(n) => Ok(DataTable::from_flat(n, values)),
        None => Err(ParseError::Empty),
    }
}
