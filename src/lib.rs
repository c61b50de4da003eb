//! Core engine of a standard-cell library viewer.
//!
//! Loads the parsed contents of one or more timing/power library files,
//! lets a presentation layer check an arbitrary subset of cells across
//! libraries, and drills into a specific attribute (area, leakage power,
//! timing arc, internal-power arc) to inspect or compare values and curves
//! across the selection.
//!
//! File-format parsing and all rendering live outside this crate: the
//! parser hands its extraction over through [`source::LibertySource`], and
//! [`session::Session`] exposes candidate lists, table rows and resolved
//! curves ready to display.

pub mod catalog;
pub mod project;
pub mod resolve;
pub mod selection;
pub mod series;
pub mod session;
pub mod shape;
pub mod source;
pub mod types;

use thiserror::Error;

/// Table cells and discriminators stay strings all the way from the source
/// file; this is the single fallible conversion point used at the
/// plotting/comparison boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot interpret {0:?} as a number")]
pub struct BadNumber(pub String);

/// Parse one table cell or axis value.
pub fn parse_numeric(raw: &str) -> Result<f64, BadNumber> {
    raw.trim()
        .parse()
        .map_err(|_| BadNumber(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numeric_accepts_library_spellings() {
        assert_eq!(parse_numeric("0.0125"), Ok(0.0125));
        assert_eq!(parse_numeric(" 1e-3 "), Ok(0.001));
        assert_eq!(parse_numeric("3.40e+00"), Ok(3.4));
        assert!(parse_numeric("").is_err());
        assert!(parse_numeric("n/a").is_err());
    }
}
