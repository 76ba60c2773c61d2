//! Header row normalization.

use crate::error::{IngestError, Result};

/// Normalizes a header label: strips a stray BOM and surrounding whitespace.
pub fn normalize_header(value: &str) -> String {
    value.trim_matches('\u{feff}').trim().to_string()
}

/// Normalize a parsed header row, rejecting rows with no usable labels.
///
/// Duplicated labels are kept; they are a validation finding, not a parse error.
pub fn normalize_headers<'a, I>(raw: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = &'a str>,
{
    let headers: Vec<String> = raw.into_iter().map(normalize_header).collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(IngestError::NoHeader);
    }
    if let Some(position) = headers.iter().position(String::is_empty) {
        return Err(IngestError::EmptyColumnName {
            position: position + 1,
        });
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  station_id  "), "station_id");
        assert_eq!(normalize_header("\u{feff}station_id"), "station_id");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let headers = normalize_headers(["energy_kwh", "energy_kwh"]).unwrap();
        assert_eq!(headers, vec!["energy_kwh", "energy_kwh"]);
    }

    #[test]
    fn test_blank_header_row() {
        assert!(matches!(
            normalize_headers(["", " "]),
            Err(IngestError::NoHeader)
        ));
    }

    #[test]
    fn test_empty_label() {
        assert!(matches!(
            normalize_headers(["station_id", ""]),
            Err(IngestError::EmptyColumnName { position: 2 })
        ));
    }
}
