use std::path::Path;

use crate::error::CleanError;

/// On-disk table format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Delimited text; the delimiter comes from the caller.
    Delimited,
    /// Tab-separated text regardless of the configured delimiter.
    Tsv,
    /// `[{ "col": value, ... }, ...]`
    JsonRecords,
    Parquet,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self, CleanError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" | "txt" => Ok(Format::Delimited),
            "tsv" => Ok(Format::Tsv),
            "json" => Ok(Format::JsonRecords),
            "parquet" | "pq" => Ok(Format::Parquet),
            other => Err(CleanError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Delimiter byte for text formats.
    pub fn delimiter(self, configured: u8) -> u8 {
        match self {
            Format::Tsv => b'\t',
            _ => configured,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_on_extension_case_insensitively() {
        assert_eq!(Format::from_path(Path::new("a.CSV")).unwrap(), Format::Delimited);
        assert_eq!(Format::from_path(Path::new("a.pq")).unwrap(), Format::Parquet);
        assert_eq!(Format::from_path(Path::new("a.tsv")).unwrap().delimiter(b','), b'\t');
    }

    #[test]
    fn rejects_unknown_extension() {
        assert_eq!(
            Format::from_path(Path::new("table.xlsx")),
            Err(CleanError::UnsupportedFormat("xlsx".into()))
        );
    }
}
