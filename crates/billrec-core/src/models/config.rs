//! Configuration structures for the extraction pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::invoice::layout::LayoutConfig;
use crate::reconcile::DEFAULT_TOLERANCE;

/// Main configuration for billrec.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BillrecConfig {
    /// Extraction and verification settings.
    pub extraction: ExtractionConfig,

    /// Template layout (net total strategies and line item rules).
    pub layout: LayoutConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Report output configuration.
    pub output: OutputConfig,
}

/// Extraction and verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Largest absolute difference between totals that still counts as a match.
    pub reconciliation_tolerance: Decimal,

    /// Number of characters after the charged amount label scanned for its value.
    pub verify_window_chars: usize,

    /// Treat a first page without account markers as a summary page and skip it.
    pub skip_marker_less_first_page: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            reconciliation_tolerance: DEFAULT_TOLERANCE,
            verify_window_chars: 200,
            skip_marker_less_first_page: true,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to read per document (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { max_pages: 0 }
    }
}

/// Report output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// File name of the records report (extension follows the chosen format).
    pub records_file: String,

    /// File name of the numbered error log.
    pub errors_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            records_file: "relatorio".to_string(),
            errors_file: "log_erros.txt".to_string(),
        }
    }
}

impl BillrecConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BillrecConfig::default();
        assert_eq!(config.extraction.reconciliation_tolerance, DEFAULT_TOLERANCE);
        assert_eq!(config.extraction.verify_window_chars, 200);
        assert!(!config.layout.net_total_rules.is_empty());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"extraction": {"verify_window_chars": 80}}"#).unwrap();

        let config = BillrecConfig::from_file(&path).unwrap();
        assert_eq!(config.extraction.verify_window_chars, 80);
        assert!(config.extraction.skip_marker_less_first_page);
        assert_eq!(config.output.errors_file, "log_erros.txt");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BillrecConfig::default();
        config.pdf.max_pages = 3;
        config.save(&path).unwrap();

        let loaded = BillrecConfig::from_file(&path).unwrap();
        assert_eq!(loaded.pdf.max_pages, 3);
        assert_eq!(loaded.layout.line_items.len(), config.layout.line_items.len());
    }
}
