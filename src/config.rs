//! # Report Configuration
//!
//! Page geometry, vertical rhythm, and user-visible labels. Every field has
//! a serde default, so a request can carry a partial `config` object (or
//! none at all) and still get the standard A4 layout.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Everything the composer needs besides the project itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub page: PageGeometry,
    pub spacing: Spacing,
    pub labels: ReportLabels,

    /// Directory relative image references are resolved against.
    pub image_dir: Option<PathBuf>,

    /// Flate-compress page content streams.
    pub compress: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            page: PageGeometry::default(),
            spacing: Spacing::default(),
            labels: ReportLabels::default(),
            image_dir: None,
            compress: true,
        }
    }
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Page size, margins and the low-water mark that triggers a page break.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub size: PageSize,
    pub margin_left: f64,
    pub margin_right: f64,
    /// Distance from the page top to the first baseline on a page.
    pub margin_top: f64,
    /// Baselines below this height (measured from the page bottom) force a
    /// page break before anything else is written.
    pub low_water: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            margin_left: 40.0,
            margin_right: 40.0,
            margin_top: 60.0,
            low_water: 80.0,
        }
    }
}

impl PageGeometry {
    pub fn width(&self) -> f64 {
        self.size.dimensions().0
    }

    pub fn height(&self) -> f64 {
        self.size.dimensions().1
    }

    /// Baseline of the first line on a fresh page.
    pub fn top(&self) -> f64 {
        self.height() - self.margin_top
    }

    pub fn left(&self) -> f64 {
        self.margin_left
    }

    pub fn right(&self) -> f64 {
        self.width() - self.margin_right
    }

    pub fn content_width(&self) -> f64 {
        self.right() - self.left()
    }
}

/// Fixed vertical advances, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spacing {
    /// Title baseline to metadata baseline.
    pub title_advance: f64,
    /// Metadata baseline to the first body baseline.
    pub metadata_advance: f64,
    /// Section heading to its first line.
    pub notes_heading_advance: f64,
    pub line_height: f64,
    /// Gap after the last notes line.
    pub notes_gap: f64,
    pub image_max_height: f64,
    pub image_gap: f64,
    pub table_heading_advance: f64,
    /// Header labels to the rule under them.
    pub header_advance: f64,
    /// Rule to the first row.
    pub rule_advance: f64,
    pub row_height: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            title_advance: 20.0,
            metadata_advance: 30.0,
            notes_heading_advance: 16.0,
            line_height: 12.0,
            notes_gap: 10.0,
            image_max_height: 250.0,
            image_gap: 10.0,
            table_heading_advance: 18.0,
            header_advance: 14.0,
            rule_advance: 6.0,
            row_height: 14.0,
        }
    }
}

/// Every user-visible string in the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLabels {
    /// Prefix of the title block: `"<title> - <project name>"`.
    pub title: String,
    pub generated_by: String,
    pub generated_at: String,
    pub notes_heading: String,
    pub devices_heading: String,
    pub columns: ColumnLabels,
}

impl Default for ReportLabels {
    fn default() -> Self {
        Self::english()
    }
}

impl ReportLabels {
    pub fn english() -> Self {
        Self {
            title: "Report".to_string(),
            generated_by: "Generated by:".to_string(),
            generated_at: "Date:".to_string(),
            notes_heading: "Notes:".to_string(),
            devices_heading: "Devices:".to_string(),
            columns: ColumnLabels {
                name: "Name".to_string(),
                device_type: "Type".to_string(),
                ip: "IP".to_string(),
                mac: "MAC".to_string(),
                gateway: "Gateway".to_string(),
                dns: "DNS".to_string(),
            },
        }
    }

    /// The labels the web application ships with.
    pub fn portuguese() -> Self {
        Self {
            title: "Relatório".to_string(),
            generated_by: "Gerado por:".to_string(),
            generated_at: "Data:".to_string(),
            notes_heading: "Observações:".to_string(),
            devices_heading: "Dispositivos:".to_string(),
            columns: ColumnLabels {
                name: "Nome".to_string(),
                device_type: "Tipo".to_string(),
                ip: "IP".to_string(),
                mac: "MAC".to_string(),
                gateway: "Gateway".to_string(),
                dns: "DNS".to_string(),
            },
        }
    }
}

/// Device table header labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnLabels {
    pub name: String,
    pub device_type: String,
    pub ip: String,
    pub mac: String,
    pub gateway: String,
    pub dns: String,
}

impl Default for ColumnLabels {
    fn default() -> Self {
        ReportLabels::english().columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_geometry() {
        let page = PageGeometry::default();
        assert!((page.width() - 595.28).abs() < 1e-9);
        assert!((page.top() - 781.89).abs() < 1e-9);
        assert!((page.right() - 555.28).abs() < 1e-9);
        assert!((page.content_width() - 515.28).abs() < 1e-9);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let json = r#"{ "page": { "low_water": 100 }, "compress": false }"#;
        let config: ReportConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.page.low_water, 100.0);
        assert_eq!(config.page.margin_left, 40.0);
        assert_eq!(config.spacing.row_height, 14.0);
        assert!(!config.compress);
        assert_eq!(config.labels, ReportLabels::english());
    }

    #[test]
    fn custom_page_size() {
        let json = r#"{ "size": { "Custom": { "width": 300, "height": 400 } } }"#;
        let page: PageGeometry = serde_json::from_str(json).unwrap();
        assert_eq!(page.size.dimensions(), (300.0, 400.0));
        assert_eq!(page.top(), 340.0);
    }

    #[test]
    fn portuguese_labels() {
        let labels = ReportLabels::portuguese();
        assert_eq!(labels.notes_heading, "Observações:");
        assert_eq!(labels.columns.name, "Nome");
    }
}
