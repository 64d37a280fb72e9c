//! # Device Table
//!
//! A fixed-column listing of devices. The column set is data
//! ([`DEVICE_COLUMNS`]): each entry names the device field it shows, its
//! offset from the left margin, and its character budget. The paginator only
//! walks that list, so adding a column never touches the break logic.
//!
//! Pagination rule: before every row the cursor is checked against the
//! low-water mark. If the row would start under it, the page is finalized,
//! a new page is opened, and the header row is drawn again before the row.
//! Rows are single-line, so a row is never split.

use super::page_break::rows_that_fit;
use super::{DrawCommand, ElementRole, LayoutCursor, LayoutElement, TextRun};
use crate::config::{ColumnLabels, PageGeometry, Spacing};
use crate::font::StandardFont;
use crate::model::{resolve, Device, FALLBACK};

/// Font size of header labels and rows.
pub const TABLE_FONT_SIZE: f64 = 9.0;
/// Font size of the table heading.
pub const HEADING_FONT_SIZE: f64 = 12.0;

/// A device field shown in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceField {
    Name,
    Type,
    Ip,
    Mac,
    Gateway,
    Dns,
}

impl DeviceField {
    /// Display value, before truncation.
    pub fn value<'a>(&self, device: &'a Device) -> &'a str {
        let raw = match self {
            DeviceField::Type => return device.category(),
            DeviceField::Name => device.name.as_deref(),
            DeviceField::Ip => device.ip.as_deref(),
            DeviceField::Mac => device.mac.as_deref(),
            DeviceField::Gateway => device.gateway.as_deref(),
            DeviceField::Dns => device.dns.as_deref(),
        };
        resolve(raw, None, FALLBACK)
    }

    pub fn label<'a>(&self, labels: &'a ColumnLabels) -> &'a str {
        match self {
            DeviceField::Name => labels.name.as_str(),
            DeviceField::Type => labels.device_type.as_str(),
            DeviceField::Ip => labels.ip.as_str(),
            DeviceField::Mac => labels.mac.as_str(),
            DeviceField::Gateway => labels.gateway.as_str(),
            DeviceField::Dns => labels.dns.as_str(),
        }
    }
}

/// One table column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub field: DeviceField,
    /// Offset from the left margin, in points.
    pub offset: f64,
    /// Maximum characters shown.
    pub budget: usize,
}

pub const DEVICE_COLUMNS: [Column; 6] = [
    Column { field: DeviceField::Name, offset: 0.0, budget: 18 },
    Column { field: DeviceField::Type, offset: 120.0, budget: 12 },
    Column { field: DeviceField::Ip, offset: 220.0, budget: 15 },
    Column { field: DeviceField::Mac, offset: 300.0, budget: 15 },
    Column { field: DeviceField::Gateway, offset: 380.0, budget: 12 },
    Column { field: DeviceField::Dns, offset: 460.0, budget: 12 },
];

/// Cut `text` to at most `budget` characters.
pub fn truncate(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// The text a column shows for a device.
pub fn cell_text<'a>(device: &'a Device, column: &Column) -> &'a str {
    truncate(column.field.value(device), column.budget)
}

/// Rows that fit on a page the table continues onto.
pub fn rows_per_page(geometry: &PageGeometry, spacing: &Spacing) -> usize {
    let first_row = geometry.top() - spacing.header_advance - spacing.rule_advance;
    rows_that_fit(first_row, spacing.row_height, geometry.low_water)
}

/// What the paginator produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSummary {
    pub rows: usize,
    /// Pages holding a header row.
    pub pages: usize,
}

/// Lays out the device table.
pub struct TablePaginator<'a> {
    pub columns: &'a [Column],
    pub labels: &'a ColumnLabels,
    pub spacing: &'a Spacing,
}

impl<'a> TablePaginator<'a> {
    pub fn new(labels: &'a ColumnLabels, spacing: &'a Spacing) -> Self {
        Self {
            columns: &DEVICE_COLUMNS,
            labels,
            spacing,
        }
    }

    /// Heading, header, then one row per device in order.
    pub fn layout(&self, cursor: &mut LayoutCursor, heading: &str, devices: &[Device]) -> TableSummary {
        // Keep the heading and header together with the first row.
        let lead = self.spacing.table_heading_advance + self.spacing.header_advance + self.spacing.rule_advance;
        if !cursor.fits(lead) {
            cursor.page_break();
        }

        let left = cursor.geometry().left();
        cursor.push(LayoutElement::text(
            ElementRole::TableHeading,
            StandardFont::HelveticaBold,
            HEADING_FONT_SIZE,
            left,
            cursor.y(),
            heading,
        ));
        cursor.advance(self.spacing.table_heading_advance);

        self.emit_header(cursor);
        let mut pages = 1;

        for device in devices {
            if cursor.below_low_water() {
                cursor.page_break();
                self.emit_header(cursor);
                pages += 1;
            }
            self.emit_row(cursor, device);
        }

        TableSummary {
            rows: devices.len(),
            pages,
        }
    }

    fn emit_header(&self, cursor: &mut LayoutCursor) {
        let geometry = *cursor.geometry();
        let y = cursor.y();
        let runs = self
            .columns
            .iter()
            .map(|col| TextRun {
                x: geometry.left() + col.offset,
                y,
                text: col.field.label(self.labels).to_string(),
            })
            .collect();
        cursor.push(LayoutElement {
            role: ElementRole::TableHeader,
            draw: DrawCommand::Text {
                font: StandardFont::Helvetica,
                size: TABLE_FONT_SIZE,
                runs,
            },
        });
        cursor.advance(self.spacing.header_advance);

        cursor.push(LayoutElement {
            role: ElementRole::TableRule,
            draw: DrawCommand::Rule {
                x1: geometry.left(),
                x2: geometry.right(),
                y: cursor.y(),
                width: 1.0,
            },
        });
        cursor.advance(self.spacing.rule_advance);
    }

    fn emit_row(&self, cursor: &mut LayoutCursor, device: &Device) {
        let left = cursor.geometry().left();
        let y = cursor.y();
        let runs = self
            .columns
            .iter()
            .map(|col| TextRun {
                x: left + col.offset,
                y,
                text: cell_text(device, col).to_string(),
            })
            .collect();
        log::trace!("device {} at y={:.2}", device.id, y);
        cursor.push(LayoutElement {
            role: ElementRole::TableRow,
            draw: DrawCommand::Text {
                font: StandardFont::Helvetica,
                size: TABLE_FONT_SIZE,
                runs,
            },
        });
        cursor.advance(self.spacing.row_height);
    }
}
