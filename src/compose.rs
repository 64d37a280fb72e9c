//! # Report Composer
//!
//! Drives the renderers in a fixed order over one [`LayoutCursor`]:
//!
//! 1. title block and metadata band (always)
//! 2. notes heading and lines (when notes are non-empty)
//! 3. map image (when a reference is set and it loads)
//! 4. device table (always, header-only when there are no devices)
//!
//! Each step leaves the cursor under everything it wrote, so sections never
//! overlap. The composer owns no state between calls.

use chrono::NaiveDateTime;

use crate::config::ReportConfig;
use crate::font::StandardFont;
use crate::layout::image::{embed_image, ImageBox};
use crate::layout::table::{TablePaginator, HEADING_FONT_SIZE};
use crate::layout::text_flow::{flow_text, TextStyle};
use crate::layout::{DrawCommand, ElementRole, LayoutCursor, LayoutElement, LayoutPage, TextRun};
use crate::model::Project;

pub const TITLE_FONT_SIZE: f64 = 16.0;
pub const METADATA_FONT_SIZE: f64 = 10.0;
pub const BODY_FONT_SIZE: f64 = 10.0;

/// `DD/MM/YYYY HH:MM:SS`
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Text of the title block.
pub fn report_title(config: &ReportConfig, project: &Project) -> String {
    format!("{} - {}", config.labels.title, project.name)
}

/// Lays a project snapshot out into pages.
pub struct ReportComposer<'a> {
    config: &'a ReportConfig,
}

impl<'a> ReportComposer<'a> {
    pub fn new(config: &'a ReportConfig) -> Self {
        Self { config }
    }

    pub fn layout(&self, project: &Project, generated_by: &str, generated_at: &NaiveDateTime) -> Vec<LayoutPage> {
        let mut cursor = LayoutCursor::new(self.config.page);

        self.title_block(&mut cursor, project, generated_by, generated_at);

        if let Some(notes) = project.notes_text() {
            self.notes_section(&mut cursor, notes);
        }

        if let Some(reference) = project.map_reference() {
            self.image_section(&mut cursor, reference);
        }

        let labels = &self.config.labels;
        let summary = TablePaginator::new(&labels.columns, &self.config.spacing).layout(
            &mut cursor,
            &labels.devices_heading,
            &project.devices,
        );
        log::debug!(
            "project {}: {} device rows over {} table page(s)",
            project.id,
            summary.rows,
            summary.pages
        );

        cursor.finish()
    }

    fn title_block(&self, cursor: &mut LayoutCursor, project: &Project, generated_by: &str, generated_at: &NaiveDateTime) {
        let geometry = *cursor.geometry();
        let labels = &self.config.labels;
        let spacing = &self.config.spacing;

        cursor.push(LayoutElement::text(
            ElementRole::Title,
            StandardFont::HelveticaBold,
            TITLE_FONT_SIZE,
            geometry.left(),
            cursor.y(),
            report_title(self.config, project),
        ));
        cursor.advance(spacing.title_advance);

        let by = format!("{} {}", labels.generated_by, generated_by);
        let at = format!("{} {}", labels.generated_at, format_timestamp(generated_at));
        let at_width = StandardFont::Helvetica.measure(&at, METADATA_FONT_SIZE);
        let y = cursor.y();
        cursor.push(LayoutElement {
            role: ElementRole::Metadata,
            draw: DrawCommand::Text {
                font: StandardFont::Helvetica,
                size: METADATA_FONT_SIZE,
                runs: vec![
                    TextRun { x: geometry.left(), y, text: by },
                    TextRun { x: geometry.right() - at_width, y, text: at },
                ],
            },
        });
        cursor.advance(spacing.metadata_advance);
    }

    fn notes_section(&self, cursor: &mut LayoutCursor, notes: &str) {
        let spacing = &self.config.spacing;
        let left = cursor.geometry().left();

        if !cursor.fits(spacing.notes_heading_advance) {
            cursor.page_break();
        }
        cursor.push(LayoutElement::text(
            ElementRole::NotesHeading,
            StandardFont::HelveticaBold,
            HEADING_FONT_SIZE,
            left,
            cursor.y(),
            self.config.labels.notes_heading.as_str(),
        ));
        cursor.advance(spacing.notes_heading_advance);

        let style = TextStyle {
            font: StandardFont::Helvetica,
            size: BODY_FONT_SIZE,
            line_height: spacing.line_height,
        };
        flow_text(cursor, notes, left, style, ElementRole::NotesLine);
        cursor.advance(spacing.notes_gap);
    }

    fn image_section(&self, cursor: &mut LayoutCursor, reference: &str) {
        let geometry = *cursor.geometry();
        let bounds = ImageBox {
            x: geometry.left(),
            max_width: geometry.content_width(),
            max_height: self.config.spacing.image_max_height,
            gap: self.config.spacing.image_gap,
        };

        // A map that cannot be read is left out of the report. The error stops
        // here on purpose and never reaches the caller.
        match embed_image(cursor, reference, self.config.image_dir.as_deref(), bounds) {
            Ok(placement) => log::debug!(
                "map image placed on page {} at ({:.2}, {:.2}), {:.2}x{:.2}",
                placement.page_index + 1,
                placement.x,
                placement.y,
                placement.width,
                placement.height
            ),
            Err(e) => log::debug!("map image {:?} skipped: {}", reference, e),
        }
    }
}
