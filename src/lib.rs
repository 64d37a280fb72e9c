//! # netmap-report
//!
//! Composes the printable report of a network topology project: a title
//! block, the project's notes, its map image and a device table that
//! continues across pages with its header repeated.
//!
//! The page is the unit of layout. Every renderer writes into a fixed-size
//! page through a shared cursor and breaks to a fresh page when the cursor
//! reaches the low-water mark, so no row or line is ever sliced in half.
//!
//! ## Architecture
//!
//! ```text
//! Project snapshot (struct or JSON)
//!       ↓
//!   [model]    — Project, Device, ReportRequest
//!       ↓
//!   [compose]  — fixed section order over one LayoutCursor
//!       ↓
//!   [layout]   — text flow, image box, paginated device table
//!       ↓
//!   [pdf]      — serialize to PDF bytes
//! ```
//!
//! Composition is a pure function of its inputs: it reads no clock, shares
//! no state between calls and never fails. The only fallible step inside it,
//! loading the map image, is absorbed by the composer.

pub mod compose;
pub mod config;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;

use chrono::NaiveDateTime;

use compose::{report_title, ReportComposer};
use config::ReportConfig;
use error::ReportError;
use model::{Project, ReportRequest};
use pdf::{DocumentInfo, PdfWriter};

/// Mime type of every composed report.
pub const MIME_TYPE: &str = "application/pdf";

/// A finished report, ready to be offered as a download.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub filename: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Download name for a project's report: `relatorio_<id>.pdf`.
pub fn report_filename(project: &Project) -> String {
    format!("relatorio_{}.pdf", project.id)
}

/// Compose a project report with the default configuration.
///
/// This is the primary entry point. Always returns a valid PDF with at
/// least one page.
pub fn compose(project: &Project, generated_by: &str, generated_at: &NaiveDateTime) -> Vec<u8> {
    compose_with(&ReportConfig::default(), project, generated_by, generated_at)
}

/// Compose a project report with an explicit configuration.
pub fn compose_with(
    config: &ReportConfig,
    project: &Project,
    generated_by: &str,
    generated_at: &NaiveDateTime,
) -> Vec<u8> {
    let pages = ReportComposer::new(config).layout(project, generated_by, generated_at);
    let info = DocumentInfo {
        title: report_title(config, project),
        author: generated_by.to_string(),
        creation_date: *generated_at,
    };
    let bytes = PdfWriter::new(config.compress).write(&pages, &info);
    log::info!(
        "composed report for project {} ({} page(s), {} bytes)",
        project.id,
        pages.len(),
        bytes.len()
    );
    bytes
}

/// Compose and wrap the bytes with their download name and mime type.
pub fn compose_report(
    config: &ReportConfig,
    project: &Project,
    generated_by: &str,
    generated_at: &NaiveDateTime,
) -> RenderedReport {
    RenderedReport {
        filename: report_filename(project),
        mime_type: MIME_TYPE,
        bytes: compose_with(config, project, generated_by, generated_at),
    }
}

/// Parse a [`ReportRequest`] from JSON.
pub fn parse_request(json: &str) -> Result<ReportRequest, ReportError> {
    Ok(serde_json::from_str(json)?)
}

/// Compose a parsed request. `now` is used only when the request carries no
/// `generated_at`.
pub fn compose_request(request: &ReportRequest, now: NaiveDateTime) -> RenderedReport {
    let generated_at = request.generated_at.unwrap_or(now);
    compose_report(&request.config, &request.project, &request.generated_by, &generated_at)
}

/// Compose a report described as JSON.
///
/// The request must carry `generated_at`; use [`parse_request`] and
/// [`compose_request`] to supply a clock reading instead.
pub fn compose_json(json: &str) -> Result<RenderedReport, ReportError> {
    let request = parse_request(json)?;
    let generated_at = request.generated_at.ok_or(ReportError::MissingTimestamp)?;
    Ok(compose_request(&request, generated_at))
}
