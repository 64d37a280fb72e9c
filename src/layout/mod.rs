//! # Page-Aware Layout
//!
//! The report is laid out directly into fixed-size pages. There is no
//! infinite canvas that gets sliced afterwards: every renderer writes at the
//! [`LayoutCursor`]'s baseline and asks the cursor before each write whether
//! the baseline is still above the low-water mark. When it is not, the
//! renderer breaks the page first and writes on the fresh page.
//!
//! Coordinates are PDF user space: origin at the bottom-left corner, `y`
//! growing upwards. The cursor's `y` is the baseline of the next line and
//! decreases as content is written.
//!
//! ```text
//!   compose
//!     ├─ title + metadata     (fixed band at the top of page 1)
//!     ├─ text_flow::flow_text (notes, one line per source line)
//!     ├─ image::embed_image   (map, scaled into a fixed box)
//!     └─ table::TablePaginator (devices, header repeated per page)
//! ```

pub mod image;
pub mod page_break;
pub mod table;
pub mod text_flow;

use crate::config::PageGeometry;
use crate::font::StandardFont;
use crate::image_loader::LoadedImage;

use page_break::{decide_break, BreakDecision};

/// A finished page: size plus everything drawn on it, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
}

impl LayoutPage {
    /// Elements with the given role, in paint order.
    pub fn elements_with_role(&self, role: ElementRole) -> impl Iterator<Item = &LayoutElement> {
        self.elements.iter().filter(move |e| e.role == role)
    }

    pub fn count_role(&self, role: ElementRole) -> usize {
        self.elements_with_role(role).count()
    }
}

/// What part of the report an element belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRole {
    Title,
    Metadata,
    NotesHeading,
    NotesLine,
    MapImage,
    TableHeading,
    TableHeader,
    TableRule,
    TableRow,
}

/// A positioned drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutElement {
    pub role: ElementRole,
    pub draw: DrawCommand,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// One or more text runs sharing a font and size.
    Text {
        font: StandardFont,
        size: f64,
        runs: Vec<TextRun>,
    },
    /// A horizontal rule at baseline `y`.
    Rule { x1: f64, x2: f64, y: f64, width: f64 },
    /// An image; (`x`, `y`) is its bottom-left corner.
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: LoadedImage,
    },
}

/// A string starting at (`x`, `y`), `y` being the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

impl LayoutElement {
    /// A single text run.
    pub fn text(role: ElementRole, font: StandardFont, size: f64, x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            role,
            draw: DrawCommand::Text {
                font,
                size,
                runs: vec![TextRun {
                    x,
                    y,
                    text: text.into(),
                }],
            },
        }
    }

    /// Text content of all runs, in order. Empty for non-text elements.
    pub fn texts(&self) -> Vec<&str> {
        match &self.draw {
            DrawCommand::Text { runs, .. } => runs.iter().map(|r| r.text.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Lowest baseline or bottom edge this element touches.
    pub fn bottom(&self) -> f64 {
        match &self.draw {
            DrawCommand::Text { runs, .. } => runs.iter().map(|r| r.y).fold(f64::INFINITY, f64::min),
            DrawCommand::Rule { y, .. } => *y,
            DrawCommand::Image { y, .. } => *y,
        }
    }

    /// Highest baseline or top edge this element touches.
    pub fn top(&self) -> f64 {
        match &self.draw {
            DrawCommand::Text { runs, .. } => runs.iter().map(|r| r.y).fold(f64::NEG_INFINITY, f64::max),
            DrawCommand::Rule { y, .. } => *y,
            DrawCommand::Image { y, height, .. } => y + height,
        }
    }
}

/// Tracks where we are on the current page and owns the pages finished so far.
#[derive(Debug, Clone)]
pub struct LayoutCursor {
    geometry: PageGeometry,
    y: f64,
    elements: Vec<LayoutElement>,
    pages: Vec<LayoutPage>,
}

impl LayoutCursor {
    /// A cursor at the top margin of the first page.
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            y: geometry.top(),
            elements: Vec::new(),
            pages: Vec::new(),
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Baseline of the next line.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Place the cursor on an absolute baseline of the current page.
    pub fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    /// Move the baseline down by `amount`.
    pub fn advance(&mut self, amount: f64) {
        self.y -= amount;
    }

    /// The current baseline is under the low-water mark.
    pub fn below_low_water(&self) -> bool {
        decide_break(self.y, 0.0, self.geometry.low_water) == BreakDecision::MoveToNextPage
    }

    /// Advancing by `height` keeps the baseline at or above the low-water mark.
    pub fn fits(&self, height: f64) -> bool {
        decide_break(self.y, height, self.geometry.low_water) == BreakDecision::Place
    }

    /// Finalize the current page and start a new one at the top margin.
    pub fn page_break(&mut self) {
        let page = self.finalize();
        self.pages.push(page);
        self.y = self.geometry.top();
        log::debug!("page break: starting page {}", self.pages.len() + 1);
    }

    pub fn push(&mut self, element: LayoutElement) {
        self.elements.push(element);
    }

    /// Zero-based index of the page being written.
    pub fn page_index(&self) -> usize {
        self.pages.len()
    }

    /// Close the last page and hand back all pages. Never empty.
    pub fn finish(mut self) -> Vec<LayoutPage> {
        let page = self.finalize();
        self.pages.push(page);
        self.pages
    }

    fn finalize(&mut self) -> LayoutPage {
        LayoutPage {
            width: self.geometry.width(),
            height: self.geometry.height(),
            elements: std::mem::take(&mut self.elements),
        }
    }
}
