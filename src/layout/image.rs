//! # Image Embedding
//!
//! Places the map image inside a fixed box whose top edge is the cursor
//! baseline. The image is scaled (up or down) to fit the box with its aspect
//! ratio intact and anchored at the box's bottom-left corner. The cursor
//! then moves past the whole box, whatever size the image ended up.
//!
//! Loading happens before anything touches the cursor, so a failed load
//! leaves the layout exactly as it was.

use std::path::Path;

use super::{DrawCommand, ElementRole, LayoutCursor, LayoutElement};
use crate::error::ImageError;
use crate::image_loader::load_image;

/// The box an image is fitted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageBox {
    pub x: f64,
    pub max_width: f64,
    pub max_height: f64,
    /// Space left under the box before the next section.
    pub gap: f64,
}

/// Where the image ended up on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub page_index: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Scale `(width, height)` to the largest size that fits the box.
pub fn fit_within(width: f64, height: f64, max_width: f64, max_height: f64) -> (f64, f64) {
    if width <= 0.0 || height <= 0.0 {
        return (0.0, 0.0);
    }
    let scale = (max_width / width).min(max_height / height);
    (width * scale, height * scale)
}

/// Load `reference` and place it at the cursor.
pub fn embed_image(
    cursor: &mut LayoutCursor,
    reference: &str,
    image_dir: Option<&Path>,
    bounds: ImageBox,
) -> Result<Placement, ImageError> {
    let image = load_image(reference, image_dir)?;

    if !cursor.fits(bounds.max_height) {
        cursor.page_break();
    }

    let (width, height) = fit_within(
        image.width_px as f64,
        image.height_px as f64,
        bounds.max_width,
        bounds.max_height,
    );
    let box_bottom = cursor.y() - bounds.max_height;
    let placement = Placement {
        page_index: cursor.page_index(),
        x: bounds.x,
        y: box_bottom,
        width,
        height,
    };

    cursor.push(LayoutElement {
        role: ElementRole::MapImage,
        draw: DrawCommand::Image {
            x: placement.x,
            y: placement.y,
            width,
            height,
            image,
        },
    });
    cursor.advance(bounds.max_height + bounds.gap);

    Ok(placement)
}
