//! # Page Break Decisions
//!
//! The one rule every renderer shares: content is written at the cursor's
//! baseline, and a baseline under the low-water mark is never written.
//! Renderers ask before they write; nothing is ever split or moved after
//! the fact.

/// What to do before writing the next piece of content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BreakDecision {
    /// Write it on the current page.
    Place,
    /// Finalize this page and write it at the top of the next one.
    MoveToNextPage,
}

/// Decide whether content that advances the baseline by `needed` can start
/// at baseline `y` without its last baseline dropping under `low_water`.
///
/// `needed == 0.0` asks whether `y` itself is still writable.
pub fn decide_break(y: f64, needed: f64, low_water: f64) -> BreakDecision {
    if y - needed < low_water {
        BreakDecision::MoveToNextPage
    } else {
        BreakDecision::Place
    }
}

/// How many fixed-height rows fit when the first row sits at `first_baseline`.
pub fn rows_that_fit(first_baseline: f64, row_height: f64, low_water: f64) -> usize {
    if first_baseline < low_water || row_height <= 0.0 {
        return 0;
    }
    ((first_baseline - low_water) / row_height).floor() as usize + 1
}
