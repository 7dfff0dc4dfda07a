//! # Coordinate Mapper
//!
//! Maps block identifiers to rendered rectangles and turns them into scroll
//! targets for the score view.
//!
//! ## Backing store
//! Rectangles are kept in score-content coordinates (origin at the top-left of
//! the first page, `y` growing downward), keyed by block id. Each rendered block
//! writes only its own entry, so mounts and unmounts in any order never disturb
//! other blocks.
//!
//! ## Scroll target
//! The target keeps the block just below the top edge of the view:
//!
//! ```text
//! target = scroll_top + (block.top - scroll_top) - viewport_width * header_fraction
//! ```
//!
//! The viewport-width term stands in for the height of the sticky score header.

use std::collections::HashMap;

use serde::Serialize;

use crate::block::BlockId;
use crate::model::Movement;

/// Default share of the viewport width subtracted from a block's top.
pub const DEFAULT_HEADER_FRACTION: f64 = 1.0 / 17.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Half-open containment: the right and bottom edges belong to the neighbor.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// The scrollable score view.
pub trait ScrollSurface {
    /// Current vertical scroll offset of the score content.
    fn scroll_top(&self) -> f64;

    /// Width of the score view.
    fn viewport_width(&self) -> f64;

    /// Start a smooth scroll to `top`. May restart an animation in progress.
    fn scroll_to(&mut self, top: f64);

    /// Drop any smooth scroll still in flight.
    fn cancel_scroll(&mut self) {}
}

#[derive(Debug, Clone)]
pub struct CoordinateMapper {
    rects: HashMap<BlockId, Rect>,
    movement_starts: HashMap<u32, BlockId>,
    header_fraction: f64,
}

impl CoordinateMapper {
    pub fn new(movements: &[Movement], header_fraction: f64) -> Self {
        let movement_starts = movements
            .iter()
            .map(|mov| (mov.number, mov.first_block_id))
            .collect();
        Self {
            rects: HashMap::new(),
            movement_starts,
            header_fraction,
        }
    }

    /// Record where `block` is rendered, replacing any earlier rectangle.
    pub fn mount(&mut self, block: BlockId, rect: Rect) {
        self.rects.insert(block, rect);
    }

    pub fn unmount(&mut self, block: BlockId) {
        self.rects.remove(&block);
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }

    pub fn mounted(&self) -> usize {
        self.rects.len()
    }

    /// The block whose region stands for `block`: movement markers redirect to
    /// the movement's first block, everything else maps to itself.
    pub fn target_block(&self, block: BlockId) -> BlockId {
        block
            .marked_movement()
            .and_then(|movement| self.movement_starts.get(&movement).copied())
            .unwrap_or(block)
    }

    /// Rendered rectangle of `block`, or `None` when it is not mounted.
    pub fn rect(&self, block: BlockId) -> Option<Rect> {
        self.rects.get(&self.target_block(block)).copied()
    }

    /// Scroll offset that brings `block` to the top of the view.
    pub fn scroll_target(&self, block: BlockId, scroll_top: f64, viewport_width: f64) -> Option<f64> {
        if block.is_none() {
            return None;
        }
        let rect = self.rect(block)?;
        let relative_top = rect.top() - scroll_top;
        let target = scroll_top + relative_top - viewport_width * self.header_fraction;
        Some(target.max(0.0))
    }

    /// Smoothly scroll `surface` to `block`. Returns whether a scroll was issued.
    pub fn scroll_to_block<S: ScrollSurface>(&self, block: BlockId, surface: &mut S) -> bool {
        match self.scroll_target(block, surface.scroll_top(), surface.viewport_width()) {
            Some(top) => {
                log::trace!("scrolling score view to {:.1} for block {}", top, block);
                surface.scroll_to(top);
                true
            }
            None => false,
        }
    }

    /// Block rendered at content point `(x, y)`, for click-to-seek.
    pub fn block_at(&self, x: f64, y: f64) -> Option<BlockId> {
        self.rects
            .iter()
            .filter(|(_, rect)| rect.contains(x, y))
            .map(|(block, _)| *block)
            .min()
    }
}
