//! Score page geometry.
//!
//! Pages are stacked top to bottom at the full width of the score view,
//! separated by `page_gap`. Row `top`/`height` are stored in 1/500ths of the page
//! height; within a row, blocks are placed left to right, each preceded by its
//! `left` margin, with `left`/`width` in 1/500ths of the page width.

use crate::block::BlockId;
use crate::coords::{CoordinateMapper, Rect};
use crate::model::ScoreData;

/// Denominator of the stored geometry units.
const GEOMETRY_SCALE: f64 = 500.0;

/// Height/width ratio of an A-series page.
pub const DEFAULT_PAGE_ASPECT: f64 = 1.4142;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreLayout {
    pub page_width: f64,
    /// Page height divided by page width.
    pub page_aspect: f64,
    pub page_gap: f64,
}

impl ScoreLayout {
    pub fn new(page_width: f64, page_aspect: f64, page_gap: f64) -> Self {
        Self {
            page_width,
            page_aspect,
            page_gap,
        }
    }

    pub fn page_height(&self) -> f64 {
        self.page_width * self.page_aspect
    }

    /// Total height of the stacked pages of `score`.
    pub fn content_height(&self, score: &ScoreData) -> f64 {
        let pages = score.positions.len() as f64;
        pages * (self.page_height() + self.page_gap)
    }

    /// Rectangles of every block of `score`, in page order.
    pub fn block_rects(&self, score: &ScoreData) -> Vec<(BlockId, Rect)> {
        let page_height = self.page_height();
        let mut rects = Vec::new();

        for (i, page) in score.positions.iter().enumerate() {
            let page_top = i as f64 * (page_height + self.page_gap);
            for row in &page.rows {
                let top = page_top + row.top * page_height / GEOMETRY_SCALE;
                let height = row.height * page_height / GEOMETRY_SCALE;
                let mut x = 0.0;
                for block in &row.blocks {
                    x += block.left * self.page_width / GEOMETRY_SCALE;
                    let width = block.width * self.page_width / GEOMETRY_SCALE;
                    rects.push((block.id, Rect::new(x, top, width, height)));
                    x += width;
                }
            }
        }
        rects
    }

    /// Write every block rectangle of `score` into `mapper`.
    pub fn mount(&self, score: &ScoreData, mapper: &mut CoordinateMapper) {
        let rects = self.block_rects(score);
        log::debug!(
            "mounting {} blocks of score {} at width {:.1}",
            rects.len(),
            score.score_id,
            self.page_width
        );
        for (block, rect) in rects {
            mapper.mount(block, rect);
        }
    }
}
