//! Immutable lookup tables of one (music, video, score) combination.

use crate::block::BlockId;
use crate::block_index::BlockIndex;
use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::loader::SessionData;
use crate::measure::{EndingMode, MeasureLabeler};
use crate::model::{MusicData, ScoreData, VideoData};
use crate::time_index::TimeIndex;
use crate::validate::{validate_music, validate_score, validate_video};

use super::types::{MovementMarker, Position};

/// Validated static data plus the tables derived from it.
///
/// Built once when a session loads; every query afterwards is a table lookup.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    music: MusicData,
    video_id: String,
    score: ScoreData,
    block_index: BlockIndex,
    labeler: MeasureLabeler,
    time_index: TimeIndex,
    prefer_localized: bool,
}

impl SyncEngine {
    /// Validate `data` and build every lookup table.
    pub fn new(data: SessionData, config: &SyncConfig) -> Result<Self, SyncError> {
        let SessionData { music, video, score } = data;
        validate_music(&music)?;
        validate_video(&video)?;
        validate_score(&score)?;

        let VideoData { video_id, times, .. } = video;
        let block_index = BlockIndex::new(&music.movements);
        let labeler = MeasureLabeler::new(&music.movements);
        let time_index = TimeIndex::new(times);
        log::debug!(
            "built tables for {}: {} movements, {} time entries",
            music.music_id,
            music.movements.len(),
            time_index.len()
        );

        Ok(Self {
            music,
            video_id,
            score,
            block_index,
            labeler,
            time_index,
            prefer_localized: config.prefer_localized_titles,
        })
    }

    pub fn music(&self) -> &MusicData {
        &self.music
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn score(&self) -> &ScoreData {
        &self.score
    }

    pub fn time_index(&self) -> &TimeIndex {
        &self.time_index
    }

    pub fn block_index(&self) -> &BlockIndex {
        &self.block_index
    }

    pub fn labeler(&self) -> &MeasureLabeler {
        &self.labeler
    }

    /// Block shown at playback time `time`.
    pub fn resolve(&self, time: f64) -> BlockId {
        self.time_index.resolve(time)
    }

    /// Where the player should seek when `block` is clicked.
    pub fn seek_time(&self, block: BlockId) -> Option<f64> {
        self.time_index.seek_time(block)
    }

    pub fn movement_of(&self, block: BlockId) -> Option<u32> {
        self.block_index.movement_of(block)
    }

    pub fn measure_label(&self, block: BlockId, mode: EndingMode) -> &str {
        self.labeler.label(block, mode)
    }

    pub fn has_measure(&self, block: BlockId) -> bool {
        self.labeler.has_measure(block)
    }

    pub fn position(&self, block: BlockId, mode: EndingMode) -> Position {
        Position {
            block,
            movement: self.movement_of(block),
            measure: self.measure_label(block, mode).to_string(),
        }
    }

    /// Title of the movement owning `block`, or `""` when unowned.
    pub fn movement_title(&self, block: BlockId) -> &str {
        self.movement_of(block)
            .and_then(|number| self.music.movement(number))
            .map(|mov| mov.display_title(self.prefer_localized))
            .unwrap_or("")
    }

    /// One navigator entry per movement, in listed order.
    pub fn movement_markers(&self) -> Vec<MovementMarker> {
        self.music
            .movements
            .iter()
            .filter_map(|mov| {
                BlockId::movement_marker(mov.number).map(|id| MovementMarker {
                    id,
                    movement: mov.number,
                    title: mov.display_title(self.prefer_localized).to_string(),
                })
            })
            .collect()
    }

    pub fn prefer_localized(&self) -> bool {
        self.prefer_localized
    }
}
