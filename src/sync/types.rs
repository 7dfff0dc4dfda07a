//! Session state and event type definitions.

use serde::Serialize;

use crate::block::BlockId;
use crate::measure::EndingMode;
use crate::player::PlayerState;

/// Everything that can happen to a viewing session.
///
/// Events are delivered one at a time, in the order each source produced them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SyncEvent {
    /// The external player changed state.
    PlayerStateChanged(PlayerState),
    /// The poll timer fired.
    Tick,
    /// The user clicked a score block or a movement marker (`9800 + n`).
    BlockClicked(BlockId),
    SetAutoScroll(bool),
    ToggleAutoScroll,
    SetOmitFirstEndings(bool),
    /// The user started dragging the split-view divider.
    ResizeStarted,
    /// The user released the divider; the score view now has this width.
    ResizeFinished { viewport_width: f64 },
    /// The viewing session is being torn down.
    Dispose,
}

/// Tracking state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackingState {
    /// No position resolved yet.
    Idle,
    /// The player is playing and the poll timer is running.
    Tracking,
    /// Polling is suspended; the last position is retained.
    Paused,
}

/// Mutable state of one viewing session.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub current_block: BlockId,
    pub auto_scroll: bool,
    pub omit_first_endings: bool,
    /// Suppresses auto-scroll while the split view is being resized.
    pub resizing: bool,
    pub(crate) polling: bool,
    pub(crate) disposed: bool,
}

impl Session {
    pub fn new(auto_scroll: bool, omit_first_endings: bool) -> Self {
        Self {
            current_block: BlockId::NONE,
            auto_scroll,
            omit_first_endings,
            resizing: false,
            polling: false,
            disposed: false,
        }
    }

    pub fn ending_mode(&self) -> EndingMode {
        EndingMode::from_omit_flag(self.omit_first_endings)
    }

    pub fn tracking_state(&self) -> TrackingState {
        if self.polling {
            TrackingState::Tracking
        } else if self.current_block.is_none() {
            TrackingState::Idle
        } else {
            TrackingState::Paused
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Whether a block change should move the score view.
    pub(crate) fn should_auto_scroll(&self) -> bool {
        self.auto_scroll && !self.resizing
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(true, false)
    }
}

/// Displayed musical position of a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub block: BlockId,
    /// Owning movement number, if the block belongs to one.
    pub movement: Option<u32>,
    /// Measure label for the active ending mode; empty when the block has none.
    pub measure: String,
}

/// Navigator entry for jumping to the start of a movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementMarker {
    pub id: BlockId,
    pub movement: u32,
    pub title: String,
}
