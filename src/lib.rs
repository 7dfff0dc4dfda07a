pub mod block;
pub mod block_index;
pub mod config;
pub mod coords;
pub mod error;
pub mod layout;
pub mod loader;
pub mod measure;
pub mod model;
pub mod player;
pub mod sim;
pub mod sync;
pub mod time_index;
pub mod validate;

use std::path::PathBuf;

pub use block::BlockId;
pub use block_index::BlockIndex;
pub use config::SyncConfig;
pub use coords::{CoordinateMapper, Rect, ScrollSurface};
pub use error::*;
pub use layout::ScoreLayout;
pub use loader::{load_session_data, FsMusicStore, MusicStore, SessionData};
pub use measure::{EndingMode, MeasureLabeler};
pub use model::*;
pub use player::{PlayerState, PollTimer, VideoPlayer};
pub use sync::{
    MovementMarker, Position, Session, SyncEngine, SyncEvent, Synchronizer, TrackingState,
};
pub use time_index::TimeIndex;

/// Load one (music, video, score) combination from a data directory and build
/// its lookup tables.
/// This is the main entry point for the library.
pub fn open_session(
    root: impl Into<PathBuf>,
    music_id: &str,
    video_id: Option<&str>,
    score_id: Option<&str>,
    config: &SyncConfig,
) -> Result<SyncEngine, SyncError> {
    let store = FsMusicStore::new(root);
    let data = load_session_data(&store, music_id, video_id, score_id)?;
    SyncEngine::new(data, config)
}
