//! # Playback Synchronization
//!
//! Keeps a scrolling score in step with a playing video, and lets clicks on the
//! score seek the video.
//!
//! ## Sub-modules
//! - `types` - Session state, events, derived positions
//! - `engine` - Immutable lookup tables built from validated static data
//! - `synchronizer` - The event-driven state machine
//!
//! ## State Machine
//!
//! ```text
//!            Playing                        not Playing
//!   Idle ───────────────▶ Tracking ───────────────────────▶ Paused
//!     ▲                    ▲  │ Tick: resolve block,           │
//!     │                    │  │ scroll if changed              │
//!     │                    │  ▼                                │
//!     │                    └──────────── Playing ◀─────────────┘
//!     └── (no block resolved yet)
//! ```
//!
//! - Entering `Tracking` starts the poll timer; leaving it cancels the timer.
//! - A tick is a no-op while the player is not ready, and a tick that arrives
//!   after cancellation is discarded.
//! - A click seeks the player to the block's last time entry and sets the
//!   current block immediately, without waiting for the next tick.
//! - `Dispose` cancels the timer and any in-flight scroll; later events are ignored.
//!
//! ## Concurrency
//! Everything runs on one logical thread. Each event is applied completely
//! before the next is looked at, so a tick's resolve/label/scroll sequence is
//! never interleaved with a click or a toggle.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use simulscore::{
//!     BlockId, PlayerState, PollTimer, ScrollSurface, SessionData, SyncConfig, SyncEngine,
//!     SyncEvent, Synchronizer, VideoPlayer,
//! };
//!
//! struct Player(f64);
//! impl VideoPlayer for Player {
//!     fn current_time(&self) -> Option<f64> { Some(self.0) }
//!     fn seek_to(&mut self, time: f64, _: bool) { self.0 = time; }
//! }
//! struct Timer;
//! impl PollTimer for Timer {
//!     fn start(&mut self, _: Duration) {}
//!     fn cancel(&mut self) {}
//! }
//! struct View;
//! impl ScrollSurface for View {
//!     fn scroll_top(&self) -> f64 { 0.0 }
//!     fn viewport_width(&self) -> f64 { 800.0 }
//!     fn scroll_to(&mut self, _: f64) {}
//! }
//!
//! let data = SessionData::from_json(
//!     r#"{ "musicId": "M1", "title": "Etude", "movements": [{
//!          "movement": 1, "firstBlockId": 100, "lastBlockId": 105,
//!          "reservation": { "from": 100, "to": 200 }, "title": "I" }] }"#,
//!     r#"{ "videoId": "v1", "musicId": "M1",
//!          "times": [{ "id": 100, "time": 0.0 }, { "id": 101, "time": 2.0 }] }"#,
//!     r#"{ "scoreId": "s1", "musicId": "M1", "positions": [] }"#,
//! )?;
//! let config = SyncConfig::default();
//! let engine = SyncEngine::new(data, &config)?;
//! let mut sync = Synchronizer::new(engine, &config, Player(2.5), Timer, View);
//!
//! sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
//! sync.handle(SyncEvent::Tick);
//! assert_eq!(sync.current_block(), BlockId(101));
//! assert_eq!(sync.current_measure(), "1");
//! # Ok::<(), simulscore::SyncError>(())
//! ```

mod engine;
mod synchronizer;
mod types;

#[cfg(test)]
mod tests;

pub use engine::SyncEngine;
pub use synchronizer::Synchronizer;
pub use types::{MovementMarker, Position, Session, SyncEvent, TrackingState};
