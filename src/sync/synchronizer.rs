//! The playback synchronizer state machine.

use std::time::Duration;

use crate::block::BlockId;
use crate::config::SyncConfig;
use crate::coords::{CoordinateMapper, ScrollSurface};
use crate::layout::ScoreLayout;
use crate::player::{PlayerState, PollTimer, VideoPlayer};

use super::engine::SyncEngine;
use super::types::{MovementMarker, Position, Session, SyncEvent, TrackingState};

/// Drives one viewing session.
///
/// Owns the session state and the collaborators it acts on. All mutation goes
/// through [`Synchronizer::handle`], one event at a time.
pub struct Synchronizer<P, T, S>
where
    P: VideoPlayer,
    T: PollTimer,
    S: ScrollSurface,
{
    engine: SyncEngine,
    mapper: CoordinateMapper,
    session: Session,
    player: P,
    timer: T,
    surface: S,
    poll_interval: Duration,
    page_aspect: f64,
    page_gap: f64,
}

impl<P, T, S> Synchronizer<P, T, S>
where
    P: VideoPlayer,
    T: PollTimer,
    S: ScrollSurface,
{
    /// Start a session in the `Idle` state and lay the score out at the
    /// surface's current width.
    pub fn new(engine: SyncEngine, config: &SyncConfig, player: P, timer: T, surface: S) -> Self {
        let mapper = CoordinateMapper::new(&engine.music().movements, config.header_fraction);
        let mut sync = Self {
            engine,
            mapper,
            session: Session::new(config.auto_scroll, config.omit_first_endings),
            player,
            timer,
            surface,
            poll_interval: config.poll_interval(),
            page_aspect: config.page_aspect,
            page_gap: config.page_gap,
        };
        sync.relayout();
        sync
    }

    /// Apply one event. Returns `true` when the current block changed.
    pub fn handle(&mut self, event: SyncEvent) -> bool {
        if self.session.disposed {
            log::trace!("ignoring {:?} after dispose", event);
            return false;
        }
        match event {
            SyncEvent::PlayerStateChanged(state) => {
                self.on_player_state(state);
                false
            }
            SyncEvent::Tick => self.on_tick(),
            SyncEvent::BlockClicked(block) => self.on_click(block),
            SyncEvent::SetAutoScroll(enabled) => {
                self.set_auto_scroll(enabled);
                false
            }
            SyncEvent::ToggleAutoScroll => {
                self.set_auto_scroll(!self.session.auto_scroll);
                false
            }
            SyncEvent::SetOmitFirstEndings(omit) => {
                self.session.omit_first_endings = omit;
                false
            }
            SyncEvent::ResizeStarted => {
                self.session.resizing = true;
                false
            }
            SyncEvent::ResizeFinished { viewport_width } => {
                self.on_resize_finished(viewport_width);
                false
            }
            SyncEvent::Dispose => {
                self.dispose();
                false
            }
        }
    }

    fn on_player_state(&mut self, state: PlayerState) {
        log::debug!("player state: {:?}", state);
        if state.is_playing() {
            if self.session.polling {
                self.timer.cancel();
            }
            self.timer.start(self.poll_interval);
            self.session.polling = true;
        } else if self.session.polling {
            self.timer.cancel();
            self.session.polling = false;
        }
    }

    fn on_tick(&mut self) -> bool {
        // A tick queued before the timer was cancelled.
        if !self.session.polling {
            return false;
        }
        let Some(time) = self.player.current_time() else {
            log::trace!("player not ready, skipping tick");
            return false;
        };
        let block = self.engine.resolve(time);
        log::trace!("tick at {:.3}s resolves to block {}", time, block);
        self.set_current_block(block)
    }

    fn on_click(&mut self, block: BlockId) -> bool {
        let Some(time) = self.engine.seek_time(block) else {
            log::warn!("block {} has no time entry, not seeking", block);
            return false;
        };
        if !self.player.is_ready() {
            log::debug!("player not ready, ignoring click on block {}", block);
            return false;
        }
        log::debug!("seeking to {:.3}s for block {}", time, block);
        self.player.seek_to(time, true);
        self.set_current_block(block)
    }

    fn set_current_block(&mut self, block: BlockId) -> bool {
        if block == self.session.current_block {
            return false;
        }
        self.session.current_block = block;
        if self.session.should_auto_scroll() {
            self.mapper.scroll_to_block(block, &mut self.surface);
        }
        true
    }

    fn set_auto_scroll(&mut self, enabled: bool) {
        let was_enabled = self.session.auto_scroll;
        self.session.auto_scroll = enabled;
        if enabled && !was_enabled && !self.session.resizing {
            self.mapper
                .scroll_to_block(self.session.current_block, &mut self.surface);
        }
    }

    fn on_resize_finished(&mut self, viewport_width: f64) {
        self.session.resizing = false;
        self.relayout_at(viewport_width);
        if self.session.auto_scroll {
            self.mapper
                .scroll_to_block(self.session.current_block, &mut self.surface);
        }
    }

    fn dispose(&mut self) {
        if self.session.polling {
            self.timer.cancel();
            self.session.polling = false;
        }
        self.surface.cancel_scroll();
        self.session.disposed = true;
        log::debug!("session for {} disposed", self.engine.music().music_id);
    }

    fn relayout(&mut self) {
        let width = self.surface.viewport_width();
        self.relayout_at(width);
    }

    fn relayout_at(&mut self, viewport_width: f64) {
        let layout = ScoreLayout::new(viewport_width, self.page_aspect, self.page_gap);
        layout.mount(self.engine.score(), &mut self.mapper);
    }

    /// Click at a point of the score content, resolving the block under it.
    pub fn click_at(&mut self, x: f64, y: f64) -> bool {
        match self.mapper.block_at(x, y) {
            Some(block) => self.handle(SyncEvent::BlockClicked(block)),
            None => false,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn current_block(&self) -> BlockId {
        self.session.current_block
    }

    pub fn tracking_state(&self) -> TrackingState {
        self.session.tracking_state()
    }

    /// Displayed position of the current block.
    pub fn position(&self) -> Position {
        self.engine
            .position(self.session.current_block, self.session.ending_mode())
    }

    pub fn current_measure(&self) -> &str {
        self.engine
            .measure_label(self.session.current_block, self.session.ending_mode())
    }

    pub fn current_movement(&self) -> Option<u32> {
        self.engine.movement_of(self.session.current_block)
    }

    /// Navigator highlight: is the current block inside movement `number`?
    pub fn is_current_movement(&self, number: u32) -> bool {
        self.current_movement() == Some(number)
    }

    pub fn movement_markers(&self) -> Vec<MovementMarker> {
        self.engine.movement_markers()
    }

    pub fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    pub fn mapper_mut(&mut self) -> &mut CoordinateMapper {
        &mut self.mapper
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<P, T, S> Drop for Synchronizer<P, T, S>
where
    P: VideoPlayer,
    T: PollTimer,
    S: ScrollSurface,
{
    fn drop(&mut self) {
        if !self.session.disposed {
            self.dispose();
        }
    }
}
