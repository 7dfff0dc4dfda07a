//! Headless playback simulation.
//!
//! Runs a complete session against a scripted player that advances by exactly
//! one poll interval per tick. Used by the command-line front end and by the
//! integration tests to exercise the whole pipeline without a browser.

use std::time::Duration;

use crate::block::BlockId;
use crate::config::SyncConfig;
use crate::coords::ScrollSurface;
use crate::player::{PlayerState, PollTimer, VideoPlayer};
use crate::sync::{Position, SyncEngine, SyncEvent, Synchronizer};

/// A player whose clock only moves when told to.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlayer {
    pub time: f64,
    pub seeks: Vec<f64>,
}

impl VideoPlayer for ScriptedPlayer {
    fn current_time(&self) -> Option<f64> {
        Some(self.time)
    }

    fn seek_to(&mut self, time: f64, _allow_seek_ahead: bool) {
        self.seeks.push(time);
        self.time = time;
    }
}

/// Remembers the requested schedule; ticks are delivered by the caller.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    pub interval: Option<Duration>,
}

impl PollTimer for ManualTimer {
    fn start(&mut self, interval: Duration) {
        self.interval = Some(interval);
    }

    fn cancel(&mut self) {
        self.interval = None;
    }
}

/// A score view that jumps straight to every requested offset.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    pub width: f64,
    pub scroll_top: f64,
    pub scrolls: usize,
}

impl HeadlessSurface {
    pub fn new(width: f64) -> Self {
        Self {
            width,
            scroll_top: 0.0,
            scrolls: 0,
        }
    }
}

impl ScrollSurface for HeadlessSurface {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn viewport_width(&self) -> f64 {
        self.width
    }

    fn scroll_to(&mut self, top: f64) {
        self.scroll_top = top;
        self.scrolls += 1;
    }
}

pub type HeadlessSynchronizer = Synchronizer<ScriptedPlayer, ManualTimer, HeadlessSurface>;

/// Build a synchronizer wired to the headless collaborators.
pub fn headless(engine: SyncEngine, config: &SyncConfig, viewport_width: f64) -> HeadlessSynchronizer {
    Synchronizer::new(
        engine,
        config,
        ScriptedPlayer::default(),
        ManualTimer::default(),
        HeadlessSurface::new(viewport_width),
    )
}

/// A block change observed while simulating.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockChange {
    pub time: f64,
    pub position: Position,
    pub scroll_top: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationReport {
    pub ticks: usize,
    pub scrolls: usize,
    pub changes: Vec<BlockChange>,
}

impl SimulationReport {
    /// Blocks visited, in order.
    pub fn blocks(&self) -> Vec<BlockId> {
        self.changes.iter().map(|c| c.position.block).collect()
    }
}

/// Play from zero until `until` seconds (default: the last time entry) and
/// record every block change.
pub fn run_simulation(
    engine: SyncEngine,
    config: &SyncConfig,
    viewport_width: f64,
    until: Option<f64>,
) -> SimulationReport {
    let until = until
        .or_else(|| engine.time_index().end_time())
        .unwrap_or(0.0);
    let mut sync = headless(engine, config, viewport_width);
    let mut report = SimulationReport::default();

    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
    let mut elapsed_ms: u64 = 0;
    while let Some(interval) = sync.timer().interval {
        let time = elapsed_ms as f64 / 1000.0;
        if time > until {
            break;
        }
        sync.player_mut().time = time;
        report.ticks += 1;
        if sync.handle(SyncEvent::Tick) {
            let position = sync.position();
            log::info!(
                "{:>9.3}s  block {:>4}  movement {:>2}  measure {}",
                time,
                position.block,
                position.movement.map(|n| n.to_string()).unwrap_or_default(),
                position.measure
            );
            report.changes.push(BlockChange {
                time,
                position,
                scroll_top: sync.surface().scroll_top,
            });
        }
        elapsed_ms += interval.as_millis().max(1) as u64;
    }
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Ended));
    sync.handle(SyncEvent::Dispose);

    report.scrolls = sync.surface().scrolls;
    report
}
