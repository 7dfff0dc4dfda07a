use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::*;
use crate::block::BlockId;
use crate::config::SyncConfig;
use crate::coords::ScrollSurface;
use crate::loader::SessionData;
use crate::player::{PlayerState, PollTimer, VideoPlayer};

const MUSIC: &str = r#"{
    "musicId": "T0001",
    "title": "Sonata",
    "title_jp": "ソナタ",
    "composer": "Composer",
    "videos": [{ "videoId": "v1" }],
    "scores": [{ "scoreId": "s1" }],
    "movements": [
        {
            "movement": 1, "firstBlockId": 100, "lastBlockId": 110,
            "reservation": { "from": 100, "to": 200 },
            "title": "I. Allegro", "title_jp": "第1楽章",
            "devidedFirstBlockId": [102],
            "firstEndingBlockId": [105, 106],
            "cadenza": [{
                "firstBlockId": 150, "lastBlockId": 153,
                "reservation": { "from": 150, "to": 160 },
                "title": "Cadenza"
            }]
        },
        {
            "movement": 2, "firstBlockId": 200, "lastBlockId": 220,
            "reservation": { "from": 200, "to": 300 },
            "title": "II. Adagio"
        }
    ]
}"#;

const VIDEO: &str = r#"{
    "videoId": "v1",
    "musicId": "T0001",
    "times": [
        { "id": 9801, "time": 0.5 },
        { "id": 100, "time": 1.0 },
        { "id": 101, "time": 2.0 },
        { "id": 102, "time": 3.0 },
        { "id": 103, "time": 4.0 },
        { "id": 104, "time": 5.0 },
        { "id": 101, "time": 6.0 },
        { "id": 105, "time": 7.0 },
        { "id": 106, "time": 8.0 },
        { "id": 107, "time": 9.0 },
        { "id": 9802, "time": 10.0 },
        { "id": 200, "time": 10.0 },
        { "id": 201, "time": 12.0 }
    ]
}"#;

// Page 1: two rows of blocks 100 wide; page 2: one row of blocks 50 wide.
const SCORE: &str = r#"{
    "scoreId": "s1",
    "musicId": "T0001",
    "positions": [
        { "page": 1, "rows": [
            { "id": 1, "top": 0, "height": 50, "blocks": [
                { "id": 100, "width": 100, "left": 0 },
                { "id": 101, "width": 100, "left": 0 },
                { "id": 102, "width": 100, "left": 0 },
                { "id": 103, "width": 100, "left": 0 },
                { "id": 104, "width": 100, "left": 0 }
            ]},
            { "id": 2, "top": 100, "height": 50, "blocks": [
                { "id": 105, "width": 100, "left": 0 },
                { "id": 106, "width": 100, "left": 0 },
                { "id": 107, "width": 100, "left": 0 }
            ]}
        ]},
        { "page": 2, "rows": [
            { "id": 3, "top": 0, "height": 50, "blocks": [
                { "id": 200, "width": 50, "left": 0 },
                { "id": 201, "width": 50, "left": 0 }
            ]}
        ]}
    ]
}"#;

#[derive(Default)]
struct FakePlayer {
    time: Option<f64>,
    seeks: Vec<(f64, bool)>,
}

impl VideoPlayer for FakePlayer {
    fn current_time(&self) -> Option<f64> {
        self.time
    }

    fn seek_to(&mut self, time: f64, allow_seek_ahead: bool) {
        self.seeks.push((time, allow_seek_ahead));
        self.time = Some(time);
    }
}

#[derive(Debug, Default)]
struct TimerLog {
    running: Option<Duration>,
    starts: usize,
    cancels: usize,
}

/// Timer double whose log outlives the synchronizer.
#[derive(Default, Clone)]
struct FakeTimer {
    log: Rc<RefCell<TimerLog>>,
}

impl PollTimer for FakeTimer {
    fn start(&mut self, interval: Duration) {
        let mut log = self.log.borrow_mut();
        log.running = Some(interval);
        log.starts += 1;
    }

    fn cancel(&mut self) {
        let mut log = self.log.borrow_mut();
        log.running = None;
        log.cancels += 1;
    }
}

struct FakeSurface {
    scroll_top: f64,
    width: f64,
    requests: Vec<f64>,
    cancelled: usize,
}

impl ScrollSurface for FakeSurface {
    fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn viewport_width(&self) -> f64 {
        self.width
    }

    fn scroll_to(&mut self, top: f64) {
        self.requests.push(top);
        self.scroll_top = top;
    }

    fn cancel_scroll(&mut self) {
        self.cancelled += 1;
    }
}

type TestSync = Synchronizer<FakePlayer, FakeTimer, FakeSurface>;

fn config() -> SyncConfig {
    SyncConfig {
        header_fraction: 0.125,
        page_aspect: 2.0,
        ..SyncConfig::default()
    }
}

fn engine_from(music: &str, video: &str, score: &str) -> SyncEngine {
    let data = SessionData::from_json(music, video, score).unwrap();
    SyncEngine::new(data, &config()).unwrap()
}

fn synchronizer_with(timer: FakeTimer) -> TestSync {
    let player = FakePlayer {
        time: Some(0.0),
        ..Default::default()
    };
    let surface = FakeSurface {
        scroll_top: 0.0,
        width: 500.0,
        requests: Vec::new(),
        cancelled: 0,
    };
    Synchronizer::new(engine_from(MUSIC, VIDEO, SCORE), &config(), player, timer, surface)
}

fn synchronizer() -> TestSync {
    synchronizer_with(FakeTimer::default())
}

fn play_at(sync: &mut TestSync, time: f64) -> bool {
    sync.player_mut().time = Some(time);
    sync.handle(SyncEvent::Tick)
}

#[test]
fn test_new_session_is_idle() {
    let sync = synchronizer();
    assert_eq!(sync.current_block(), BlockId::NONE);
    assert_eq!(sync.tracking_state(), TrackingState::Idle);
    assert_eq!(sync.current_measure(), "");
    assert_eq!(sync.current_movement(), None);
    assert!(sync.session().auto_scroll);
    assert!(!sync.session().omit_first_endings);
}

#[test]
fn test_playing_starts_polling() {
    let mut sync = synchronizer();
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
    assert_eq!(sync.tracking_state(), TrackingState::Tracking);
    assert_eq!(sync.timer().log.borrow().running, Some(Duration::from_millis(35)));
}

#[test]
fn test_tick_resolves_block_and_scrolls() {
    let mut sync = synchronizer();
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));

    assert!(play_at(&mut sync, 7.5));
    assert_eq!(sync.current_block(), BlockId(105));
    assert_eq!(sync.current_movement(), Some(1));
    assert_eq!(sync.current_measure(), "4");
    // Row 2 sits at y = 200; 500 * 0.125 of header space is kept above it.
    assert_eq!(sync.surface().requests, vec![137.5]);
}

#[test]
fn test_tick_without_change_does_not_scroll_again() {
    let mut sync = synchronizer();
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
    assert!(play_at(&mut sync, 7.5));
    assert!(!play_at(&mut sync, 7.9));
    assert_eq!(sync.surface().requests.len(), 1);
}

#[test]
fn test_tick_before_playing_is_ignored() {
    let mut sync = synchronizer();
    assert!(!play_at(&mut sync, 2.5));
    assert_eq!(sync.current_block(), BlockId::NONE);
}

#[test]
fn test_tick_with_player_not_ready_is_skipped() {
    let mut sync = synchronizer();
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
    sync.player_mut().time = None;
    assert!(!sync.handle(SyncEvent::Tick));
    assert_eq!(sync.current_block(), BlockId::NONE);
    assert_eq!(sync.tracking_state(), TrackingState::Tracking);
}

#[test]
fn test_rewind_before_first_entry_resolves_to_sentinel_without_scroll() {
    let mut sync = synchronizer();
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
    assert!(play_at(&mut sync, 2.5));
    assert_eq!(sync.surface().requests.len(), 1);

    assert!(play_at(&mut sync, 0.2));
    assert_eq!(sync.current_block(), BlockId::NONE);
    assert_eq!(sync.surface().requests.len(), 1);
}

#[test]
fn test_pause_cancels_polling_and_keeps_position() {
    let mut sync = synchronizer();
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
    play_at(&mut sync, 2.5);
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Paused));

    assert_eq!(sync.tracking_state(), TrackingState::Paused);
    assert_eq!(sync.current_block(), BlockId(101));
    assert_eq!(sync.timer().log.borrow().running, None);

    // A tick that was already queued when the timer stopped.
    assert!(!play_at(&mut sync, 9.5));
    assert_eq!(sync.current_block(), BlockId(101));
}

#[test]
fn test_buffering_and_ended_also_stop_polling() {
    for state in [PlayerState::Buffering, PlayerState::Ended, PlayerState::Cued] {
        let mut sync = synchronizer();
        sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
        sync.handle(SyncEvent::PlayerStateChanged(state));
        assert_ne!(sync.tracking_state(), TrackingState::Tracking, "{:?}", state);
        assert_eq!(sync.timer().log.borrow().cancels, 1);
    }
}

#[test]
fn test_repeated_playing_restarts_single_timer() {
    let mut sync = synchronizer();
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
    let log = sync.timer().log.borrow();
    assert_eq!(log.starts, 2);
    assert_eq!(log.cancels, 1);
    assert!(log.running.is_some());
}

#[test]
fn test_not_playing_while_idle_does_not_cancel() {
    let mut sync = synchronizer();
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Unstarted));
    assert_eq!(sync.timer().log.borrow().cancels, 0);
    assert_eq!(sync.tracking_state(), TrackingState::Idle);
}

#[test]
fn test_click_seeks_to_last_occurrence() {
    let mut sync = synchronizer();
    assert!(sync.handle(SyncEvent::BlockClicked(BlockId(101))));
    assert_eq!(sync.player().seeks, vec![(6.0, true)]);
    assert_eq!(sync.current_block(), BlockId(101));
    assert_eq!(sync.surface().requests, vec![0.0]);
    // The click updates the position even though no tick has run.
    assert_eq!(sync.tracking_state(), TrackingState::Paused);
}

#[test]
fn test_click_without_time_entry_does_nothing() {
    let mut sync = synchronizer();
    assert!(!sync.handle(SyncEvent::BlockClicked(BlockId(110))));
    assert!(sync.player().seeks.is_empty());
    assert_eq!(sync.current_block(), BlockId::NONE);
}

#[test]
fn test_click_while_player_not_ready_does_nothing() {
    let mut sync = synchronizer();
    sync.player_mut().time = None;
    assert!(!sync.handle(SyncEvent::BlockClicked(BlockId(101))));
    assert!(sync.player().seeks.is_empty());
}

#[test]
fn test_movement_marker_click_scrolls_to_first_block() {
    let mut sync = synchronizer();
    assert!(sync.handle(SyncEvent::BlockClicked(BlockId(9802))));
    assert_eq!(sync.player().seeks, vec![(10.0, true)]);
    assert_eq!(sync.current_block(), BlockId(9802));
    assert_eq!(sync.current_movement(), Some(2));
    assert!(sync.is_current_movement(2));
    assert_eq!(sync.current_measure(), "");
    // Page 2 starts at 1000 + 1 (page gap).
    assert_eq!(sync.surface().requests, vec![938.5]);
}

#[test]
fn test_click_at_point_resolves_block() {
    let mut sync = synchronizer();
    assert!(sync.click_at(150.0, 50.0));
    assert_eq!(sync.current_block(), BlockId(101));
    assert_eq!(sync.player().seeks, vec![(6.0, true)]);
    assert!(!sync.click_at(490.0, 900.0));
}

#[test]
fn test_auto_scroll_off_suppresses_scroll_until_reenabled() {
    let mut sync = synchronizer();
    sync.handle(SyncEvent::SetAutoScroll(false));
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
    assert!(play_at(&mut sync, 7.5));
    assert!(sync.surface().requests.is_empty());

    sync.handle(SyncEvent::ToggleAutoScroll);
    assert!(sync.session().auto_scroll);
    assert_eq!(sync.surface().requests, vec![137.5]);
}

#[test]
fn test_resizing_suppresses_scroll_then_rescrolls_at_new_width() {
    let mut sync = synchronizer();
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
    sync.handle(SyncEvent::ResizeStarted);
    assert!(play_at(&mut sync, 7.5));
    assert!(sync.surface().requests.is_empty());

    sync.surface_mut().width = 1000.0;
    sync.handle(SyncEvent::ResizeFinished { viewport_width: 1000.0 });
    assert!(!sync.session().resizing);
    // Row 2 is now at y = 400, with 125 of header space.
    assert_eq!(sync.surface().requests, vec![275.0]);
}

#[test]
fn test_omit_toggle_switches_label_track() {
    let mut sync = synchronizer();
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
    play_at(&mut sync, 8.5);
    assert_eq!(sync.current_measure(), "5");

    sync.handle(SyncEvent::SetOmitFirstEndings(true));
    assert_eq!(sync.current_measure(), "5'");
    assert_eq!(sync.position().measure, "5'");

    play_at(&mut sync, 9.5);
    assert_eq!(sync.current_measure(), "4");
}

#[test]
fn test_dispose_cancels_everything_and_ignores_later_events() {
    let mut sync = synchronizer();
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
    sync.handle(SyncEvent::Dispose);

    assert!(sync.session().is_disposed());
    assert_eq!(sync.timer().log.borrow().running, None);
    assert_eq!(sync.surface().cancelled, 1);

    assert!(!play_at(&mut sync, 2.5));
    assert!(!sync.handle(SyncEvent::BlockClicked(BlockId(101))));
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
    assert_eq!(sync.timer().log.borrow().starts, 1);
}

#[test]
fn test_drop_cancels_running_timer() {
    let timer = FakeTimer::default();
    let log = Rc::clone(&timer.log);
    {
        let mut sync = synchronizer_with(timer);
        sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
        assert!(log.borrow().running.is_some());
    }
    assert_eq!(log.borrow().running, None);
    assert_eq!(log.borrow().cancels, 1);
}

#[test]
fn test_movement_markers_use_localized_titles() {
    let sync = synchronizer();
    let markers = sync.movement_markers();
    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0].id, BlockId(9801));
    assert_eq!(markers[0].title, "第1楽章");
    assert_eq!(markers[1].title, "II. Adagio");
}

#[test]
fn test_engine_position_and_titles() {
    let engine = engine_from(MUSIC, VIDEO, SCORE);
    let position = engine.position(BlockId(151), crate::measure::EndingMode::Count);
    assert_eq!(position.movement, Some(1));
    assert_eq!(position.measure, "c1");
    assert_eq!(engine.movement_title(BlockId(151)), "第1楽章");
    assert_eq!(engine.movement_title(BlockId(250)), "II. Adagio");
    assert_eq!(engine.movement_title(BlockId(50)), "");
    assert!(engine.has_measure(BlockId(110)));
    assert!(!engine.has_measure(BlockId(111)));
}

#[test]
fn test_poll_resolves_latest_entry_at_or_before_time() {
    let engine = engine_from(
        r#"{ "musicId": "T0002", "title": "Etude" }"#,
        r#"{ "videoId": "v", "musicId": "T0002", "times": [
            { "id": 5, "time": 0 }, { "id": 6, "time": 10 }, { "id": 5, "time": 20 }
        ] }"#,
        r#"{ "scoreId": "s", "musicId": "T0002" }"#,
    );
    let player = FakePlayer {
        time: Some(15.0),
        ..Default::default()
    };
    let surface = FakeSurface {
        scroll_top: 0.0,
        width: 500.0,
        requests: Vec::new(),
        cancelled: 0,
    };
    let mut sync = Synchronizer::new(engine, &config(), player, FakeTimer::default(), surface);
    sync.handle(SyncEvent::PlayerStateChanged(PlayerState::Playing));
    sync.handle(SyncEvent::Tick);
    assert_eq!(sync.current_block(), BlockId(6));

    sync.handle(SyncEvent::BlockClicked(BlockId(5)));
    assert_eq!(sync.player().seeks, vec![(20.0, true)]);
}

#[test]
fn test_invalid_data_fails_engine_construction() {
    let data = SessionData::from_json(
        MUSIC,
        r#"{ "videoId": "v1", "musicId": "T0001", "times": [
            { "id": 100, "time": 5 }, { "id": 101, "time": 1 }
        ] }"#,
        SCORE,
    )
    .unwrap();
    let result = SyncEngine::new(data, &config());
    assert!(matches!(result, Err(crate::SyncError::DataError { .. })));
}

#[test]
fn test_movement_blocks_outside_reservation_fail_engine_construction() {
    let music = r#"{ "musicId": "T0003", "title": "Etude", "movements": [{
        "movement": 1, "firstBlockId": 9790, "lastBlockId": 9810,
        "reservation": { "from": 9700, "to": 9800 }, "title": "I" }] }"#;
    let data = SessionData::from_json(
        music,
        r#"{ "videoId": "v", "musicId": "T0003" }"#,
        r#"{ "scoreId": "s", "musicId": "T0003" }"#,
    )
    .unwrap();
    let result = SyncEngine::new(data, &config());
    assert!(matches!(result, Err(crate::SyncError::DataError { .. })));
}
