//! Browser bindings for the score synchronizer.
//!
//! The page owns the video player, the interval timer and the scrolling score
//! element; it hands one host object exposing them to [`SimulScoreSession`] and
//! forwards player state changes, timer ticks and clicks back into the session.
//!
//! ```javascript
//! import init, { simulscoreInit, SimulScoreSession } from './simulscore_wasm.js';
//!
//! await init();
//! simulscoreInit();
//!
//! let timer = null;
//! const host = {
//!   getCurrentTime: () => player.getCurrentTime(),
//!   seekTo: (t, ahead) => player.seekTo(t, ahead),
//!   startPolling: (ms) => { timer = setInterval(() => session.tick(), ms); },
//!   stopPolling: () => clearInterval(timer),
//!   scrollTop: () => view.scrollTop,
//!   viewportWidth: () => view.clientWidth,
//!   scrollTo: (top) => view.scrollTo({ top, behavior: 'smooth' }),
//!   cancelScroll: () => view.scrollTo({ top: view.scrollTop }),
//! };
//! const session = new SimulScoreSession(music, video, score, null, host);
//! player.addEventListener('onStateChange', (e) => session.onStateChange(e.data));
//! ```

use serde::Serialize;
use simulscore::{
    BlockId, PlayerState, PollTimer, ScrollSurface, SessionData, SyncConfig, SyncEngine,
    SyncError, SyncEvent, Synchronizer, VideoPlayer,
};
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[derive(Serialize)]
struct SessionError {
    message: String,
}

fn to_js_error(e: SyncError) -> JsValue {
    let message = e.to_string();
    match serde_json::to_string(&SessionError { message: message.clone() }) {
        Ok(json) => JsValue::from_str(&json),
        Err(_) => JsValue::from_str(&message),
    }
}

#[wasm_bindgen]
extern "C" {
    pub type HostPlayer;

    #[wasm_bindgen(method, js_name = getCurrentTime)]
    fn get_current_time(this: &HostPlayer) -> Option<f64>;

    #[wasm_bindgen(method, js_name = seekTo)]
    fn seek_to(this: &HostPlayer, seconds: f64, allow_seek_ahead: bool);

    pub type HostTimer;

    #[wasm_bindgen(method, js_name = startPolling)]
    fn start_polling(this: &HostTimer, interval_ms: u32);

    #[wasm_bindgen(method, js_name = stopPolling)]
    fn stop_polling(this: &HostTimer);

    pub type HostScoreView;

    #[wasm_bindgen(method, js_name = scrollTop)]
    fn scroll_top(this: &HostScoreView) -> f64;

    #[wasm_bindgen(method, js_name = viewportWidth)]
    fn viewport_width(this: &HostScoreView) -> f64;

    #[wasm_bindgen(method, js_name = scrollTo)]
    fn scroll_to(this: &HostScoreView, top: f64);

    /// Optional. Hosts without it keep a late-finishing scroll animation.
    #[wasm_bindgen(method, catch, js_name = cancelScroll)]
    fn cancel_scroll(this: &HostScoreView) -> Result<(), JsValue>;
}

struct Player(HostPlayer);

impl VideoPlayer for Player {
    fn current_time(&self) -> Option<f64> {
        self.0.get_current_time().filter(|t| t.is_finite())
    }

    fn seek_to(&mut self, time: f64, allow_seek_ahead: bool) {
        self.0.seek_to(time, allow_seek_ahead);
    }
}

struct Timer(HostTimer);

impl PollTimer for Timer {
    fn start(&mut self, interval: Duration) {
        self.0.start_polling(interval.as_millis().min(u32::MAX as u128) as u32);
    }

    fn cancel(&mut self) {
        self.0.stop_polling();
    }
}

struct ScoreView(HostScoreView);

impl ScrollSurface for ScoreView {
    fn scroll_top(&self) -> f64 {
        self.0.scroll_top()
    }

    fn viewport_width(&self) -> f64 {
        self.0.viewport_width()
    }

    fn scroll_to(&mut self, top: f64) {
        self.0.scroll_to(top);
    }

    fn cancel_scroll(&mut self) {
        if self.0.cancel_scroll().is_err() {
            log::debug!("host has no cancelScroll; leaving scroll animation running");
        }
    }
}

/// Install the panic hook and route `log` output to the browser console.
#[wasm_bindgen(js_name = simulscoreInit)]
pub fn simulscore_init() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
}

/// One viewing session bound to a page's player and score view.
#[wasm_bindgen]
pub struct SimulScoreSession {
    sync: Synchronizer<Player, Timer, ScoreView>,
}

#[wasm_bindgen]
impl SimulScoreSession {
    /// Build a session from the three JSON documents and an optional YAML config.
    #[wasm_bindgen(constructor)]
    pub fn new(
        music_json: &str,
        video_json: &str,
        score_json: &str,
        config_yaml: Option<String>,
        host: JsValue,
    ) -> Result<SimulScoreSession, JsValue> {
        let config = match config_yaml {
            Some(source) => SyncConfig::from_yaml(&source).map_err(to_js_error)?,
            None => SyncConfig::default(),
        };
        let data = SessionData::from_json(music_json, video_json, score_json).map_err(to_js_error)?;
        let engine = SyncEngine::new(data, &config).map_err(to_js_error)?;

        let player = Player(host.clone().unchecked_into());
        let timer = Timer(host.clone().unchecked_into());
        let view = ScoreView(host.unchecked_into());
        Ok(Self {
            sync: Synchronizer::new(engine, &config, player, timer, view),
        })
    }

    /// Forward a player state code (-1, 0, 1, 2, 3, 5).
    #[wasm_bindgen(js_name = onStateChange)]
    pub fn on_state_change(&mut self, code: i32) {
        match PlayerState::from_code(code) {
            Some(state) => {
                self.sync.handle(SyncEvent::PlayerStateChanged(state));
            }
            None => log::warn!("ignoring unknown player state {}", code),
        }
    }

    /// Poll the player once. Returns whether the current block changed.
    pub fn tick(&mut self) -> bool {
        self.sync.handle(SyncEvent::Tick)
    }

    #[wasm_bindgen(js_name = clickBlock)]
    pub fn click_block(&mut self, id: u32) -> bool {
        self.sync.handle(SyncEvent::BlockClicked(BlockId(id)))
    }

    /// Click at a point of the score content (scroll offset already added).
    #[wasm_bindgen(js_name = clickAt)]
    pub fn click_at(&mut self, x: f64, y: f64) -> bool {
        self.sync.click_at(x, y)
    }

    #[wasm_bindgen(js_name = setAutoScroll)]
    pub fn set_auto_scroll(&mut self, enabled: bool) {
        self.sync.handle(SyncEvent::SetAutoScroll(enabled));
    }

    #[wasm_bindgen(js_name = setOmitFirstEndings)]
    pub fn set_omit_first_endings(&mut self, omit: bool) {
        self.sync.handle(SyncEvent::SetOmitFirstEndings(omit));
    }

    #[wasm_bindgen(js_name = resizeStarted)]
    pub fn resize_started(&mut self) {
        self.sync.handle(SyncEvent::ResizeStarted);
    }

    #[wasm_bindgen(js_name = resizeFinished)]
    pub fn resize_finished(&mut self, viewport_width: f64) {
        self.sync.handle(SyncEvent::ResizeFinished { viewport_width });
    }

    #[wasm_bindgen(js_name = currentBlockId)]
    pub fn current_block_id(&self) -> u32 {
        self.sync.current_block().0
    }

    #[wasm_bindgen(js_name = currentMeasure)]
    pub fn current_measure(&self) -> String {
        self.sync.current_measure().to_string()
    }

    #[wasm_bindgen(js_name = currentMovement)]
    pub fn current_movement(&self) -> Option<u32> {
        self.sync.current_movement()
    }

    #[wasm_bindgen(js_name = currentMovementTitle)]
    pub fn current_movement_title(&self) -> String {
        self.sync
            .engine()
            .movement_title(self.sync.current_block())
            .to_string()
    }

    /// Navigator entries as `[{ id, movement, title }]`.
    #[wasm_bindgen(js_name = movementMarkers)]
    pub fn movement_markers(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.sync.movement_markers()).map_err(JsValue::from)
    }

    /// `{ block, movement, measure }` for the current block.
    pub fn position(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.sync.position()).map_err(JsValue::from)
    }

    /// Stop polling and detach from the page. Later calls are ignored.
    pub fn dispose(&mut self) {
        self.sync.handle(SyncEvent::Dispose);
    }
}
