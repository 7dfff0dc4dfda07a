//! Collaborators driven by the synchronizer: the video player and the poll timer.
//!
//! Any player that can report its current time, seek, and announce state changes
//! can be synchronized; the synchronizer never depends on a concrete player.

use std::time::Duration;

/// State reported by the external player, using the embed API's numeric codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl PlayerState {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(PlayerState::Unstarted),
            0 => Some(PlayerState::Ended),
            1 => Some(PlayerState::Playing),
            2 => Some(PlayerState::Paused),
            3 => Some(PlayerState::Buffering),
            5 => Some(PlayerState::Cued),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            PlayerState::Unstarted => -1,
            PlayerState::Ended => 0,
            PlayerState::Playing => 1,
            PlayerState::Paused => 2,
            PlayerState::Buffering => 3,
            PlayerState::Cued => 5,
        }
    }

    pub fn is_playing(self) -> bool {
        self == PlayerState::Playing
    }
}

/// The external video player.
pub trait VideoPlayer {
    /// Current playback time in seconds, or `None` while the player is not ready.
    fn current_time(&self) -> Option<f64>;

    /// Seek to `time` seconds. `allow_seek_ahead` permits fetching unbuffered media.
    fn seek_to(&mut self, time: f64, allow_seek_ahead: bool);

    fn is_ready(&self) -> bool {
        self.current_time().is_some()
    }
}

/// A free-running repeating timer that delivers poll ticks.
pub trait PollTimer {
    /// Start delivering ticks every `interval`, replacing any running schedule.
    fn start(&mut self, interval: Duration);

    /// Stop delivering ticks. Must take effect before the next tick.
    fn cancel(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_codes_round_trip() {
        for state in [
            PlayerState::Unstarted,
            PlayerState::Ended,
            PlayerState::Playing,
            PlayerState::Paused,
            PlayerState::Buffering,
            PlayerState::Cued,
        ] {
            assert_eq!(PlayerState::from_code(state.code()), Some(state));
        }
        assert_eq!(PlayerState::from_code(4), None);
    }

    #[test]
    fn test_only_playing_is_playing() {
        assert!(PlayerState::Playing.is_playing());
        assert!(!PlayerState::Buffering.is_playing());
        assert!(!PlayerState::Ended.is_playing());
    }
}
