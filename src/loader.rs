//! # Data Store
//!
//! Loads the static documents a viewing session is built from.
//!
//! ## Layout on disk
//! ```text
//! <root>/<musicId>/info.json             MusicData
//! <root>/<musicId>/video/<videoId>.json  VideoData
//! <root>/<musicId>/score/<scoreId>.json  ScoreData
//! ```
//!
//! A session needs all three documents. If the video or score id is not given,
//! the first one listed by the music document is used. Any missing or malformed
//! document fails the load as a whole.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::SyncError;
use crate::model::{MusicData, ScoreData, VideoData};

/// Source of per-music static documents.
pub trait MusicStore {
    fn music(&self, music_id: &str) -> Result<MusicData, SyncError>;
    fn video(&self, music_id: &str, video_id: &str) -> Result<VideoData, SyncError>;
    fn score(&self, music_id: &str, score_id: &str) -> Result<ScoreData, SyncError>;
}

/// JSON documents under a directory tree.
#[derive(Debug, Clone)]
pub struct FsMusicStore {
    root: PathBuf,
}

impl FsMusicStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read<T: DeserializeOwned>(&self, path: PathBuf, kind: &'static str, id: String) -> Result<T, SyncError> {
        let source = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SyncError::NotFound { kind, id },
            _ => SyncError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            },
        })?;
        serde_json::from_str(&source).map_err(|e| SyncError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

impl MusicStore for FsMusicStore {
    fn music(&self, music_id: &str) -> Result<MusicData, SyncError> {
        let path = self.root.join(music_id).join("info.json");
        self.read(path, "music", music_id.to_string())
    }

    fn video(&self, music_id: &str, video_id: &str) -> Result<VideoData, SyncError> {
        let path = self
            .root
            .join(music_id)
            .join("video")
            .join(format!("{}.json", video_id));
        self.read(path, "video", format!("{}/{}", music_id, video_id))
    }

    fn score(&self, music_id: &str, score_id: &str) -> Result<ScoreData, SyncError> {
        let path = self
            .root
            .join(music_id)
            .join("score")
            .join(format!("{}.json", score_id));
        self.read(path, "score", format!("{}/{}", music_id, score_id))
    }
}

/// Everything a viewing session is built from.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub music: MusicData,
    pub video: VideoData,
    pub score: ScoreData,
}

impl SessionData {
    /// Decode the three documents from JSON text.
    pub fn from_json(music: &str, video: &str, score: &str) -> Result<Self, SyncError> {
        let decode_err = |what: &str, e: serde_json::Error| SyncError::ParseError {
            path: what.to_string(),
            message: e.to_string(),
        };
        Ok(Self {
            music: serde_json::from_str(music).map_err(|e| decode_err("music document", e))?,
            video: serde_json::from_str(video).map_err(|e| decode_err("video document", e))?,
            score: serde_json::from_str(score).map_err(|e| decode_err("score document", e))?,
        })
    }
}

/// Load the documents for one viewing session.
pub fn load_session_data<S: MusicStore + ?Sized>(
    store: &S,
    music_id: &str,
    video_id: Option<&str>,
    score_id: Option<&str>,
) -> Result<SessionData, SyncError> {
    let music = store.music(music_id)?;

    let video_id = match video_id {
        Some(id) => id.to_string(),
        None => music
            .videos
            .first()
            .map(|v| v.video_id.clone())
            .ok_or_else(|| SyncError::NotFound {
                kind: "video",
                id: format!("{}/<first>", music_id),
            })?,
    };
    let score_id = match score_id {
        Some(id) => id.to_string(),
        None => music
            .scores
            .first()
            .map(|s| s.score_id.clone())
            .ok_or_else(|| SyncError::NotFound {
                kind: "score",
                id: format!("{}/<first>", music_id),
            })?,
    };

    let video = store.video(music_id, &video_id)?;
    let score = store.score(music_id, &score_id)?;
    log::info!(
        "loaded music {} with video {} ({} time entries) and score {} ({} pages)",
        music_id,
        video_id,
        video.times.len(),
        score_id,
        score.positions.len()
    );
    Ok(SessionData { music, video, score })
}
