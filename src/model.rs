//! # Data Model
//!
//! Static per-music documents as supplied by the data store.
//!
//! Field names follow the stored JSON documents, including their historical
//! spellings (`devidedFirstBlockId`, `title_jp`), so documents deserialize as-is.
//!
//! ## Documents
//! - [`MusicData`] - piece metadata, available videos and scores, movement structure
//! - [`VideoData`] - the time index of one recorded performance
//! - [`ScoreData`] - page/row/block geometry of one score edition

use serde::{Deserialize, Serialize};

use crate::block::BlockId;

/// Half-open interval `[from, to)` of block identifiers reserved for a movement
/// or cadenza.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub from: u32,
    pub to: u32,
}

impl Reservation {
    pub fn new(from: u32, to: u32) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, block: BlockId) -> bool {
        block.0 >= self.from && block.0 < self.to
    }

    pub fn overlaps(&self, other: &Reservation) -> bool {
        self.from < other.to && other.from < self.to
    }

    /// True when `other` lies entirely inside this reservation.
    pub fn encloses(&self, other: &Reservation) -> bool {
        other.from >= self.from && other.to <= self.to
    }

    pub fn is_empty(&self) -> bool {
        self.from >= self.to
    }
}

/// A free-tempo passage nested inside a movement, numbered with a `c` prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cadenza {
    pub first_block_id: BlockId,
    pub last_block_id: BlockId,
    pub reservation: Reservation,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "title_jp", default, skip_serializing_if = "Option::is_none")]
    pub title_localized: Option<String>,
    #[serde(rename = "devidedFirstBlockId", default)]
    pub divided_first_block_ids: Vec<BlockId>,
    #[serde(rename = "firstEndingBlockId", default)]
    pub first_ending_block_ids: Vec<BlockId>,
}

/// One movement of a piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    #[serde(rename = "movement")]
    pub number: u32,
    pub first_block_id: BlockId,
    pub last_block_id: BlockId,
    pub reservation: Reservation,
    pub title: String,
    #[serde(rename = "title_jp", default, skip_serializing_if = "Option::is_none")]
    pub title_localized: Option<String>,
    #[serde(rename = "devidedFirstBlockId", default)]
    pub divided_first_block_ids: Vec<BlockId>,
    #[serde(rename = "firstEndingBlockId", default)]
    pub first_ending_block_ids: Vec<BlockId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cadenza: Vec<Cadenza>,
}

impl Movement {
    pub fn display_title(&self, prefer_localized: bool) -> &str {
        pick_title(&self.title, self.title_localized.as_deref(), prefer_localized)
    }

    /// Iterate the passages labeled by this movement: the main body followed by
    /// each cadenza.
    pub fn passages(&self) -> impl Iterator<Item = Passage<'_>> {
        std::iter::once(Passage {
            first: self.first_block_id,
            last: self.last_block_id,
            divided_first: &self.divided_first_block_ids,
            first_ending: &self.first_ending_block_ids,
            prefix: "",
        })
        .chain(self.cadenza.iter().map(|cad| Passage {
            first: cad.first_block_id,
            last: cad.last_block_id,
            divided_first: &cad.divided_first_block_ids,
            first_ending: &cad.first_ending_block_ids,
            prefix: "c",
        }))
    }
}

/// A contiguous run of blocks numbered with a single measure counter.
#[derive(Debug, Clone, Copy)]
pub struct Passage<'a> {
    pub first: BlockId,
    pub last: BlockId,
    pub divided_first: &'a [BlockId],
    pub first_ending: &'a [BlockId],
    /// Prepended to every label produced for this passage.
    pub prefix: &'static str,
}

/// A performer credited on a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Performer {
    pub part: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_jp: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_jp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub video_id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub players: Vec<Performer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInfo {
    pub score_id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub copyright: String,
    #[serde(default)]
    pub summary: String,
}

/// Metadata and structure of one piece of music.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicData {
    pub music_id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub title: String,
    #[serde(rename = "title_jp", default, skip_serializing_if = "Option::is_none")]
    pub title_localized: Option<String>,
    #[serde(default)]
    pub composer: String,
    #[serde(rename = "composer_jp", default, skip_serializing_if = "Option::is_none")]
    pub composer_localized: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opus: Option<String>,
    #[serde(default)]
    pub videos: Vec<VideoInfo>,
    #[serde(default)]
    pub scores: Vec<ScoreInfo>,
    #[serde(default)]
    pub movements: Vec<Movement>,
}

impl MusicData {
    pub fn display_title(&self, prefer_localized: bool) -> &str {
        pick_title(&self.title, self.title_localized.as_deref(), prefer_localized)
    }

    pub fn display_composer(&self, prefer_localized: bool) -> &str {
        pick_title(&self.composer, self.composer_localized.as_deref(), prefer_localized)
    }

    pub fn movement(&self, number: u32) -> Option<&Movement> {
        self.movements.iter().find(|mov| mov.number == number)
    }

    pub fn video(&self, video_id: &str) -> Option<&VideoInfo> {
        self.videos.iter().find(|v| v.video_id == video_id)
    }

    pub fn score(&self, score_id: &str) -> Option<&ScoreInfo> {
        self.scores.iter().find(|s| s.score_id == score_id)
    }
}

/// One `(block, time)` pair of a video's time index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    #[serde(rename = "id")]
    pub block: BlockId,
    /// Playback time in seconds.
    pub time: f64,
}

impl TimeEntry {
    pub fn new(block: u32, time: f64) -> Self {
        Self {
            block: BlockId(block),
            time,
        }
    }
}

/// Time index of one recorded performance, sorted by ascending time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoData {
    pub video_id: String,
    pub music_id: String,
    #[serde(default)]
    pub times: Vec<TimeEntry>,
}

/// A block region inside a row. `width` and `left` are in 1/500ths of the page width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockGeometry {
    pub id: BlockId,
    pub width: f64,
    pub left: f64,
}

/// A row (system) on a page. `top` and `height` are in 1/500ths of the page height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowGeometry {
    pub id: u32,
    pub top: f64,
    pub height: f64,
    #[serde(default)]
    pub blocks: Vec<BlockGeometry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page: u32,
    #[serde(default)]
    pub rows: Vec<RowGeometry>,
}

/// Geometry of one score edition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreData {
    pub score_id: String,
    pub music_id: String,
    #[serde(default)]
    pub positions: Vec<PageGeometry>,
}

fn pick_title<'a>(base: &'a str, localized: Option<&'a str>, prefer_localized: bool) -> &'a str {
    match localized {
        Some(local) if prefer_localized && !local.is_empty() => local,
        _ => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_deserializes_stored_field_names() {
        let json = r#"{
            "movement": 2,
            "firstBlockId": 300,
            "lastBlockId": 410,
            "reservation": { "from": 300, "to": 500 },
            "title": "II. Andante",
            "title_jp": "第2楽章",
            "devidedFirstBlockId": [305],
            "firstEndingBlockId": [320, 321],
            "cadenza": [{
                "firstBlockId": 450,
                "lastBlockId": 460,
                "reservation": { "from": 450, "to": 470 },
                "title": "Cadenza",
                "devidedFirstBlockId": [],
                "firstEndingBlockId": []
            }]
        }"#;
        let mov: Movement = serde_json::from_str(json).unwrap();
        assert_eq!(mov.number, 2);
        assert_eq!(mov.first_block_id, BlockId(300));
        assert_eq!(mov.divided_first_block_ids, vec![BlockId(305)]);
        assert_eq!(mov.first_ending_block_ids.len(), 2);
        assert_eq!(mov.cadenza.len(), 1);
        assert_eq!(mov.display_title(true), "第2楽章");
        assert_eq!(mov.display_title(false), "II. Andante");
    }

    #[test]
    fn test_passages_include_cadenzas_with_prefix() {
        let json = r#"{
            "movement": 1, "firstBlockId": 0, "lastBlockId": 9,
            "reservation": { "from": 0, "to": 20 }, "title": "I",
            "cadenza": [{ "firstBlockId": 15, "lastBlockId": 18,
                          "reservation": { "from": 15, "to": 20 } }]
        }"#;
        let mov: Movement = serde_json::from_str(json).unwrap();
        let passages: Vec<_> = mov.passages().collect();
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].prefix, "");
        assert_eq!(passages[1].prefix, "c");
        assert_eq!(passages[1].first, BlockId(15));
    }

    #[test]
    fn test_reservation_relations() {
        let outer = Reservation::new(100, 200);
        assert!(outer.contains(BlockId(100)));
        assert!(!outer.contains(BlockId(200)));
        assert!(outer.overlaps(&Reservation::new(199, 250)));
        assert!(!outer.overlaps(&Reservation::new(200, 250)));
        assert!(outer.encloses(&Reservation::new(150, 200)));
        assert!(Reservation::new(5, 5).is_empty());
    }

    #[test]
    fn test_time_entry_uses_id_field() {
        let entry: TimeEntry = serde_json::from_str(r#"{ "id": 42, "time": 12.5 }"#).unwrap();
        assert_eq!(entry, TimeEntry::new(42, 12.5));
    }

    #[test]
    fn test_localized_title_falls_back_when_empty() {
        assert_eq!(pick_title("Sonata", Some(""), true), "Sonata");
        assert_eq!(pick_title("Sonata", None, true), "Sonata");
        assert_eq!(pick_title("Sonata", Some("ソナタ"), true), "ソナタ");
    }
}
