//! # Data Validation
//!
//! Static documents may decode cleanly and still be unusable. A session is only
//! built from documents that pass every rule below; any violation fails the whole
//! load with [`SyncError::DataError`].
//!
//! ## Music Rules
//! - Movement numbers are unique and fit the marker range (`9800 + n < 9900`)
//! - Movements are listed in ascending number order
//! - `firstBlockId <= lastBlockId` for every movement and cadenza, and both lie
//!   inside the owner's own reservation
//! - Reservations are non-empty, lie inside `[0, 10000)` and avoid `[9800, 9900)`
//! - Movement reservations are pairwise disjoint
//! - A cadenza reservation is either disjoint from its movement's reservation or
//!   enclosed by it, and never touches another movement
//!
//! ## Video Rules
//! - Every time is finite and non-negative
//! - Times are in non-decreasing order
//! - Every block identifier lies inside `[0, 10000)`

use crate::block::{BlockId, BLOCK_SPACE, MARKER_BASE, MARKER_END};
use crate::error::SyncError;
use crate::model::{MusicData, Reservation, ScoreData, VideoData};

/// Validate movement structure of a music document.
pub fn validate_music(music: &MusicData) -> Result<(), SyncError> {
    let fail = |message: String| SyncError::DataError {
        music_id: music.music_id.clone(),
        message,
    };

    for (i, mov) in music.movements.iter().enumerate() {
        if BlockId::movement_marker(mov.number).is_none() {
            return Err(fail(format!(
                "movement number {} does not fit the marker range",
                mov.number
            )));
        }
        if music.movements[..i].iter().any(|m| m.number == mov.number) {
            return Err(fail(format!("movement {} is listed twice", mov.number)));
        }
        if mov.first_block_id > mov.last_block_id {
            return Err(fail(format!(
                "movement {} starts at block {} after its last block {}",
                mov.number, mov.first_block_id, mov.last_block_id
            )));
        }
        check_reservation(&mov.reservation)
            .map_err(|e| fail(format!("movement {}: {}", mov.number, e)))?;
        if !(mov.reservation.contains(mov.first_block_id)
            && mov.reservation.contains(mov.last_block_id))
        {
            return Err(fail(format!(
                "movement {} blocks {}..={} lie outside its reservation [{}, {})",
                mov.number,
                mov.first_block_id,
                mov.last_block_id,
                mov.reservation.from,
                mov.reservation.to
            )));
        }
        if i > 0 && music.movements[i - 1].number > mov.number {
            return Err(fail(format!(
                "movement {} is listed after movement {}",
                mov.number,
                music.movements[i - 1].number
            )));
        }

        for (j, cad) in mov.cadenza.iter().enumerate() {
            if cad.first_block_id > cad.last_block_id {
                return Err(fail(format!(
                    "cadenza {} of movement {} starts after its last block",
                    j, mov.number
                )));
            }
            check_reservation(&cad.reservation)
                .map_err(|e| fail(format!("cadenza {} of movement {}: {}", j, mov.number, e)))?;
            if !(cad.reservation.contains(cad.first_block_id)
                && cad.reservation.contains(cad.last_block_id))
            {
                return Err(fail(format!(
                    "cadenza {} of movement {} blocks {}..={} lie outside its reservation",
                    j, mov.number, cad.first_block_id, cad.last_block_id
                )));
            }
            if mov.reservation.overlaps(&cad.reservation)
                && !mov.reservation.encloses(&cad.reservation)
            {
                return Err(fail(format!(
                    "cadenza {} of movement {} straddles the movement reservation",
                    j, mov.number
                )));
            }
            if mov.cadenza[..j]
                .iter()
                .any(|other| other.reservation.overlaps(&cad.reservation))
            {
                return Err(fail(format!(
                    "cadenzas of movement {} overlap each other",
                    mov.number
                )));
            }
        }
    }

    // Cross-movement disjointness, cadenzas included.
    for (i, a) in music.movements.iter().enumerate() {
        for b in &music.movements[i + 1..] {
            let a_ranges = std::iter::once(&a.reservation).chain(a.cadenza.iter().map(|c| &c.reservation));
            for ra in a_ranges {
                let b_ranges = std::iter::once(&b.reservation).chain(b.cadenza.iter().map(|c| &c.reservation));
                for rb in b_ranges {
                    if ra.overlaps(rb) {
                        return Err(fail(format!(
                            "reservations of movements {} and {} overlap",
                            a.number, b.number
                        )));
                    }
                }
            }
        }
    }

    Ok(())
}

fn check_reservation(reservation: &Reservation) -> Result<(), String> {
    if reservation.is_empty() {
        return Err(format!(
            "reservation [{}, {}) is empty",
            reservation.from, reservation.to
        ));
    }
    if reservation.to > BLOCK_SPACE {
        return Err(format!(
            "reservation [{}, {}) exceeds the block space",
            reservation.from, reservation.to
        ));
    }
    if reservation.overlaps(&Reservation::new(MARKER_BASE, MARKER_END)) {
        return Err(format!(
            "reservation [{}, {}) intersects the movement marker range",
            reservation.from, reservation.to
        ));
    }
    Ok(())
}

/// Validate the time index of a video document.
pub fn validate_video(video: &VideoData) -> Result<(), SyncError> {
    let fail = |message: String| SyncError::DataError {
        music_id: video.music_id.clone(),
        message: format!("video {}: {}", video.video_id, message),
    };

    let mut previous = f64::NEG_INFINITY;
    for (i, entry) in video.times.iter().enumerate() {
        if !entry.time.is_finite() || entry.time < 0.0 {
            return Err(fail(format!("time entry {} has invalid time {}", i, entry.time)));
        }
        if entry.time < previous {
            return Err(fail(format!("time entries are not sorted at index {}", i)));
        }
        if !entry.block.in_space() {
            return Err(fail(format!(
                "time entry {} refers to block {} outside the block space",
                i, entry.block
            )));
        }
        previous = entry.time;
    }
    Ok(())
}

/// Validate block geometry of a score document.
pub fn validate_score(score: &ScoreData) -> Result<(), SyncError> {
    for page in &score.positions {
        for row in &page.rows {
            if !(row.top.is_finite() && row.height.is_finite()) || row.height < 0.0 {
                return Err(SyncError::DataError {
                    music_id: score.music_id.clone(),
                    message: format!(
                        "score {}: row {} on page {} has invalid geometry",
                        score.score_id, row.id, page.page
                    ),
                });
            }
            for block in &row.blocks {
                if !block.id.in_space() || !(block.width >= 0.0 && block.left.is_finite()) {
                    return Err(SyncError::DataError {
                        music_id: score.music_id.clone(),
                        message: format!(
                            "score {}: block {} on page {} has invalid geometry",
                            score.score_id, block.id, page.page
                        ),
                    });
                }
            }
        }
    }
    Ok(())
}
