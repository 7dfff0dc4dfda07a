//! # Measure Labels
//!
//! Derives the human-readable measure label shown for a block.
//!
//! ## Numbering
//! Each passage (a movement body, or one of its cadenzas) is walked from its
//! first block to its last with a measure counter seeded from the low decimal
//! digit of the first block id. Per block, in priority order:
//!
//! 1. [`EndingMode::Omit`] only: a first-ending block takes `<alt>'` from a
//!    separate counter; the main counter does not move.
//! 2. The first half of a divided measure takes `<n>a`; the counter does not move.
//! 3. The block after a divided-first block takes `<n>b`; the counter advances.
//! 4. Anything else takes `<n>`; the counter advances.
//!
//! Whenever the main counter advances, the alternate-ending counter is reset to
//! it, so a first-ending run starts at the number the next measure would get.
//! Cadenza labels carry a `c` prefix and use their own counters. The ending
//! mode applies uniformly to movement bodies and cadenzas.
//!
//! ## Example
//! ```rust
//! use simulscore::{BlockId, EndingMode, MeasureLabeler, Movement, Reservation};
//!
//! let movement = Movement {
//!     number: 1,
//!     first_block_id: BlockId(100),
//!     last_block_id: BlockId(105),
//!     reservation: Reservation::new(100, 200),
//!     title: "I. Allegro".to_string(),
//!     title_localized: None,
//!     divided_first_block_ids: vec![BlockId(102)],
//!     first_ending_block_ids: vec![],
//!     cadenza: vec![],
//! };
//! let labeler = MeasureLabeler::new(&[movement]);
//! assert_eq!(labeler.label(BlockId(102), EndingMode::Count), "2a");
//! assert_eq!(labeler.label(BlockId(103), EndingMode::Count), "2b");
//! assert_eq!(labeler.label(BlockId(104), EndingMode::Count), "3");
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::block::BlockId;
use crate::model::{Movement, Passage};

/// How first-ending passages are numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndingMode {
    /// First endings are numbered in sequence with everything else.
    #[default]
    Count,
    /// First endings get their own primed numbering track.
    Omit,
}

impl EndingMode {
    pub fn from_omit_flag(omit_first_endings: bool) -> Self {
        if omit_first_endings {
            EndingMode::Omit
        } else {
            EndingMode::Count
        }
    }
}

/// Precomputed label tables for both ending modes.
#[derive(Debug, Clone, Default)]
pub struct MeasureLabeler {
    counted: HashMap<BlockId, String>,
    omitted: HashMap<BlockId, String>,
}

impl MeasureLabeler {
    pub fn new(movements: &[Movement]) -> Self {
        let mut counted = HashMap::new();
        let mut omitted = HashMap::new();
        for passage in movements.iter().flat_map(Movement::passages) {
            label_passage(&passage, EndingMode::Count, &mut counted);
            label_passage(&passage, EndingMode::Omit, &mut omitted);
        }
        Self { counted, omitted }
    }

    /// Label of `block` under `mode`, or `""` when the block has no measure.
    pub fn label(&self, block: BlockId, mode: EndingMode) -> &str {
        let table = match mode {
            EndingMode::Count => &self.counted,
            EndingMode::Omit => &self.omitted,
        };
        table.get(&block).map(String::as_str).unwrap_or("")
    }

    pub fn has_measure(&self, block: BlockId) -> bool {
        self.counted.contains_key(&block)
    }
}

fn label_passage(passage: &Passage<'_>, mode: EndingMode, out: &mut HashMap<BlockId, String>) {
    let divided: HashSet<BlockId> = passage.divided_first.iter().copied().collect();
    let first_ending: HashSet<BlockId> = passage.first_ending.iter().copied().collect();

    let mut measure = passage.first.0 % 10;
    let mut alt = measure;

    for id in passage.first.0..=passage.last.0 {
        let block = BlockId(id);
        let label = if mode == EndingMode::Omit && first_ending.contains(&block) {
            let label = format!("{}'", alt);
            alt += 1;
            label
        } else if divided.contains(&block) {
            format!("{}a", measure)
        } else if block.previous().is_some_and(|prev| divided.contains(&prev)) {
            let label = format!("{}b", measure);
            measure += 1;
            alt = measure;
            label
        } else {
            let label = measure.to_string();
            measure += 1;
            alt = measure;
            label
        };
        out.insert(block, format!("{}{}", passage.prefix, label));
    }
}
