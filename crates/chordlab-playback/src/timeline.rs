//! The chord-block timeline.
//!
//! A [`Timeline`] is an ordered list of [`ChordBlock`]s positioned on the
//! eighth-note grid. Reordering recomputes positions into a contiguous
//! cumulative layout; free moves re-sort by position but may overlap, in
//! which case overlapping blocks simply sound together.

use crate::errors::{PlaybackError, Result};
use chordlab_theory::PitchClass;

/// A chord placed on the timeline.
///
/// `position` and `duration` are in eighth-note units.
#[derive(Clone, Debug, PartialEq)]
pub struct ChordBlock {
    /// Timeline-unique id.
    pub id: u64,
    /// Root pitch class the intervals are stacked on.
    pub root: PitchClass,
    /// Semitone offsets from the root, ascending, deduplicated.
    pub intervals: Vec<i32>,
    /// Roman-numeral label carried for display.
    pub numeral: String,
    /// Start position in eighths (>= 0).
    pub position: f64,
    /// Length in eighths (> 0).
    pub duration: f64,
}

impl ChordBlock {
    /// End position of the block in eighths.
    pub fn end(&self) -> f64 {
        self.position + self.duration
    }
}

/// Ordered chord-block list with grid positioning.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    blocks: Vec<ChordBlock>,
    next_id: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chord at the end of the timeline. Returns the block id.
    pub fn add_block(
        &mut self,
        root: PitchClass,
        intervals: &[i32],
        numeral: impl Into<String>,
        duration: f64,
    ) -> Result<u64> {
        if duration.is_nan() || duration <= 0.0 {
            return Err(PlaybackError::InvalidDuration(duration));
        }
        let id = self.next_id;
        self.next_id += 1;
        let mut intervals = intervals.to_vec();
        intervals.sort_unstable();
        intervals.dedup();
        self.blocks.push(ChordBlock {
            id,
            root,
            intervals,
            numeral: numeral.into(),
            position: self.total_duration(),
            duration,
        });
        Ok(id)
    }

    /// Remove a block. Later blocks keep their positions (a gap remains
    /// until the next reorder).
    pub fn remove(&mut self, id: u64) -> Result<()> {
        let index = self.index_of(id)?;
        self.blocks.remove(index);
        Ok(())
    }

    /// Change a block's duration.
    pub fn resize(&mut self, id: u64, duration: f64) -> Result<()> {
        if duration.is_nan() || duration <= 0.0 {
            return Err(PlaybackError::InvalidDuration(duration));
        }
        let index = self.index_of(id)?;
        self.blocks[index].duration = duration;
        Ok(())
    }

    /// Move the block at `from` to index `to`, then recompute all
    /// positions into a contiguous cumulative sequence.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<()> {
        if from >= self.blocks.len() {
            return Err(PlaybackError::IndexOutOfRange(from));
        }
        if to >= self.blocks.len() {
            return Err(PlaybackError::IndexOutOfRange(to));
        }
        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        let mut cursor = 0.0;
        for block in &mut self.blocks {
            block.position = cursor;
            cursor += block.duration;
        }
        Ok(())
    }

    /// Move a block to an arbitrary grid position.
    ///
    /// Blocks are re-sorted by position but not forced apart; overlap is
    /// allowed and overlapping blocks play simultaneously.
    pub fn move_to(&mut self, id: u64, position: f64) -> Result<()> {
        let index = self.index_of(id)?;
        self.blocks[index].position = position.max(0.0);
        self.blocks
            .sort_by(|a, b| a.position.total_cmp(&b.position));
        Ok(())
    }

    /// Sum of all block durations in eighths.
    pub fn total_duration(&self) -> f64 {
        self.blocks.iter().map(|b| b.duration).sum()
    }

    /// The block sounding at a grid time, if any. With overlapping
    /// blocks the earliest-positioned match wins.
    pub fn block_at(&self, time: f64) -> Option<&ChordBlock> {
        self.blocks.iter().find(|b| time >= b.position && time < b.end())
    }

    pub fn blocks(&self) -> &[ChordBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Remove all blocks.
    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    fn index_of(&self, id: u64) -> Result<usize> {
        self.blocks
            .iter()
            .position(|b| b.id == id)
            .ok_or(PlaybackError::UnknownBlock(id))
    }
}
