//! Piecewise tick to wall-time mapping.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// 120 BPM, the tempo in effect until the first tempo change.
pub const DEFAULT_MICROS_PER_QUARTER: u32 = 500_000;

/// A tempo change at a tick position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoChange {
    pub tick: u64,
    pub micros_per_quarter: u32,
}

impl TempoChange {
    pub fn new(tick: u64, micros_per_quarter: u32) -> Self {
        Self {
            tick,
            micros_per_quarter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    tick: u64,
    micros_per_quarter: u32,
    /// Elapsed time at `tick`, in microseconds scaled by ticks-per-quarter.
    offset: u128,
}

/// Tempo map for one sequence.
///
/// Segment offsets are precomputed, so conversion is a binary search plus
/// integer arithmetic. Conversion is exact up to the final floor to
/// milliseconds and is monotonic non-decreasing in the tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempoMap {
    ticks_per_quarter: u16,
    segments: Vec<Segment>,
}

impl TempoMap {
    /// Build a tempo map from a resolution and an unordered list of changes.
    ///
    /// Changes at the same tick keep the last one given.
    pub fn new(
        ticks_per_quarter: u16,
        changes: impl IntoIterator<Item = TempoChange>,
    ) -> Result<Self> {
        if ticks_per_quarter == 0 {
            return Err(Error::InvalidTempoMap(
                "ticks per quarter note must be non-zero".into(),
            ));
        }

        let mut changes: Vec<TempoChange> = changes.into_iter().collect();
        if let Some(change) = changes.iter().find(|c| c.micros_per_quarter == 0) {
            return Err(Error::InvalidTempoMap(format!(
                "zero tempo at tick {}",
                change.tick
            )));
        }
        // Stable, so equal ticks stay in input order and the last one wins below.
        changes.sort_by_key(|c| c.tick);

        let mut segments: Vec<Segment> = Vec::with_capacity(changes.len() + 1);
        if changes.first().map_or(true, |c| c.tick > 0) {
            segments.push(Segment {
                tick: 0,
                micros_per_quarter: DEFAULT_MICROS_PER_QUARTER,
                offset: 0,
            });
        }

        for change in changes {
            match segments.last_mut() {
                Some(last) if last.tick == change.tick => {
                    last.micros_per_quarter = change.micros_per_quarter;
                }
                Some(last) => {
                    let offset = last.offset
                        + (change.tick - last.tick) as u128 * last.micros_per_quarter as u128;
                    segments.push(Segment {
                        tick: change.tick,
                        micros_per_quarter: change.micros_per_quarter,
                        offset,
                    });
                }
                None => segments.push(Segment {
                    tick: change.tick,
                    micros_per_quarter: change.micros_per_quarter,
                    offset: 0,
                }),
            }
        }

        Ok(Self {
            ticks_per_quarter,
            segments,
        })
    }

    /// A single tempo for the whole sequence.
    pub fn constant(ticks_per_quarter: u16, micros_per_quarter: u32) -> Result<Self> {
        Self::new(
            ticks_per_quarter,
            [TempoChange::new(0, micros_per_quarter)],
        )
    }

    /// One tick per millisecond. Handy when events are authored in ms.
    pub fn millisecond_ticks() -> Self {
        Self {
            ticks_per_quarter: 1000,
            segments: vec![Segment {
                tick: 0,
                micros_per_quarter: 1_000_000,
                offset: 0,
            }],
        }
    }

    #[inline]
    pub fn ticks_per_quarter(&self) -> u16 {
        self.ticks_per_quarter
    }

    /// Tempo changes in effect, sorted by tick, one per tick.
    pub fn changes(&self) -> impl Iterator<Item = TempoChange> + '_ {
        self.segments
            .iter()
            .map(|s| TempoChange::new(s.tick, s.micros_per_quarter))
    }

    fn segment_at(&self, tick: u64) -> &Segment {
        // The first segment always starts at tick 0, so the index is never 0 here.
        let index = self.segments.partition_point(|s| s.tick <= tick);
        &self.segments[index.saturating_sub(1)]
    }

    /// Tempo in effect at `tick`.
    pub fn micros_per_quarter_at(&self, tick: u64) -> u32 {
        self.segment_at(tick).micros_per_quarter
    }

    pub fn bpm_at(&self, tick: u64) -> f64 {
        60_000_000.0 / self.micros_per_quarter_at(tick) as f64
    }

    /// Absolute time of `tick` in microseconds.
    pub fn tick_to_micros(&self, tick: u64) -> u64 {
        let segment = self.segment_at(tick);
        let scaled =
            segment.offset + (tick - segment.tick) as u128 * segment.micros_per_quarter as u128;
        u64::try_from(scaled / self.ticks_per_quarter as u128).unwrap_or(u64::MAX)
    }

    /// Absolute time of `tick` in milliseconds (floored).
    #[inline]
    pub fn tick_to_millis(&self, tick: u64) -> u64 {
        self.tick_to_micros(tick) / 1000
    }
}

impl Default for TempoMap {
    /// 480 ticks per quarter at 120 BPM.
    fn default() -> Self {
        Self {
            ticks_per_quarter: 480,
            segments: vec![Segment {
                tick: 0,
                micros_per_quarter: DEFAULT_MICROS_PER_QUARTER,
                offset: 0,
            }],
        }
    }
}
