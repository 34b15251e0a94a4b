//! Playback runtime for tempora.
//!
//! - [`collector`] - incremental cursors over time-ordered data
//! - [`interval`] - note intervals and contiguous groups derived from a sequence
//! - [`sequencer`] - real-time dispatch with controller chase on reposition
//! - [`visibility`] - show/hide rules for collector-driven visuals

pub mod clock;
pub mod collector;
pub mod config;
pub mod error;
pub mod interval;
pub mod sequencer;
pub mod visibility;

pub use clock::{ManualClock, SystemClock, WallClock};
pub use collector::{
    CollectorGroup, EventCollector, EventView, IntervalCollector, Reached, SeekHook, Seekable,
    SequenceCollector, Span, TemporalCollector, Timed, Timeline, Trigger,
};
pub use config::SequencerConfig;
pub use error::{Error, Result, StateError};
pub use interval::{contiguous_groups, note_intervals, Interval, IntervalGroup, NoteSpan};
pub use sequencer::{ChannelState, ChaseState, Sequencer};
pub use visibility::VisibilityRules;
