//! # Tempora - Real-time MIDI Playback
//!
//! Plays MIDI sequences through an output device from a dedicated dispatch
//! thread, and lets any number of consumers (lyrics, note visuals, meters)
//! follow the same timeline incrementally.
//!
//! ## Architecture
//!
//! Tempora is an umbrella crate that coordinates:
//! - **tempora-midi** - Events, tempo maps, sequences, output devices, SMF loading
//! - **tempora-core** - Sequencer, controller chase, temporal collectors, intervals
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use tempora::prelude::*;
//!
//! let sequence = Arc::new(Sequence::load("song.mid")?);
//!
//! let mut sequencer = Sequencer::new(RecordingDevice::new(), SequencerConfig::default())?;
//! sequencer.open()?;
//! sequencer.assign(Arc::clone(&sequence))?;
//! sequencer.start()?;
//!
//! // Elsewhere, follow the same clock
//! let mut notes = IntervalCollector::new(Arc::<[_]>::from(note_intervals(&sequence, |_| true)));
//! for note in notes.advance(sequencer.position()) {
//!     println!("note {} starts", note.payload.note);
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - `smf`
//! - `smf` - Standard MIDI File loading via midly
//! - `midi-io` - Hardware output via midir

/// Re-export of tempora-core for direct access
pub use tempora_core as core;

/// Re-export of tempora-midi for direct access
pub use tempora_midi as midi;

pub mod error;
pub use error::{Error, Result};

// Playback
pub use tempora_core::{
    ChannelState, ChaseState, ManualClock, Sequencer, SequencerConfig, StateError,
    SystemClock, WallClock,
};

// Collectors
pub use tempora_core::{
    contiguous_groups, note_intervals, CollectorGroup, EventCollector, EventView, Interval,
    IntervalCollector, IntervalGroup, NoteSpan, Reached, Seekable, SequenceCollector, Span,
    TemporalCollector, Timed, Timeline, VisibilityRules,
};

// MIDI data model
pub use tempora_midi::{
    DeviceLog, Event, EventKind, MessageDevice, MessageSink, MidiOutputMessage, OutputDevice,
    RecordingDevice, Sequence, TempoChange, TempoMap,
};

#[cfg(feature = "midi-io")]
pub use tempora_midi::{list_output_ports, MidirDevice, MidirSink, PortSelector};

/// Common imports for playback code.
pub mod prelude {
    // Playback
    pub use crate::core::{Sequencer, SequencerConfig};

    // Data model
    pub use crate::midi::{Event, EventKind, OutputDevice, RecordingDevice, Sequence, TempoMap};

    // Collectors
    pub use crate::core::{
        note_intervals, CollectorGroup, EventView, IntervalCollector, Seekable,
        TemporalCollector, Timeline, VisibilityRules,
    };

    #[cfg(feature = "midi-io")]
    pub use crate::midi::{MidirDevice, MidirSink, PortSelector};

    pub use crate::{Error, Result};
}
