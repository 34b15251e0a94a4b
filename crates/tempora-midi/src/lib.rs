//! MIDI data model for tempora.
//!
//! Provides timestamped events, tempo maps, immutable sequences, and the
//! [`OutputDevice`] seam the dispatch engine plays through.
//!
//! Feature gates: `smf` (Standard MIDI File conversion via midly, default),
//! `midi-io` (hardware output via midir).

pub mod error;
pub use error::{Error, Result};

pub mod event;
pub use event::{Event, EventKind, CHANNEL_COUNT, NOTE_COUNT, PITCH_BEND_CENTER, PITCH_BEND_MAX};

pub mod tempo_map;
pub use tempo_map::{TempoChange, TempoMap, DEFAULT_MICROS_PER_QUARTER};

pub mod sequence;
pub use sequence::Sequence;

pub mod device;
pub use device::{DeviceLog, OutputDevice, RecordingDevice};

pub mod message;
pub use message::{MessageDevice, MessageSink, MidiOutputMessage};

#[cfg(feature = "smf")]
pub(crate) mod file;

#[cfg(feature = "midi-io")]
pub mod io;

#[cfg(feature = "midi-io")]
pub use io::{list_output_ports, MidirDevice, MidirSink, MidiOutputPortInfo, PortSelector};
