//! Timestamped MIDI events.
//!
//! Events carry their position in ticks; conversion to milliseconds is the
//! job of the [`TempoMap`](crate::TempoMap) owned by a [`Sequence`](crate::Sequence).

use serde::{Deserialize, Serialize};

/// Number of MIDI 1.0 channels.
pub const CHANNEL_COUNT: u8 = 16;

/// Number of note (and controller) slots per channel.
pub const NOTE_COUNT: usize = 128;

/// Raw 14-bit pitch bend value meaning "no bend".
pub const PITCH_BEND_CENTER: u16 = 0x2000;

/// Largest raw 14-bit pitch bend value.
pub const PITCH_BEND_MAX: u16 = 0x3FFF;

/// Payload of a MIDI event.
///
/// Channels are 0-15, data bytes 0-127. Pitch bend is the raw 14-bit value
/// (0-16383, centre 8192).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    PitchBend { channel: u8, value: u16 },
    ChannelPressure { channel: u8, pressure: u8 },
    PolyPressure { channel: u8, note: u8, pressure: u8 },
    /// Complete system exclusive message, `F0 ... F7` framing included.
    SysEx { data: Vec<u8> },
}

impl EventKind {
    /// Channel addressed by a channel voice message, `None` for SysEx.
    pub fn channel(&self) -> Option<u8> {
        match *self {
            EventKind::NoteOn { channel, .. }
            | EventKind::NoteOff { channel, .. }
            | EventKind::ControlChange { channel, .. }
            | EventKind::ProgramChange { channel, .. }
            | EventKind::PitchBend { channel, .. }
            | EventKind::ChannelPressure { channel, .. }
            | EventKind::PolyPressure { channel, .. } => Some(channel),
            EventKind::SysEx { .. } => None,
        }
    }

    /// Note number for note and poly pressure messages.
    pub fn note(&self) -> Option<u8> {
        match *self {
            EventKind::NoteOn { note, .. }
            | EventKind::NoteOff { note, .. }
            | EventKind::PolyPressure { note, .. } => Some(note),
            _ => None,
        }
    }

    pub fn is_note_on(&self) -> bool {
        matches!(self, EventKind::NoteOn { .. })
    }

    pub fn is_note_off(&self) -> bool {
        matches!(self, EventKind::NoteOff { .. })
    }
}

/// A MIDI message positioned in ticks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Absolute position in ticks from the start of the sequence
    pub tick: u64,
    pub kind: EventKind,
}

impl Event {
    pub fn new(tick: u64, kind: EventKind) -> Self {
        Self { tick, kind }
    }

    pub fn note_on(tick: u64, channel: u8, note: u8, velocity: u8) -> Self {
        Self::new(
            tick,
            EventKind::NoteOn {
                channel,
                note,
                velocity,
            },
        )
    }

    pub fn note_off(tick: u64, channel: u8, note: u8) -> Self {
        Self::new(tick, EventKind::NoteOff { channel, note })
    }

    pub fn control_change(tick: u64, channel: u8, controller: u8, value: u8) -> Self {
        Self::new(
            tick,
            EventKind::ControlChange {
                channel,
                controller,
                value,
            },
        )
    }

    pub fn program_change(tick: u64, channel: u8, program: u8) -> Self {
        Self::new(tick, EventKind::ProgramChange { channel, program })
    }

    pub fn pitch_bend(tick: u64, channel: u8, value: u16) -> Self {
        Self::new(tick, EventKind::PitchBend { channel, value })
    }

    pub fn channel_pressure(tick: u64, channel: u8, pressure: u8) -> Self {
        Self::new(tick, EventKind::ChannelPressure { channel, pressure })
    }

    pub fn poly_pressure(tick: u64, channel: u8, note: u8, pressure: u8) -> Self {
        Self::new(
            tick,
            EventKind::PolyPressure {
                channel,
                note,
                pressure,
            },
        )
    }

    pub fn sysex(tick: u64, data: Vec<u8>) -> Self {
        Self::new(tick, EventKind::SysEx { data })
    }

    #[inline]
    pub fn channel(&self) -> Option<u8> {
        self.kind.channel()
    }
}
