//! MIDI 1.0 wire encoding and the byte-level device adapter.

use crate::device::OutputDevice;
use crate::error::{Error, Result};
use crate::event::{EventKind, PITCH_BEND_MAX};
use midi_msg::{Channel, ChannelVoiceMsg, ControlChange, MidiMsg};
use tracing::debug;

/// An encoded MIDI message ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiOutputMessage {
    pub bytes: Vec<u8>,
}

#[inline]
fn u7(byte: u8) -> u8 {
    byte & 0x7F
}

impl MidiOutputMessage {
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::from_event(&EventKind::NoteOn {
            channel,
            note,
            velocity,
        })
    }

    pub fn note_off(channel: u8, note: u8) -> Self {
        Self::from_event(&EventKind::NoteOff { channel, note })
    }

    pub fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        Self::from_event(&EventKind::ControlChange {
            channel,
            controller,
            value,
        })
    }

    pub fn program_change(channel: u8, program: u8) -> Self {
        Self::from_event(&EventKind::ProgramChange { channel, program })
    }

    /// `value`: raw 14-bit (0 to 16383, centre 8192).
    pub fn pitch_bend(channel: u8, value: u16) -> Self {
        Self::from_event(&EventKind::PitchBend { channel, value })
    }

    pub fn channel_pressure(channel: u8, pressure: u8) -> Self {
        Self::from_event(&EventKind::ChannelPressure { channel, pressure })
    }

    pub fn poly_pressure(channel: u8, note: u8, pressure: u8) -> Self {
        Self::from_event(&EventKind::PolyPressure {
            channel,
            note,
            pressure,
        })
    }

    /// SysEx bytes are stored framed (`F0 .. F7`) and sent as given.
    pub fn sysex(data: &[u8]) -> Self {
        Self {
            bytes: data.to_vec(),
        }
    }

    pub fn from_event(kind: &EventKind) -> Self {
        let (channel, msg) = match *kind {
            EventKind::SysEx { ref data } => return Self::sysex(data),
            EventKind::NoteOn {
                channel,
                note,
                velocity,
            } => (
                channel,
                ChannelVoiceMsg::NoteOn {
                    note: u7(note),
                    velocity: u7(velocity),
                },
            ),
            EventKind::NoteOff { channel, note } => (
                channel,
                ChannelVoiceMsg::NoteOff {
                    note: u7(note),
                    velocity: 0,
                },
            ),
            EventKind::ControlChange {
                channel,
                controller,
                value,
            } => (
                channel,
                ChannelVoiceMsg::ControlChange {
                    control: ControlChange::CC {
                        control: u7(controller),
                        value: u7(value),
                    },
                },
            ),
            EventKind::ProgramChange { channel, program } => (
                channel,
                ChannelVoiceMsg::ProgramChange {
                    program: u7(program),
                },
            ),
            EventKind::PitchBend { channel, value } => (
                channel,
                ChannelVoiceMsg::PitchBend {
                    bend: value.min(PITCH_BEND_MAX),
                },
            ),
            EventKind::ChannelPressure { channel, pressure } => (
                channel,
                ChannelVoiceMsg::ChannelPressure {
                    pressure: u7(pressure),
                },
            ),
            EventKind::PolyPressure {
                channel,
                note,
                pressure,
            } => (
                channel,
                ChannelVoiceMsg::PolyPressure {
                    note: u7(note),
                    pressure: u7(pressure),
                },
            ),
        };
        let msg = MidiMsg::ChannelVoice {
            channel: Channel::from_u8(channel.min(15)), // MIDI channels are 0-15
            msg,
        };
        Self {
            bytes: msg.to_midi(),
        }
    }
}

impl From<&EventKind> for MidiOutputMessage {
    fn from(kind: &EventKind) -> Self {
        Self::from_event(kind)
    }
}

/// Byte-level transport behind a [`MessageDevice`].
pub trait MessageSink: Send {
    fn connect(&mut self) -> Result<()>;

    fn disconnect(&mut self) -> Result<()>;

    fn send_bytes(&mut self, bytes: &[u8]) -> Result<()>;
}

/// [`OutputDevice`] that encodes every call to raw MIDI bytes and hands them
/// to a [`MessageSink`].
#[derive(Debug)]
pub struct MessageDevice<S> {
    sink: S,
    is_open: bool,
}

impl<S: MessageSink> MessageDevice<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            is_open: false,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn send(&mut self, message: MidiOutputMessage) -> Result<()> {
        if !self.is_open {
            return Err(Error::DeviceClosed);
        }
        self.sink.send_bytes(&message.bytes)
    }
}

impl<S: MessageSink> OutputDevice for MessageDevice<S> {
    fn open(&mut self) -> Result<()> {
        if self.is_open {
            return Err(Error::DeviceAlreadyOpen);
        }
        self.sink.connect()?;
        self.is_open = true;
        debug!("Message device opened");
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if !self.is_open {
            return Ok(());
        }
        self.is_open = false;
        self.sink.disconnect()?;
        debug!("Message device closed");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.is_open
    }

    fn send_note_on(&mut self, channel: u8, note: u8, velocity: u8) -> Result<()> {
        self.send(MidiOutputMessage::note_on(channel, note, velocity))
    }

    fn send_note_off(&mut self, channel: u8, note: u8) -> Result<()> {
        self.send(MidiOutputMessage::note_off(channel, note))
    }

    fn send_control_change(&mut self, channel: u8, controller: u8, value: u8) -> Result<()> {
        self.send(MidiOutputMessage::control_change(channel, controller, value))
    }

    fn send_program_change(&mut self, channel: u8, program: u8) -> Result<()> {
        self.send(MidiOutputMessage::program_change(channel, program))
    }

    fn send_pitch_bend(&mut self, channel: u8, value: u16) -> Result<()> {
        self.send(MidiOutputMessage::pitch_bend(channel, value))
    }

    fn send_channel_pressure(&mut self, channel: u8, pressure: u8) -> Result<()> {
        self.send(MidiOutputMessage::channel_pressure(channel, pressure))
    }

    fn send_poly_pressure(&mut self, channel: u8, note: u8, pressure: u8) -> Result<()> {
        self.send(MidiOutputMessage::poly_pressure(channel, note, pressure))
    }

    fn send_sysex(&mut self, data: &[u8]) -> Result<()> {
        self.send(MidiOutputMessage::sysex(data))
    }

    fn send_event(&mut self, kind: &EventKind) -> Result<()> {
        self.send(MidiOutputMessage::from_event(kind))
    }
}
