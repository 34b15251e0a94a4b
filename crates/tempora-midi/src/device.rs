//! Output device abstraction.
//!
//! The dispatch engine only ever talks to an [`OutputDevice`]. Hardware
//! output lives behind [`MessageDevice`](crate::MessageDevice); tests and
//! headless renders use [`RecordingDevice`].

use crate::error::{Error, Result};
use crate::event::{EventKind, CHANNEL_COUNT, NOTE_COUNT};
use parking_lot::Mutex;
use std::sync::Arc;

/// A destination for channel voice and SysEx messages.
///
/// Implementations must refuse to send while closed.
pub trait OutputDevice: Send {
    fn open(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    fn send_note_on(&mut self, channel: u8, note: u8, velocity: u8) -> Result<()>;

    fn send_note_off(&mut self, channel: u8, note: u8) -> Result<()>;

    fn send_control_change(&mut self, channel: u8, controller: u8, value: u8) -> Result<()>;

    fn send_program_change(&mut self, channel: u8, program: u8) -> Result<()>;

    /// `value` is the raw 14-bit bend, centre 8192.
    fn send_pitch_bend(&mut self, channel: u8, value: u16) -> Result<()>;

    fn send_channel_pressure(&mut self, channel: u8, pressure: u8) -> Result<()>;

    fn send_poly_pressure(&mut self, channel: u8, note: u8, pressure: u8) -> Result<()>;

    fn send_sysex(&mut self, data: &[u8]) -> Result<()>;

    /// Route an event payload to the matching `send_*` method.
    fn send_event(&mut self, kind: &EventKind) -> Result<()> {
        match *kind {
            EventKind::NoteOn {
                channel,
                note,
                velocity,
            } => self.send_note_on(channel, note, velocity),
            EventKind::NoteOff { channel, note } => self.send_note_off(channel, note),
            EventKind::ControlChange {
                channel,
                controller,
                value,
            } => self.send_control_change(channel, controller, value),
            EventKind::ProgramChange { channel, program } => {
                self.send_program_change(channel, program)
            }
            EventKind::PitchBend { channel, value } => self.send_pitch_bend(channel, value),
            EventKind::ChannelPressure { channel, pressure } => {
                self.send_channel_pressure(channel, pressure)
            }
            EventKind::PolyPressure {
                channel,
                note,
                pressure,
            } => self.send_poly_pressure(channel, note, pressure),
            EventKind::SysEx { ref data } => self.send_sysex(data),
        }
    }

    /// Note-off for every note on every channel.
    fn all_notes_off(&mut self) -> Result<()> {
        for channel in 0..CHANNEL_COUNT {
            for note in 0..NOTE_COUNT as u8 {
                self.send_note_off(channel, note)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct LogState {
    messages: Vec<EventKind>,
    is_open: bool,
    open_count: usize,
}

/// Shared view of what a [`RecordingDevice`] has received.
///
/// Cloning is cheap; every clone observes the same log.
#[derive(Debug, Clone, Default)]
pub struct DeviceLog {
    state: Arc<Mutex<LogState>>,
}

impl DeviceLog {
    /// Copy of all messages received so far.
    pub fn messages(&self) -> Vec<EventKind> {
        self.state.lock().messages.clone()
    }

    /// Remove and return all messages received so far.
    pub fn take(&self) -> Vec<EventKind> {
        std::mem::take(&mut self.state.lock().messages)
    }

    pub fn len(&self) -> usize {
        self.state.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().messages.is_empty()
    }

    pub fn clear(&self) {
        self.state.lock().messages.clear();
    }

    /// Number of messages matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&EventKind) -> bool) -> usize {
        self.state
            .lock()
            .messages
            .iter()
            .filter(|m| predicate(m))
            .count()
    }

    pub fn is_open(&self) -> bool {
        self.state.lock().is_open
    }

    /// How many times the device has been opened.
    pub fn open_count(&self) -> usize {
        self.state.lock().open_count
    }
}

/// Headless device that records every message it receives.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    log: DeviceLog,
    fail_after: Option<usize>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send fail once `count` messages have been recorded.
    pub fn fail_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }

    /// Handle to the log, usable after the device has been moved away.
    pub fn log(&self) -> DeviceLog {
        self.log.clone()
    }

    fn record(&mut self, message: EventKind) -> Result<()> {
        let mut state = self.log.state.lock();
        if !state.is_open {
            return Err(Error::DeviceClosed);
        }
        if self.fail_after.is_some_and(|n| state.messages.len() >= n) {
            return Err(Error::MidiDevice("recording device failure".into()));
        }
        state.messages.push(message);
        Ok(())
    }
}

impl OutputDevice for RecordingDevice {
    fn open(&mut self) -> Result<()> {
        let mut state = self.log.state.lock();
        if state.is_open {
            return Err(Error::DeviceAlreadyOpen);
        }
        state.is_open = true;
        state.open_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.log.state.lock().is_open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.log.is_open()
    }

    fn send_note_on(&mut self, channel: u8, note: u8, velocity: u8) -> Result<()> {
        self.record(EventKind::NoteOn {
            channel,
            note,
            velocity,
        })
    }

    fn send_note_off(&mut self, channel: u8, note: u8) -> Result<()> {
        self.record(EventKind::NoteOff { channel, note })
    }

    fn send_control_change(&mut self, channel: u8, controller: u8, value: u8) -> Result<()> {
        self.record(EventKind::ControlChange {
            channel,
            controller,
            value,
        })
    }

    fn send_program_change(&mut self, channel: u8, program: u8) -> Result<()> {
        self.record(EventKind::ProgramChange { channel, program })
    }

    fn send_pitch_bend(&mut self, channel: u8, value: u16) -> Result<()> {
        self.record(EventKind::PitchBend { channel, value })
    }

    fn send_channel_pressure(&mut self, channel: u8, pressure: u8) -> Result<()> {
        self.record(EventKind::ChannelPressure { channel, pressure })
    }

    fn send_poly_pressure(&mut self, channel: u8, note: u8, pressure: u8) -> Result<()> {
        self.record(EventKind::PolyPressure {
            channel,
            note,
            pressure,
        })
    }

    fn send_sysex(&mut self, data: &[u8]) -> Result<()> {
        self.record(EventKind::SysEx {
            data: data.to_vec(),
        })
    }
}
