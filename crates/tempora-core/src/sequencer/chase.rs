//! Controller state reconstruction for repositioning.
//!
//! Jumping into the middle of a sequence skips every program, controller,
//! bend and pressure message before the jump target. [`ChaseState`] replays
//! those messages into per-channel state so it can be re-emitted before
//! playback resumes.

use tempora_midi::{
    EventKind, OutputDevice, Result, Sequence, CHANNEL_COUNT, NOTE_COUNT, PITCH_BEND_CENTER,
};

/// Last known controller state of one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelState {
    pub program: Option<u8>,
    pub pitch_bend: u16,
    pub channel_pressure: u8,
    pub poly_pressure: [Option<u8>; NOTE_COUNT],
    pub controllers: [Option<u8>; NOTE_COUNT],
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            program: None,
            pitch_bend: PITCH_BEND_CENTER,
            channel_pressure: 0,
            poly_pressure: [None; NOTE_COUNT],
            controllers: [None; NOTE_COUNT],
        }
    }
}

/// Controller state of all 16 channels at some point in a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChaseState {
    channels: [ChannelState; CHANNEL_COUNT as usize],
}

impl Default for ChaseState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChaseState {
    pub fn new() -> Self {
        Self {
            channels: std::array::from_fn(|_| ChannelState::default()),
        }
    }

    /// State after every event strictly before `time` (ms).
    pub fn scan(sequence: &Sequence, time: u64) -> Self {
        let mut state = Self::new();
        let end = sequence.count_before(time);
        for event in &sequence.events()[..end] {
            state.apply(&event.kind);
        }
        state
    }

    /// Fold one message into the state. Notes and SysEx leave it unchanged.
    pub fn apply(&mut self, kind: &EventKind) {
        let Some(channel) = kind
            .channel()
            .and_then(|ch| self.channels.get_mut(ch as usize))
        else {
            return;
        };

        match *kind {
            EventKind::ProgramChange { program, .. } => channel.program = Some(program),
            EventKind::PitchBend { value, .. } => channel.pitch_bend = value,
            EventKind::ChannelPressure { pressure, .. } => channel.channel_pressure = pressure,
            EventKind::PolyPressure { note, pressure, .. } => {
                if let Some(slot) = channel.poly_pressure.get_mut(note as usize) {
                    *slot = Some(pressure);
                }
            }
            EventKind::ControlChange {
                controller, value, ..
            } => {
                if let Some(slot) = channel.controllers.get_mut(controller as usize) {
                    *slot = Some(value);
                }
            }
            EventKind::NoteOn { .. } | EventKind::NoteOff { .. } | EventKind::SysEx { .. } => {}
        }
    }

    pub fn channel(&self, channel: u8) -> Option<&ChannelState> {
        self.channels.get(channel as usize)
    }

    pub fn channels(&self) -> &[ChannelState] {
        &self.channels
    }

    /// Send the state to `device` and return the number of messages sent.
    ///
    /// Per channel, in order: controllers that were set (ascending number),
    /// poly pressures that were set (ascending note), the program if one was
    /// set, then pitch bend and channel pressure.
    pub fn emit<D: OutputDevice + ?Sized>(&self, device: &mut D) -> Result<usize> {
        let mut sent = 0;
        for (channel, state) in (0u8..).zip(self.channels.iter()) {
            for (controller, value) in (0u8..).zip(state.controllers.iter()) {
                if let Some(value) = *value {
                    device.send_control_change(channel, controller, value)?;
                    sent += 1;
                }
            }
            for (note, pressure) in (0u8..).zip(state.poly_pressure.iter()) {
                if let Some(pressure) = *pressure {
                    device.send_poly_pressure(channel, note, pressure)?;
                    sent += 1;
                }
            }
            if let Some(program) = state.program {
                device.send_program_change(channel, program)?;
                sent += 1;
            }
            device.send_pitch_bend(channel, state.pitch_bend)?;
            device.send_channel_pressure(channel, state.channel_pressure)?;
            sent += 2;
        }
        Ok(sent)
    }
}
