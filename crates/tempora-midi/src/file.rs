//! Standard MIDI File conversion.
//!
//! Parsing is done by `midly`; this module merges the parsed tracks into one
//! [`Sequence`] and collects tempo meta events into its [`TempoMap`].

use crate::error::{Error, Result};
use crate::event::{Event, EventKind};
use crate::sequence::Sequence;
use crate::tempo_map::{TempoChange, TempoMap};
use midly::{MetaMessage, MidiMessage, Smf, Timing, Track, TrackEventKind};
use std::path::Path;
use tracing::debug;

impl Sequence {
    /// Load and convert a MIDI file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        Self::parse(&data)
    }

    /// Parse and convert a MIDI file from bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let smf = Smf::parse(data)?;
        Self::from_smf(&smf)
    }

    /// Convert an already parsed file. All tracks are merged.
    pub fn from_smf(smf: &Smf) -> Result<Self> {
        let ticks_per_quarter = match smf.header.timing {
            Timing::Metrical(tpq) => tpq.as_int(),
            Timing::Timecode(_, _) => {
                return Err(Error::MidiUnsupportedTiming);
            }
        };

        debug!(
            "Converting MIDI file: {} tracks, {} ticks per quarter",
            smf.tracks.len(),
            ticks_per_quarter
        );

        let mut events = Vec::new();
        let mut tempos = Vec::new();
        for track in smf.tracks.iter() {
            convert_track(track, &mut events, &mut tempos);
        }

        let tempo_map = TempoMap::new(ticks_per_quarter, tempos)?;
        let sequence = Sequence::new(events, tempo_map);

        debug!(
            "Converted {} MIDI events, duration: {} ms",
            sequence.len(),
            sequence.duration_millis()
        );

        Ok(sequence)
    }
}

fn convert_track(track: &Track, events: &mut Vec<Event>, tempos: &mut Vec<TempoChange>) {
    let mut tick = 0u64;

    for event in track.iter() {
        tick += event.delta.as_int() as u64;

        match event.kind {
            TrackEventKind::Midi { channel, message } => {
                events.push(Event::new(tick, convert_message(channel.as_int(), message)));
            }
            TrackEventKind::SysEx(data) => {
                events.push(Event::new(tick, frame_sysex(data)));
            }
            TrackEventKind::Meta(MetaMessage::Tempo(micros_per_quarter)) => {
                tempos.push(TempoChange::new(tick, micros_per_quarter.as_int()));
            }
            _ => {}
        }
    }
}

fn convert_message(channel: u8, message: MidiMessage) -> EventKind {
    match message {
        MidiMessage::NoteOn { key, vel } if vel.as_int() == 0 => {
            // Running-status note off
            debug!("Converting NoteOn with velocity 0 to NoteOff");
            EventKind::NoteOff {
                channel,
                note: key.as_int(),
            }
        }
        MidiMessage::NoteOn { key, vel } => EventKind::NoteOn {
            channel,
            note: key.as_int(),
            velocity: vel.as_int(),
        },
        MidiMessage::NoteOff { key, .. } => EventKind::NoteOff {
            channel,
            note: key.as_int(),
        },
        MidiMessage::Controller { controller, value } => EventKind::ControlChange {
            channel,
            controller: controller.as_int(),
            value: value.as_int(),
        },
        MidiMessage::ProgramChange { program } => EventKind::ProgramChange {
            channel,
            program: program.as_int(),
        },
        MidiMessage::PitchBend { bend } => EventKind::PitchBend {
            channel,
            value: bend.0.as_int(),
        },
        MidiMessage::ChannelAftertouch { vel } => EventKind::ChannelPressure {
            channel,
            pressure: vel.as_int(),
        },
        MidiMessage::Aftertouch { key, vel } => EventKind::PolyPressure {
            channel,
            note: key.as_int(),
            pressure: vel.as_int(),
        },
    }
}

/// `midly` strips the leading F0; restore the full `F0 ... F7` message.
fn frame_sysex(data: &[u8]) -> EventKind {
    let mut framed = Vec::with_capacity(data.len() + 2);
    framed.push(0xF0);
    framed.extend_from_slice(data);
    if framed.last() != Some(&0xF7) {
        framed.push(0xF7);
    }
    EventKind::SysEx { data: framed }
}
