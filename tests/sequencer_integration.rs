//! Sequencer integration tests.
//!
//! Drives the dispatch thread with a manual clock and checks what reaches the
//! device: repositioning with chase, note-off flushing, state errors.
//!
//! Run with:
//! ```bash
//! cargo test -p tempora --test sequencer_integration
//! ```

mod helpers;

use helpers::*;
use std::collections::HashSet;
use tempora::prelude::*;
use tempora::StateError;

// ---------------------------------------------------------------------------
// 1. Reposition into the middle of a note
// ---------------------------------------------------------------------------

/// NoteOn@0, ProgramChange@500, NoteOff@1000; jump to 750 and play through.
#[test]
fn test_reposition_chases_program_without_replaying_notes() {
    let (mut sequencer, log, clock) = test_sequencer();
    sequencer.open().unwrap();
    sequencer
        .assign(ms_sequence(vec![
            Event::note_on(0, 0, 60, 100),
            Event::program_change(500, 0, 40),
            Event::note_off(1000, 0, 60),
        ]))
        .unwrap();

    sequencer.set_position(750).unwrap();
    assert_eq!(sequencer.position(), 750);

    sequencer.start().unwrap();
    clock.set(249);
    assert!(wait_until(|| sequencer.position() == 999));
    assert_eq!(log.count(|m| m.is_note_off()), 0);

    clock.set(250);
    assert!(wait_until(|| log.count(|m| m.is_note_off()) == 1));
    sequencer.stop().unwrap();

    let program_changes = log.count(|m| {
        *m == EventKind::ProgramChange {
            channel: 0,
            program: 40,
        }
    });
    assert_eq!(program_changes, 1);
    assert_eq!(log.count(|m| m.is_note_on()), 0);

    // The sequence's NoteOff arrives before the stop flush
    let messages = log.messages();
    let first_off = messages.iter().position(|m| m.is_note_off()).unwrap();
    assert_eq!(
        messages[first_off],
        EventKind::NoteOff {
            channel: 0,
            note: 60
        }
    );
}

// ---------------------------------------------------------------------------
// 2. Note-off completeness
// ---------------------------------------------------------------------------

#[test]
fn test_stop_releases_every_key() {
    let (mut sequencer, log, clock) = test_sequencer();
    sequencer.open().unwrap();
    sequencer
        .assign(ms_sequence(vec![
            Event::note_on(0, 0, 60, 100),
            Event::note_on(0, 9, 36, 100),
            Event::note_on(10, 15, 127, 100),
            Event::note_off(5000, 0, 60),
        ]))
        .unwrap();
    sequencer.start().unwrap();
    clock.set(20);
    assert!(wait_until(|| log.len() == 3));

    sequencer.stop().unwrap();

    let messages = log.messages();
    let released: HashSet<(u8, u8)> = messages[3..]
        .iter()
        .filter_map(|m| match *m {
            EventKind::NoteOff { channel, note } => Some((channel, note)),
            _ => None,
        })
        .collect();
    assert_eq!(released.len(), 16 * 128);
}

#[test]
fn test_reposition_while_running_releases_sounding_notes() {
    let (mut sequencer, log, clock) = test_sequencer();
    sequencer.open().unwrap();
    sequencer
        .assign(ms_sequence(vec![
            Event::note_on(0, 2, 64, 100),
            Event::note_off(1000, 2, 64),
        ]))
        .unwrap();
    sequencer.start().unwrap();
    assert!(wait_until(|| log.len() == 1));

    clock.set(100);
    sequencer.set_position(900).unwrap();
    assert!(sequencer.is_running());
    sequencer.stop().unwrap();

    assert!(log.messages()[1..].contains(&EventKind::NoteOff {
        channel: 2,
        note: 64
    }));
}

// ---------------------------------------------------------------------------
// 3. State errors through the umbrella error type
// ---------------------------------------------------------------------------

fn start_closed(sequencer: &mut Sequencer<RecordingDevice>) -> Result<()> {
    sequencer.start()?;
    Ok(())
}

#[test]
fn test_state_errors_convert_to_umbrella_error() {
    let (mut sequencer, log, _clock) = test_sequencer();

    let err = start_closed(&mut sequencer).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(tempora::core::Error::InvalidState(StateError::NotOpen))
    ));

    sequencer.open().unwrap();
    let err = start_closed(&mut sequencer).unwrap_err();
    assert!(matches!(
        err,
        Error::Core(tempora::core::Error::InvalidState(StateError::NoSequence))
    ));

    // Failed transitions leave the device untouched
    assert!(log.is_empty());
    assert!(!sequencer.is_running());
}

// ---------------------------------------------------------------------------
// 4. Tempo-mapped sequences
// ---------------------------------------------------------------------------

#[test]
fn test_dispatch_follows_tempo_map() {
    let (mut sequencer, log, clock) = test_sequencer();
    // 480 ticks per quarter, 120 BPM then 60 BPM from tick 960
    let map = TempoMap::new(480, [tempora::TempoChange::new(960, 1_000_000)]).unwrap();
    let sequence = std::sync::Arc::new(Sequence::new(
        vec![
            Event::note_on(0, 0, 60, 100),
            Event::note_off(960, 0, 60),
            Event::note_on(1440, 0, 62, 100),
        ],
        map,
    ));
    assert_eq!(sequence.times(), &[0, 1000, 2000]);

    sequencer.open().unwrap();
    sequencer.assign(sequence).unwrap();
    sequencer.start().unwrap();

    clock.set(1999);
    assert!(wait_until(|| log.len() == 2));
    clock.set(2000);
    assert!(wait_until(|| log.len() == 3));
    sequencer.stop().unwrap();
}

#[cfg(feature = "smf")]
#[test]
fn test_plays_parsed_midi_file() {
    let track: &[u8] = &[
        0x00, 0xC1, 0x05, // program change ch1
        0x00, 0x91, 0x3C, 0x64, // note on
        0x83, 0x60, 0x81, 0x3C, 0x00, // note off after 480 ticks
        0x00, 0xFF, 0x2F, 0x00,
    ];
    let mut data = Vec::new();
    data.extend_from_slice(b"MThd");
    data.extend_from_slice(&[0, 0, 0, 6, 0, 0, 0, 1, 0x01, 0xE0]);
    data.extend_from_slice(b"MTrk");
    data.extend_from_slice(&(track.len() as u32).to_be_bytes());
    data.extend_from_slice(track);

    let sequence = std::sync::Arc::new(Sequence::parse(&data).unwrap());
    assert_eq!(sequence.duration_millis(), 500);

    let (mut sequencer, log, clock) = test_sequencer();
    sequencer.open().unwrap();
    sequencer.assign(sequence).unwrap();
    sequencer.start().unwrap();
    clock.set(501);
    assert!(wait_until(|| !sequencer.is_running()));
    sequencer.poll().unwrap();

    let messages = log.messages();
    assert_eq!(
        &messages[..3],
        &[
            EventKind::ProgramChange {
                channel: 1,
                program: 5
            },
            EventKind::NoteOn {
                channel: 1,
                note: 60,
                velocity: 100
            },
            EventKind::NoteOff {
                channel: 1,
                note: 60
            },
        ]
    );
}
