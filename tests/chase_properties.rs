//! Property tests for chase reconstruction.
//!
//! Whatever a device would have seen by playing a sequence up to `t` must
//! leave it in the same controller state as the chase burst for `t`.
//!
//! Run with:
//! ```bash
//! cargo test -p tempora --test chase_properties
//! ```

mod helpers;

use helpers::*;
use proptest::prelude::*;
use tempora::prelude::*;
use tempora::ChaseState;

/// Snapshot read straight from the reconstructed state, without emitting it.
fn snapshot_of(state: &ChaseState) -> ControllerSnapshot {
    let mut snapshot = ControllerSnapshot::new();
    for (channel, ch) in (0u8..).zip(state.channels()) {
        if let Some(program) = ch.program {
            snapshot.insert((channel, Param::Program), program as u16);
        }
        for (number, value) in (0u8..).zip(ch.controllers.iter()) {
            if let Some(value) = *value {
                snapshot.insert((channel, Param::Controller(number)), value as u16);
            }
        }
        for (note, pressure) in (0u8..).zip(ch.poly_pressure.iter()) {
            if let Some(pressure) = *pressure {
                snapshot.insert((channel, Param::PolyPressure(note)), pressure as u16);
            }
        }
        snapshot.insert((channel, Param::PitchBend), ch.pitch_bend);
        snapshot.insert((channel, Param::ChannelPressure), ch.channel_pressure as u16);
    }
    snapshot
}

fn channel_event() -> impl Strategy<Value = Event> {
    let time = 0u64..1_000;
    let channel = 0u8..16;
    let data = 0u8..128;
    (time, channel, data.clone(), data, 0u16..=0x3FFF, 0u8..8).prop_map(
        |(time, channel, a, b, bend, kind)| match kind {
            0 => Event::note_on(time, channel, a, b),
            1 => Event::note_off(time, channel, a),
            2 => Event::control_change(time, channel, a, b),
            3 => Event::program_change(time, channel, a),
            4 => Event::pitch_bend(time, channel, bend),
            5 => Event::channel_pressure(time, channel, b),
            6 => Event::poly_pressure(time, channel, a, b),
            _ => Event::sysex(time, vec![0xF0, 0x7E, a, 0xF7]),
        },
    )
}

/// Messages a device receives from playing every event before `time`.
fn played_until(sequence: &Sequence, time: u64) -> Vec<EventKind> {
    let mut device = RecordingDevice::new();
    let log = device.log();
    device.open().unwrap();
    for (at, event) in sequence.iter_timed() {
        if at < time {
            device.send_event(&event.kind).unwrap();
        }
    }
    log.messages()
}

/// Messages the chase burst for `time` sends.
fn chased(sequence: &Sequence, time: u64) -> Vec<EventKind> {
    let mut device = RecordingDevice::new();
    let log = device.log();
    device.open().unwrap();
    ChaseState::scan(sequence, time).emit(&mut device).unwrap();
    log.messages()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_chase_matches_played_state(
        events in prop::collection::vec(channel_event(), 0..120),
        target in 0u64..1_200,
    ) {
        let sequence = Sequence::from_millis(events);

        let played = receiver_state(&played_until(&sequence, target));
        let burst = receiver_state(&chased(&sequence, target));
        prop_assert_eq!(&played, &burst);
        prop_assert_eq!(&burst, &snapshot_of(&ChaseState::scan(&sequence, target)));
    }

    #[test]
    fn prop_chase_burst_has_no_notes(
        events in prop::collection::vec(channel_event(), 0..60),
        target in 0u64..1_200,
    ) {
        let sequence = Sequence::from_millis(events);
        let burst = chased(&sequence, target);
        let no_notes = burst.iter().all(|m| !m.is_note_on() && !m.is_note_off());
        let no_sysex = burst.iter().all(|m| m.channel().is_some());
        prop_assert!(no_notes);
        prop_assert!(no_sysex);
        // Bend and pressure for every channel at least
        prop_assert!(burst.len() >= 32);
    }

    #[test]
    fn prop_set_position_sends_chase_burst(
        events in prop::collection::vec(channel_event(), 1..60),
        target in 0u64..1_200,
    ) {
        let sequence = ms_sequence(events);
        let clamped = target.min(sequence.duration_millis());

        let (mut sequencer, log, _clock) = test_sequencer();
        sequencer.open().unwrap();
        sequencer.assign(sequence.clone()).unwrap();
        sequencer.set_position(target).unwrap();

        prop_assert_eq!(sequencer.position(), clamped);
        prop_assert_eq!(log.messages(), chased(&sequence, clamped));
    }
}
