//! Test helpers and fixtures for tempora integration tests.
//!
//! Sequencers here run on a [`ManualClock`] with a [`RecordingDevice`], so
//! dispatch timing is driven entirely by the test.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempora::prelude::*;
use tempora::{DeviceLog, ManualClock};

/// How long to wait for the dispatch thread before failing a test.
pub const DISPATCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a fmt subscriber once per test binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A closed sequencer on a manual clock starting at 0.
pub fn test_sequencer() -> (Sequencer<RecordingDevice>, DeviceLog, Arc<ManualClock>) {
    init_tracing();
    let device = RecordingDevice::new();
    let log = device.log();
    let clock = Arc::new(ManualClock::new(0));
    let config = SequencerConfig::default().with_elevate_priority(false);
    let sequencer = Sequencer::with_clock(device, config, clock.clone())
        .expect("Failed to create test sequencer");
    (sequencer, log, clock)
}

/// Poll `condition` until it holds or [`DISPATCH_TIMEOUT`] passes.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + DISPATCH_TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}

/// Sequence whose ticks are milliseconds.
pub fn ms_sequence(events: Vec<Event>) -> Arc<Sequence> {
    Arc::new(Sequence::from_millis(events))
}

/// One piece of per-channel controller state a synth holds on to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Param {
    Program,
    Controller(u8),
    PolyPressure(u8),
    PitchBend,
    ChannelPressure,
}

/// Last value a receiver saw for each `(channel, param)`.
pub type ControllerSnapshot = BTreeMap<(u8, Param), u16>;

/// What a receiver holds after `messages`, starting from power-on defaults
/// (bend centred, no pressure). Notes and SysEx leave no state behind.
pub fn receiver_state<'a>(
    messages: impl IntoIterator<Item = &'a EventKind>,
) -> ControllerSnapshot {
    let mut state = ControllerSnapshot::new();
    for channel in 0..16u8 {
        state.insert((channel, Param::PitchBend), 0x2000);
        state.insert((channel, Param::ChannelPressure), 0);
    }
    for message in messages {
        let (key, value) = match *message {
            EventKind::ProgramChange { channel, program } => {
                ((channel, Param::Program), program as u16)
            }
            EventKind::ControlChange {
                channel,
                controller,
                value,
            } => ((channel, Param::Controller(controller)), value as u16),
            EventKind::PolyPressure {
                channel,
                note,
                pressure,
            } => ((channel, Param::PolyPressure(note)), pressure as u16),
            EventKind::PitchBend { channel, value } => ((channel, Param::PitchBend), value),
            EventKind::ChannelPressure { channel, pressure } => {
                ((channel, Param::ChannelPressure), pressure as u16)
            }
            EventKind::NoteOn { .. } | EventKind::NoteOff { .. } | EventKind::SysEx { .. } => {
                continue
            }
        };
        state.insert(key, value);
    }
    state
}
