//! Cursor plus clock checkpoint: the state the dispatch thread owns.

use crate::collector::SequenceCollector;
use parking_lot::Mutex;
use std::sync::Arc;
use tempora_midi::{OutputDevice, Result, Sequence};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PumpStatus {
    Continue,
    /// Logical time has passed the last event.
    Finished,
}

/// Maps wall time to logical time from the last checkpoint and dispatches
/// every event the cursor reaches.
///
/// `logical = logical_checkpoint + (wall_now - wall_checkpoint)`
#[derive(Debug, Clone)]
pub(crate) struct DataPump {
    cursor: SequenceCollector,
    wall_checkpoint: u64,
    logical_checkpoint: u64,
    current: u64,
}

impl DataPump {
    pub(crate) fn new(sequence: Arc<Sequence>) -> Self {
        Self {
            cursor: SequenceCollector::new(sequence),
            wall_checkpoint: 0,
            logical_checkpoint: 0,
            current: 0,
        }
    }

    /// Re-anchor logical time at the current position.
    pub(crate) fn checkpoint(&mut self, wall_now: u64) {
        self.wall_checkpoint = wall_now;
        self.logical_checkpoint = self.current;
    }

    /// Jump to `position`; the next dispatch starts at the first event at or
    /// after it.
    pub(crate) fn seek(&mut self, position: u64) {
        self.cursor.seek(position);
        self.current = position;
        self.logical_checkpoint = position;
    }

    #[inline]
    pub(crate) fn logical_time(&self, wall_now: u64) -> u64 {
        self.logical_checkpoint + wall_now.saturating_sub(self.wall_checkpoint)
    }

    /// Logical time of the last pass.
    #[inline]
    pub(crate) fn position(&self) -> u64 {
        self.current
    }

    pub(crate) fn duration(&self) -> u64 {
        self.cursor.timeline().duration_millis()
    }

    /// One dispatch pass.
    ///
    /// Stops at the first device failure. The cursor is left just past the
    /// failed event, so the rest of the batch is sent on the next pass.
    /// Once past the end, position settles on the duration.
    pub(crate) fn pump<D: OutputDevice + ?Sized>(
        &mut self,
        wall_now: u64,
        device: &Mutex<D>,
    ) -> Result<PumpStatus> {
        self.current = self.logical_time(wall_now);

        let reached = self.cursor.advance(self.current).indices();
        if !reached.is_empty() {
            let sequence = Arc::clone(self.cursor.timeline());
            let mut device = device.lock();
            for index in reached.clone() {
                if let Err(e) = device.send_event(&sequence.events()[index].kind) {
                    let pending = reached.end - index - 1;
                    self.cursor.rewind_to(index + 1);
                    warn!(
                        "Device failed on event {} at {} ms, {} events left undelivered",
                        index,
                        sequence.time_of(index),
                        pending
                    );
                    return Err(e);
                }
            }
        }

        let duration = self.duration();
        if self.current > duration {
            self.current = duration;
            Ok(PumpStatus::Finished)
        } else {
            Ok(PumpStatus::Continue)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempora_midi::{Event, EventKind, RecordingDevice};

    fn open_device() -> (Mutex<RecordingDevice>, tempora_midi::DeviceLog) {
        let mut device = RecordingDevice::new();
        let log = device.log();
        device.open().unwrap();
        (Mutex::new(device), log)
    }

    fn sequence() -> Arc<Sequence> {
        Arc::new(Sequence::from_millis(vec![
            Event::note_on(0, 0, 60, 100),
            Event::note_on(10, 0, 62, 100),
            Event::note_off(20, 0, 60),
        ]))
    }

    #[test]
    fn test_dispatches_due_events_inclusive() {
        let (device, log) = open_device();
        let mut pump = DataPump::new(sequence());
        pump.checkpoint(1000);

        assert_eq!(pump.pump(1000, &device).unwrap(), PumpStatus::Continue);
        assert_eq!(log.len(), 1);
        assert_eq!(pump.pump(1009, &device).unwrap(), PumpStatus::Continue);
        assert_eq!(log.len(), 1);
        assert_eq!(pump.pump(1010, &device).unwrap(), PumpStatus::Continue);
        assert_eq!(log.len(), 2);
        assert_eq!(pump.pump(1020, &device).unwrap(), PumpStatus::Continue);
        assert_eq!(log.len(), 3);
        assert_eq!(pump.pump(1021, &device).unwrap(), PumpStatus::Finished);
    }

    #[test]
    fn test_finished_position_settles_on_duration() {
        let (device, _log) = open_device();
        let mut pump = DataPump::new(sequence());
        pump.checkpoint(0);
        assert_eq!(pump.pump(5_000, &device).unwrap(), PumpStatus::Finished);
        assert_eq!(pump.position(), pump.duration());
        assert_eq!(pump.position(), 20);
    }

    #[test]
    fn test_checkpoint_resumes_where_stopped() {
        let (device, log) = open_device();
        let mut pump = DataPump::new(sequence());
        pump.checkpoint(0);
        pump.pump(5, &device).unwrap();
        assert_eq!(pump.position(), 5);

        // Paused for a long while, then resumed
        pump.checkpoint(10_000);
        assert_eq!(pump.logical_time(10_000), 5);
        pump.pump(10_005, &device).unwrap();
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_seek_skips_earlier_events() {
        let (device, log) = open_device();
        let mut pump = DataPump::new(sequence());
        pump.seek(15);
        pump.checkpoint(0);
        pump.pump(0, &device).unwrap();
        assert!(log.is_empty());
        pump.pump(5, &device).unwrap();
        assert_eq!(
            log.messages(),
            vec![EventKind::NoteOff {
                channel: 0,
                note: 60
            }]
        );
    }

    #[test]
    fn test_device_failure_keeps_rest_of_batch() {
        let mut device = RecordingDevice::new().fail_after(1);
        let log = device.log();
        device.open().unwrap();
        let device = Mutex::new(device);
        let mut pump = DataPump::new(sequence());
        pump.checkpoint(0);
        assert!(pump.pump(100, &device).is_err());
        assert_eq!(log.len(), 1);

        // A fresh device picks up after the failed event
        let (healthy, healthy_log) = open_device();
        pump.checkpoint(0);
        pump.pump(0, &healthy).unwrap();
        assert_eq!(
            healthy_log.messages(),
            vec![EventKind::NoteOff {
                channel: 0,
                note: 60
            }]
        );
    }

    #[test]
    fn test_empty_sequence_finishes() {
        let (device, _log) = open_device();
        let mut pump = DataPump::new(Arc::new(Sequence::empty()));
        pump.checkpoint(0);
        assert_eq!(pump.pump(0, &device).unwrap(), PumpStatus::Continue);
        assert_eq!(pump.pump(1, &device).unwrap(), PumpStatus::Finished);
    }
}
