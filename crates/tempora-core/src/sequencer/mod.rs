//! Real-time MIDI dispatch.
//!
//! A [`Sequencer`] owns an [`OutputDevice`] and plays an `Arc<Sequence>`
//! through it from a dedicated thread. The thread maps wall time to logical
//! time from a checkpoint taken at `start`, sends every event whose time has
//! been reached, then sleeps for one resolution quantum.
//!
//! ```text
//! Closed --open--> Open --start--> Running
//!   ^               |  ^             |
//!   +----close------+  +----stop-----+  (or end of sequence)
//! ```
//!
//! Repositioning with [`set_position`](Sequencer::set_position) first chases
//! controller state (see [`ChaseState`]) so the device sounds as if playback
//! had run from the start.

mod chase;
mod pump;
mod worker;

pub use chase::{ChannelState, ChaseState};

use crate::clock::{SystemClock, WallClock};
use crate::config::SequencerConfig;
use crate::error::{Error, Result, StateError};
use parking_lot::Mutex;
use pump::DataPump;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempora_midi::{OutputDevice, Sequence};
use tracing::{debug, info, warn};
use worker::{PumpExit, Worker};

/// Plays a sequence through an output device in real time.
pub struct Sequencer<D: OutputDevice + 'static> {
    config: SequencerConfig,
    clock: Arc<dyn WallClock>,
    device: Arc<Mutex<D>>,
    is_open: bool,
    sequence: Option<Arc<Sequence>>,
    /// Present whenever a sequence is assigned and the thread is not holding it.
    pump: Option<DataPump>,
    worker: Option<Worker>,
    position: Arc<AtomicU64>,
}

impl<D: OutputDevice + 'static> Sequencer<D> {
    /// Create a closed sequencer driven by the system clock.
    pub fn new(device: D, config: SequencerConfig) -> Result<Self> {
        Self::with_clock(device, config, Arc::new(SystemClock::new()))
    }

    /// Create a closed sequencer driven by `clock`.
    pub fn with_clock(
        device: D,
        config: SequencerConfig,
        clock: Arc<dyn WallClock>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            clock,
            device: Arc::new(Mutex::new(device)),
            is_open: false,
            sequence: None,
            pump: None,
            worker: None,
            position: Arc::new(AtomicU64::new(0)),
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open {
            Ok(())
        } else {
            Err(StateError::NotOpen.into())
        }
    }

    /// Open the device.
    pub fn open(&mut self) -> Result<()> {
        if self.is_open {
            return Err(StateError::AlreadyOpen.into());
        }
        self.device.lock().open()?;
        self.is_open = true;
        info!("Sequencer opened");
        Ok(())
    }

    /// Stop playback if running and close the device.
    ///
    /// The assigned sequence and position survive a close/open cycle.
    ///
    /// The device is closed even when stopping reports a dispatch failure;
    /// that failure is returned afterwards.
    pub fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        let stopped = self.stop();
        if let Err(e) = &stopped {
            warn!("Closing after dispatch failure: {}", e);
        }
        let closed = self.device.lock().close();
        self.is_open = false;
        info!("Sequencer closed");
        stopped?;
        closed?;
        Ok(())
    }

    /// Assign the sequence to play, stopping playback first. Position resets to 0.
    pub fn assign(&mut self, sequence: Arc<Sequence>) -> Result<()> {
        self.ensure_open()?;
        self.stop()?;
        debug!(
            "Assigned sequence: {} events, {} ms",
            sequence.len(),
            sequence.duration_millis()
        );
        self.pump = Some(DataPump::new(Arc::clone(&sequence)));
        self.sequence = Some(sequence);
        self.position.store(0, Ordering::Release);
        Ok(())
    }

    /// Start or resume playback from the current position. No-op if running.
    pub fn start(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.poll()?;
        if self.worker.is_some() {
            return Ok(());
        }

        let mut pump = self.pump.take().ok_or(StateError::NoSequence)?;
        pump.checkpoint(self.clock.now_millis());
        let start_position = pump.position();
        let backup = pump.clone();

        match Worker::spawn(
            &self.config,
            pump,
            Arc::clone(&self.device),
            Arc::clone(&self.clock),
            Arc::clone(&self.position),
        ) {
            Ok(worker) => {
                self.worker = Some(worker);
                info!("Playback started at {} ms", start_position);
                Ok(())
            }
            Err(e) => {
                self.pump = Some(backup);
                Err(Error::ThreadSpawn(e))
            }
        }
    }

    /// Stop playback and send note-off for every note on every channel.
    ///
    /// No-op if not running. If the dispatch thread had failed, its error is
    /// returned here.
    pub fn stop(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        let Some((pump, exit)) = worker.join() else {
            // The pump went down with the thread; restart from the last published position.
            if let Some(sequence) = &self.sequence {
                let mut pump = DataPump::new(Arc::clone(sequence));
                pump.seek(self.position.load(Ordering::Acquire));
                self.pump = Some(pump);
            }
            if let Err(e) = self.flush() {
                warn!("All-notes-off after dispatch panic also failed: {}", e);
            }
            return Err(Error::DispatchPanicked);
        };

        self.position.store(pump.position(), Ordering::Release);
        self.pump = Some(pump);

        match exit {
            PumpExit::Finished => {
                debug!("Reaped finished dispatch thread");
                Ok(())
            }
            PumpExit::Stopped => {
                self.flush()?;
                info!("Playback stopped at {} ms", self.position());
                Ok(())
            }
            PumpExit::Failed(e) => {
                if let Err(flush_err) = self.flush() {
                    warn!("All-notes-off after dispatch failure also failed: {}", flush_err);
                }
                Err(e)
            }
        }
    }

    fn flush(&self) -> Result<()> {
        self.device.lock().all_notes_off()?;
        Ok(())
    }

    /// Reap a dispatch thread that ended on its own and return its error, if any.
    pub fn poll(&mut self) -> Result<()> {
        match &self.worker {
            Some(worker) if !worker.is_running() => self.stop(),
            _ => Ok(()),
        }
    }

    /// Reposition playback to `position` ms, clamped to the sequence duration.
    ///
    /// Controller state before the target is re-sent to the device. Playback
    /// resumes if it was running.
    pub fn set_position(&mut self, position: u64) -> Result<()> {
        self.ensure_open()?;
        let sequence = self.sequence.clone().ok_or(StateError::NoSequence)?;

        let was_running = self.is_running();
        self.stop()?;

        let target = position.min(sequence.duration_millis());
        let chase = ChaseState::scan(&sequence, target);
        let sent = chase.emit(&mut *self.device.lock())?;

        if let Some(pump) = self.pump.as_mut() {
            pump.seek(target);
        }
        self.position.store(target, Ordering::Release);
        debug!("Position set to {} ms, chased {} messages", target, sent);

        if was_running {
            self.start()?;
        }
        Ok(())
    }

    /// Send raw bytes (typically SysEx) straight to the device.
    pub fn send_data(&self, data: &[u8]) -> Result<()> {
        self.ensure_open()?;
        self.device.lock().send_sysex(data)?;
        Ok(())
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// True while the dispatch thread is playing.
    pub fn is_running(&self) -> bool {
        self.worker.as_ref().is_some_and(Worker::is_running)
    }

    /// Current logical position in ms.
    #[inline]
    pub fn position(&self) -> u64 {
        self.position.load(Ordering::Acquire)
    }

    pub fn sequence(&self) -> Option<&Arc<Sequence>> {
        self.sequence.as_ref()
    }

    /// Duration of the assigned sequence, 0 if none.
    pub fn duration(&self) -> u64 {
        self.sequence
            .as_ref()
            .map_or(0, |sequence| sequence.duration_millis())
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Run `f` with exclusive access to the device.
    pub fn with_device<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        f(&mut self.device.lock())
    }
}

impl<D: OutputDevice + 'static> Drop for Sequencer<D> {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Error stopping sequencer on drop: {}", e);
        }
        if self.is_open {
            if let Err(e) = self.device.lock().close() {
                warn!("Error closing device on drop: {}", e);
            }
        }
    }
}
