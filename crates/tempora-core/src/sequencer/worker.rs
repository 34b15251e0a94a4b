//! Dispatch thread.

use super::pump::{DataPump, PumpStatus};
use crate::clock::WallClock;
use crate::config::SequencerConfig;
use crate::error::Error;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tempora_midi::OutputDevice;
use thread_priority::ThreadPriority;
use tracing::{debug, error, trace};

/// How the dispatch loop ended.
#[derive(Debug)]
pub(crate) enum PumpExit {
    /// Asked to stop. Notes may still be sounding.
    Stopped,
    /// Ran past the end of the sequence and already sent all-notes-off.
    Finished,
    Failed(Error),
}

/// Handle to a running dispatch thread.
pub(crate) struct Worker {
    handle: JoinHandle<(DataPump, PumpExit)>,
    stop_tx: Sender<()>,
    running: Arc<AtomicBool>,
}

impl Worker {
    pub(crate) fn spawn<D: OutputDevice + 'static>(
        config: &SequencerConfig,
        pump: DataPump,
        device: Arc<Mutex<D>>,
        clock: Arc<dyn WallClock>,
        position: Arc<AtomicU64>,
    ) -> std::io::Result<Self> {
        let (stop_tx, stop_rx) = bounded(1);
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = Arc::clone(&running);
        let resolution = config.resolution;
        let elevate = config.elevate_priority;

        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                if elevate {
                    if let Err(e) =
                        thread_priority::set_current_thread_priority(ThreadPriority::Max)
                    {
                        debug!("Could not elevate dispatch thread priority: {:?}", e);
                    }
                }

                dispatch_loop(
                    pump,
                    device,
                    clock,
                    position,
                    running_clone,
                    stop_rx,
                    resolution,
                )
            })?;

        Ok(Self {
            handle,
            stop_tx,
            running,
        })
    }

    /// False once the loop has exited or been told to stop.
    #[inline]
    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the loop and hand back its pump. `None` if the thread panicked.
    pub(crate) fn join(self) -> Option<(DataPump, PumpExit)> {
        self.running.store(false, Ordering::Release);
        let _ = self.stop_tx.try_send(());
        self.handle.join().ok()
    }
}

/// Clears the running flag when the loop exits, unwinding included.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn dispatch_loop<D: OutputDevice>(
    mut pump: DataPump,
    device: Arc<Mutex<D>>,
    clock: Arc<dyn WallClock>,
    position: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    stop_rx: Receiver<()>,
    resolution: Duration,
) -> (DataPump, PumpExit) {
    debug!("Dispatch loop started at {} ms", pump.position());
    let _guard = RunningGuard(Arc::clone(&running));

    let exit = loop {
        if !running.load(Ordering::Acquire) {
            break PumpExit::Stopped;
        }

        match pump.pump(clock.now_millis(), &*device) {
            Ok(PumpStatus::Continue) => {}
            Ok(PumpStatus::Finished) => {
                trace!("Dispatch reached end of sequence");
                break match device.lock().all_notes_off() {
                    Ok(()) => PumpExit::Finished,
                    Err(e) => PumpExit::Failed(e.into()),
                };
            }
            Err(e) => {
                error!("Dispatch failed at {} ms: {}", pump.position(), e);
                break PumpExit::Failed(e.into());
            }
        }
        position.store(pump.position(), Ordering::Release);

        match stop_rx.recv_timeout(resolution) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break PumpExit::Stopped,
            Err(RecvTimeoutError::Timeout) => {}
        }
    };

    position.store(pump.position(), Ordering::Release);
    debug!("Dispatch loop exited at {} ms: {:?}", pump.position(), exit);
    (pump, exit)
}
