//! Seeking many collectors as one.

use super::active::IntervalCollector;
use super::cursor::TemporalCollector;
use super::timeline::{Span, Timeline};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::trace;

/// A collector that can be repositioned without knowing its item type.
pub trait Seekable: Send {
    fn seek(&mut self, time: u64);
}

impl<L: Timeline + Send> Seekable for TemporalCollector<L> {
    fn seek(&mut self, time: u64) {
        TemporalCollector::seek(self, time);
    }
}

impl<L: Timeline + Send> Seekable for IntervalCollector<L>
where
    L::Item: Span,
{
    fn seek(&mut self, time: u64) {
        IntervalCollector::seek(self, time);
    }
}

/// Collectors that jump together when playback is repositioned.
///
/// Each consumer keeps the handle returned by [`register`](Self::register)
/// and advances its collector as usual. The group only holds weak references,
/// so dropping a consumer's handle removes it on the next seek.
#[derive(Default)]
pub struct CollectorGroup {
    members: Vec<Weak<Mutex<dyn Seekable>>>,
}

impl CollectorGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: Seekable + 'static>(&mut self, collector: S) -> Arc<Mutex<S>> {
        let handle = Arc::new(Mutex::new(collector));
        self.attach(handle.clone());
        handle
    }

    /// Add a collector that is already shared.
    pub fn attach(&mut self, handle: Arc<Mutex<dyn Seekable>>) {
        self.members.push(Arc::downgrade(&handle));
    }

    /// Seek every live member to `time` and return how many were sought.
    pub fn seek(&mut self, time: u64) -> usize {
        self.members.retain(|member| match member.upgrade() {
            Some(collector) => {
                collector.lock().seek(time);
                true
            }
            None => false,
        });
        trace!("Sought {} collectors to {} ms", self.members.len(), time);
        self.members.len()
    }

    /// Number of registered members still alive.
    pub fn len(&self) -> usize {
        self.members.iter().filter(|m| m.strong_count() > 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for CollectorGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorGroup")
            .field("members", &self.members.len())
            .finish()
    }
}
