//! Filtered views over a shared sequence.

use super::timeline::Timeline;
use std::sync::Arc;
use tempora_midi::{Event, Sequence};

/// The events of a sequence that matched a predicate at construction time.
///
/// Stores indices only; events stay in the shared [`Sequence`].
#[derive(Debug, Clone)]
pub struct EventView {
    sequence: Arc<Sequence>,
    indices: Arc<[usize]>,
}

impl EventView {
    pub fn filter(sequence: Arc<Sequence>, predicate: impl Fn(&Event) -> bool) -> Self {
        let indices = sequence
            .events()
            .iter()
            .enumerate()
            .filter(|(_, e)| predicate(e))
            .map(|(i, _)| i)
            .collect();
        Self { sequence, indices }
    }

    /// Events addressed to `channel`.
    pub fn channel(sequence: Arc<Sequence>, channel: u8) -> Self {
        Self::filter(sequence, |e| e.channel() == Some(channel))
    }

    pub fn sequence(&self) -> &Arc<Sequence> {
        &self.sequence
    }

    /// Index in the full sequence of the `index`-th event of this view.
    pub fn source_index(&self, index: usize) -> usize {
        self.indices[index]
    }
}

impl Timeline for EventView {
    type Item = Event;

    #[inline]
    fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    fn item(&self, index: usize) -> &Event {
        &self.sequence.events()[self.indices[index]]
    }

    #[inline]
    fn time(&self, index: usize) -> u64 {
        self.sequence.time_of(self.indices[index])
    }
}
