//! Time-ordered storage a collector can walk.

use std::sync::Arc;
use tempora_midi::{Event, Sequence};

/// An item that knows its own start time in milliseconds.
pub trait Timed {
    fn time(&self) -> u64;
}

/// A [`Timed`] item that also has an end.
pub trait Span: Timed {
    fn end(&self) -> u64;
}

/// Random-access items sorted by non-decreasing start time.
///
/// Implementors must keep `time(i) <= time(i + 1)`.
pub trait Timeline {
    type Item;

    fn len(&self) -> usize;

    fn item(&self, index: usize) -> &Self::Item;

    /// Start time of the item at `index`, in milliseconds.
    fn time(&self, index: usize) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the first item whose start time is `>= time`.
    fn position_of(&self, time: u64) -> usize {
        let (mut lo, mut hi) = (0, self.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.time(mid) < time {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    fn is_sorted_by_time(&self) -> bool {
        (1..self.len()).all(|i| self.time(i - 1) <= self.time(i))
    }
}

impl<T: Timed> Timeline for [T] {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[inline]
    fn item(&self, index: usize) -> &T {
        &self[index]
    }

    #[inline]
    fn time(&self, index: usize) -> u64 {
        self[index].time()
    }
}

impl<T: Timed> Timeline for Vec<T> {
    type Item = T;

    #[inline]
    fn len(&self) -> usize {
        Vec::len(self)
    }

    #[inline]
    fn item(&self, index: usize) -> &T {
        &self[index]
    }

    #[inline]
    fn time(&self, index: usize) -> u64 {
        self[index].time()
    }
}

impl<L: Timeline + ?Sized> Timeline for Arc<L> {
    type Item = L::Item;

    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn item(&self, index: usize) -> &L::Item {
        (**self).item(index)
    }

    #[inline]
    fn time(&self, index: usize) -> u64 {
        (**self).time(index)
    }

    fn position_of(&self, time: u64) -> usize {
        (**self).position_of(time)
    }
}

impl Timeline for Sequence {
    type Item = Event;

    #[inline]
    fn len(&self) -> usize {
        Sequence::len(self)
    }

    #[inline]
    fn item(&self, index: usize) -> &Event {
        &self.events()[index]
    }

    #[inline]
    fn time(&self, index: usize) -> u64 {
        self.time_of(index)
    }

    fn position_of(&self, time: u64) -> usize {
        self.count_before(time)
    }
}
