//! Forward cursor over a [`Timeline`].

use super::timeline::Timeline;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::Range;
use std::sync::Arc;

/// Custom reach condition: `(item, item_time, query_time) -> reached`.
pub type Trigger<T> = Arc<dyn Fn(&T, u64, u64) -> bool + Send + Sync>;

/// Called after every seek with the repositioned collector.
pub type SeekHook<L> = Arc<dyn Fn(&TemporalCollector<L>) + Send + Sync>;

/// Incremental cursor over time-ordered items.
///
/// Each [`advance`](Self::advance) returns exactly the items newly reached
/// since the previous call, so a monotonic sequence of queries yields every
/// item once and in order. [`seek`](Self::seek) repositions in O(log n).
///
/// By default an item is reached once `item_time <= query_time`. A custom
/// [`Trigger`] replaces that condition for `advance*`; `seek` always positions
/// by start time.
///
/// State derived from the stream (a held pitch bend, the current lyric) goes
/// stale after a seek. Register a [`SeekHook`] with [`on_seek`](Self::on_seek)
/// to rebuild it from [`prev`](Self::prev) or [`peek`](Self::peek).
pub struct TemporalCollector<L: Timeline> {
    timeline: L,
    cursor: usize,
    trigger: Option<Trigger<L::Item>>,
    on_seek: Option<SeekHook<L>>,
}

impl<L: Timeline> TemporalCollector<L> {
    pub fn new(timeline: L) -> Self {
        debug_assert!(
            timeline.is_sorted_by_time(),
            "collector timeline must be sorted by start time"
        );
        Self {
            timeline,
            cursor: 0,
            trigger: None,
            on_seek: None,
        }
    }

    pub fn with_trigger(
        mut self,
        trigger: impl Fn(&L::Item, u64, u64) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.trigger = Some(Arc::new(trigger));
        self
    }

    pub fn on_seek(
        mut self,
        hook: impl Fn(&TemporalCollector<L>) + Send + Sync + 'static,
    ) -> Self {
        self.on_seek = Some(Arc::new(hook));
        self
    }

    #[inline]
    fn is_reached(&self, index: usize, time: u64) -> bool {
        let at = self.timeline.time(index);
        match &self.trigger {
            Some(trigger) => trigger(self.timeline.item(index), at, time),
            None => at <= time,
        }
    }

    /// Advance over every item reached at `time` and return them in order.
    pub fn advance(&mut self, time: u64) -> Reached<'_, L> {
        let start = self.cursor;
        let len = self.timeline.len();
        while self.cursor < len && self.is_reached(self.cursor, time) {
            self.cursor += 1;
        }
        Reached::new(&self.timeline, start..self.cursor)
    }

    /// Advance by at most one item.
    pub fn advance_one(&mut self, time: u64) -> Option<&L::Item> {
        if self.cursor < self.timeline.len() && self.is_reached(self.cursor, time) {
            self.cursor += 1;
            Some(self.timeline.item(self.cursor - 1))
        } else {
            None
        }
    }

    /// Advance over every reached item but return only the last one.
    pub fn advance_latest(&mut self, time: u64) -> Option<&L::Item> {
        self.advance(time).last()
    }

    /// Next unreached item.
    pub fn peek(&self) -> Option<&L::Item> {
        (self.cursor < self.timeline.len()).then(|| self.timeline.item(self.cursor))
    }

    pub fn peek_time(&self) -> Option<u64> {
        (self.cursor < self.timeline.len()).then(|| self.timeline.time(self.cursor))
    }

    /// Most recently reached item.
    pub fn prev(&self) -> Option<&L::Item> {
        self.cursor
            .checked_sub(1)
            .map(|index| self.timeline.item(index))
    }

    pub fn prev_time(&self) -> Option<u64> {
        self.cursor
            .checked_sub(1)
            .map(|index| self.timeline.time(index))
    }

    /// Place the cursor on the first item starting at or after `time`.
    pub fn seek(&mut self, time: u64) {
        self.cursor = self.timeline.position_of(time);
        self.notify_seek();
    }

    /// Place the cursor past every item starting at or before `time`, where
    /// a plain `advance(time)` from the start would leave it.
    pub fn seek_past(&mut self, time: u64) {
        self.cursor = match time.checked_add(1) {
            Some(next) => self.timeline.position_of(next),
            None => self.timeline.len(),
        };
        self.notify_seek();
    }

    fn notify_seek(&self) {
        if let Some(hook) = &self.on_seek {
            hook(self);
        }
    }

    /// Move the cursor back so items from `cursor` on are delivered again.
    pub(crate) fn rewind_to(&mut self, cursor: usize) {
        debug_assert!(cursor <= self.cursor);
        self.cursor = cursor.min(self.cursor);
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Number of items already reached.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.timeline.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.timeline.is_empty()
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.timeline.len()
    }

    #[inline]
    pub fn timeline(&self) -> &L {
        &self.timeline
    }

    pub fn into_timeline(self) -> L {
        self.timeline
    }
}

impl<L: Timeline + Clone> Clone for TemporalCollector<L> {
    fn clone(&self) -> Self {
        Self {
            timeline: self.timeline.clone(),
            cursor: self.cursor,
            trigger: self.trigger.clone(),
            on_seek: self.on_seek.clone(),
        }
    }
}

impl<L: Timeline> fmt::Debug for TemporalCollector<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporalCollector")
            .field("len", &self.timeline.len())
            .field("cursor", &self.cursor)
            .field("custom_trigger", &self.trigger.is_some())
            .field("seek_hook", &self.on_seek.is_some())
            .finish()
    }
}

/// Items reached by one [`TemporalCollector::advance`] call.
///
/// Borrows the collector's storage; nothing is copied.
pub struct Reached<'a, L: Timeline + ?Sized> {
    timeline: &'a L,
    range: Range<usize>,
}

impl<'a, L: Timeline + ?Sized> Reached<'a, L> {
    pub(crate) fn new(timeline: &'a L, range: Range<usize>) -> Self {
        Self { timeline, range }
    }

    /// Indices of the reached items in the underlying timeline.
    pub fn indices(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// Pair each reached item with its start time.
    pub fn timed(self) -> impl Iterator<Item = (u64, &'a L::Item)> + 'a
    where
        L: 'a,
    {
        let timeline = self.timeline;
        self.range.map(move |i| (timeline.time(i), timeline.item(i)))
    }
}

impl<'a, L: Timeline + ?Sized + 'a> Iterator for Reached<'a, L> {
    type Item = &'a L::Item;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.range.next().map(|i| self.timeline.item(i))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl<'a, L: Timeline + ?Sized + 'a> DoubleEndedIterator for Reached<'a, L> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.range.next_back().map(|i| self.timeline.item(i))
    }
}

impl<'a, L: Timeline + ?Sized + 'a> ExactSizeIterator for Reached<'a, L> {}

impl<'a, L: Timeline + ?Sized + 'a> FusedIterator for Reached<'a, L> {}
