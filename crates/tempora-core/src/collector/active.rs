//! Interval cursor with an active set.

use super::cursor::{Reached, TemporalCollector};
use super::timeline::{Span, Timeline};
use std::fmt;
use std::ops::Range;

/// [`TemporalCollector`] over intervals that also tracks which intervals
/// straddle the last query time.
///
/// An interval is active at `t` when `start <= t < end`. The active set is
/// rechecked on every call, so an interval that ends between two queries
/// drops out even if nothing new was reached.
///
/// [`seek`](Self::seek) rebuilds the active set by scanning backwards from the
/// cursor while an interval could still reach `t`, bounded by the longest
/// interval in the timeline. Timelines with one very long interval make seeks
/// correspondingly slower.
pub struct IntervalCollector<L: Timeline>
where
    L::Item: Span,
{
    inner: TemporalCollector<L>,
    /// Indices of active intervals, ascending.
    active: Vec<usize>,
    max_span: u64,
}

impl<L: Timeline> IntervalCollector<L>
where
    L::Item: Span,
{
    pub fn new(timeline: L) -> Self {
        Self::from_collector(TemporalCollector::new(timeline))
    }

    /// Wrap an existing collector. Its cursor is kept; the active set starts empty.
    pub fn from_collector(inner: TemporalCollector<L>) -> Self {
        let timeline = inner.timeline();
        let max_span = (0..timeline.len())
            .map(|i| timeline.item(i).end().saturating_sub(timeline.time(i)))
            .max()
            .unwrap_or(0);
        Self {
            inner,
            active: Vec::new(),
            max_span,
        }
    }

    fn refresh_active(&mut self, time: u64, reached: Range<usize>) {
        let timeline = self.inner.timeline();
        self.active.retain(|&i| timeline.item(i).end() > time);
        self.active
            .extend(reached.filter(|&i| timeline.item(i).end() > time));
    }

    /// Advance to `time`, returning the newly reached intervals.
    ///
    /// Reached intervals that already ended are returned but never become active.
    pub fn advance(&mut self, time: u64) -> Reached<'_, L> {
        let reached = self.inner.advance(time).indices();
        self.refresh_active(time, reached.clone());
        Reached::new(self.inner.timeline(), reached)
    }

    pub fn advance_one(&mut self, time: u64) -> Option<&L::Item> {
        let before = self.inner.cursor();
        let moved = self.inner.advance_one(time).is_some();
        let reached = if moved { before..before + 1 } else { before..before };
        self.refresh_active(time, reached);
        if moved {
            self.inner.prev()
        } else {
            None
        }
    }

    pub fn advance_latest(&mut self, time: u64) -> Option<&L::Item> {
        self.advance(time).last()
    }

    /// Reposition to `time` and rebuild the active set for it.
    ///
    /// Leaves the collector exactly where `advance(time)` from the start
    /// would: intervals starting at `time` are reached, and active unless
    /// they are empty.
    pub fn seek(&mut self, time: u64) {
        self.inner.seek_past(time);
        self.active.clear();

        let timeline = self.inner.timeline();
        let mut index = self.inner.cursor();
        while index > 0 {
            index -= 1;
            if timeline.time(index).saturating_add(self.max_span) <= time {
                break;
            }
            if timeline.item(index).end() > time {
                self.active.push(index);
            }
        }
        self.active.reverse();
    }

    /// Active intervals in start order.
    pub fn current(&self) -> impl Iterator<Item = &L::Item> + '_ {
        let timeline = self.inner.timeline();
        self.active.iter().map(move |&i| timeline.item(i))
    }

    pub fn active_indices(&self) -> &[usize] {
        &self.active
    }

    pub fn has_active(&self) -> bool {
        !self.active.is_empty()
    }

    /// Largest `end - start` in the timeline.
    pub fn max_span(&self) -> u64 {
        self.max_span
    }

    pub fn peek(&self) -> Option<&L::Item> {
        self.inner.peek()
    }

    pub fn prev(&self) -> Option<&L::Item> {
        self.inner.prev()
    }

    pub fn collector(&self) -> &TemporalCollector<L> {
        &self.inner
    }

    pub fn timeline(&self) -> &L {
        self.inner.timeline()
    }
}

impl<L: Timeline + Clone> Clone for IntervalCollector<L>
where
    L::Item: Span,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            active: self.active.clone(),
            max_span: self.max_span,
        }
    }
}

impl<L: Timeline> fmt::Debug for IntervalCollector<L>
where
    L::Item: Span,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalCollector")
            .field("inner", &self.inner)
            .field("active", &self.active)
            .field("max_span", &self.max_span)
            .finish()
    }
}
