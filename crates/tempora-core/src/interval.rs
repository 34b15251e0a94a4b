//! Intervals derived from paired sequence events.

use crate::collector::{Span, Timed};
use std::ops::Range;
use tempora_midi::{Event, EventKind, Sequence, CHANNEL_COUNT, NOTE_COUNT};

/// A `[start, end)` span in milliseconds with a payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval<P> {
    pub start: u64,
    pub end: u64,
    pub payload: P,
}

impl<P> Interval<P> {
    /// `None` if `end < start`.
    pub fn new(start: u64, end: u64, payload: P) -> Option<Self> {
        (start <= end).then_some(Self {
            start,
            end,
            payload,
        })
    }

    #[inline]
    pub fn duration(&self) -> u64 {
        self.end - self.start
    }

    /// `start <= time < end`
    #[inline]
    pub fn contains(&self, time: u64) -> bool {
        self.start <= time && time < self.end
    }
}

impl<P> Timed for Interval<P> {
    #[inline]
    fn time(&self) -> u64 {
        self.start
    }
}

impl<P> Span for Interval<P> {
    #[inline]
    fn end(&self) -> u64 {
        self.end
    }
}

/// A sounding note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoteSpan {
    pub channel: u8,
    pub note: u8,
    pub velocity: u8,
    /// Index of the NoteOn in the source sequence
    pub on_index: usize,
    /// Index of the NoteOff in the source sequence
    pub off_index: usize,
}

#[derive(Clone, Copy)]
struct PendingNote {
    index: usize,
    time: u64,
    velocity: u8,
}

/// Pair NoteOn/NoteOff events accepted by `filter` into note intervals.
///
/// A NoteOn for a key that is already sounding replaces the pending one.
/// NoteOns never released are dropped. The result is sorted by start time,
/// ties in NoteOn order.
pub fn note_intervals(
    sequence: &Sequence,
    filter: impl Fn(&Event) -> bool,
) -> Vec<Interval<NoteSpan>> {
    let mut pending = vec![None::<PendingNote>; CHANNEL_COUNT as usize * NOTE_COUNT];
    let mut intervals = Vec::new();

    for (index, (time, event)) in sequence.iter_timed().enumerate() {
        if !filter(event) {
            continue;
        }
        match event.kind {
            EventKind::NoteOn {
                channel,
                note,
                velocity,
            } => {
                if let Some(slot) = pending.get_mut(key_slot(channel, note)) {
                    *slot = Some(PendingNote {
                        index,
                        time,
                        velocity,
                    });
                }
            }
            EventKind::NoteOff { channel, note } => {
                let Some(on) = pending
                    .get_mut(key_slot(channel, note))
                    .and_then(Option::take)
                else {
                    continue;
                };
                intervals.extend(Interval::new(
                    on.time,
                    time,
                    NoteSpan {
                        channel,
                        note,
                        velocity: on.velocity,
                        on_index: on.index,
                        off_index: index,
                    },
                ));
            }
            _ => {}
        }
    }

    intervals.sort_by_key(|i| (i.start, i.payload.on_index));
    intervals
}

#[inline]
fn key_slot(channel: u8, note: u8) -> usize {
    channel as usize * NOTE_COUNT + note as usize
}

/// A maximal run of overlapping intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalGroup {
    /// Indices into the interval slice
    pub range: Range<usize>,
    pub start: u64,
    /// Furthest end within the group
    pub end: u64,
}

/// Split start-sorted intervals into runs where each interval starts before
/// the furthest end seen so far in its run.
pub fn contiguous_groups<P>(intervals: &[Interval<P>]) -> Vec<IntervalGroup> {
    let mut groups = Vec::new();
    let Some(first) = intervals.first() else {
        return groups;
    };

    let mut current = IntervalGroup {
        range: 0..1,
        start: first.start,
        end: first.end,
    };
    for (index, interval) in intervals.iter().enumerate().skip(1) {
        if interval.start >= current.end {
            let next = IntervalGroup {
                range: index..index + 1,
                start: interval.start,
                end: interval.end,
            };
            groups.push(std::mem::replace(&mut current, next));
        } else {
            current.range.end = index + 1;
            current.end = current.end.max(interval.end);
        }
    }
    groups.push(current);
    groups
}
