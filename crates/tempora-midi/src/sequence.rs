//! Immutable, time-sorted event sequences.

use crate::event::Event;
use crate::tempo_map::TempoMap;

/// An ordered collection of events plus the tempo map that times them.
///
/// Sequences are immutable once built and are shared as `Arc<Sequence>`
/// between the dispatch engine and any number of collectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    events: Vec<Event>,
    /// Millisecond time of each event, parallel to `events`.
    times: Vec<u64>,
    tempo_map: TempoMap,
}

impl Sequence {
    /// Sort `events` by tick (equal ticks keep their input order) and time
    /// them with `tempo_map`.
    pub fn new(mut events: Vec<Event>, tempo_map: TempoMap) -> Self {
        events.sort_by_key(|e| e.tick);
        let times = events
            .iter()
            .map(|e| tempo_map.tick_to_millis(e.tick))
            .collect();
        Self {
            events,
            times,
            tempo_map,
        }
    }

    /// A sequence whose ticks are milliseconds.
    pub fn from_millis(events: Vec<Event>) -> Self {
        Self::new(events, TempoMap::millisecond_ticks())
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), TempoMap::default())
    }

    #[inline]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Millisecond times, parallel to [`events`](Self::events).
    #[inline]
    pub fn times(&self) -> &[u64] {
        &self.times
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[inline]
    pub fn event(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    /// Millisecond time of the event at `index`.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    #[inline]
    pub fn time_of(&self, index: usize) -> u64 {
        self.times[index]
    }

    #[inline]
    pub fn tempo_map(&self) -> &TempoMap {
        &self.tempo_map
    }

    #[inline]
    pub fn tick_to_millis(&self, tick: u64) -> u64 {
        self.tempo_map.tick_to_millis(tick)
    }

    /// Time of the last event, 0 for an empty sequence.
    pub fn duration_millis(&self) -> u64 {
        self.times.last().copied().unwrap_or(0)
    }

    /// Events paired with their millisecond time, in order.
    pub fn iter_timed(&self) -> impl Iterator<Item = (u64, &Event)> + '_ {
        self.times.iter().copied().zip(self.events.iter())
    }

    /// Number of events strictly before `time`.
    pub fn count_before(&self, time: u64) -> usize {
        self.times.partition_point(|&t| t < time)
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tempo_map::TempoChange;

    #[test]
    fn test_sorted_stable_by_tick() {
        let seq = Sequence::from_millis(vec![
            Event::note_off(100, 0, 60),
            Event::program_change(0, 0, 5),
            Event::note_on(100, 0, 62, 90),
            Event::note_on(0, 0, 60, 90),
        ]);
        let ticks: Vec<u64> = seq.events().iter().map(|e| e.tick).collect();
        assert_eq!(ticks, vec![0, 0, 100, 100]);
        // Ties keep input order
        assert_eq!(seq.events()[0], Event::program_change(0, 0, 5));
        assert_eq!(seq.events()[2], Event::note_off(100, 0, 60));
    }

    #[test]
    fn test_times_follow_tempo_map() {
        let map = TempoMap::new(480, [TempoChange::new(480, 1_000_000)]).unwrap();
        let seq = Sequence::new(
            vec![Event::note_on(0, 0, 60, 100), Event::note_off(960, 0, 60)],
            map,
        );
        assert_eq!(seq.times(), &[0, 1500]);
        assert_eq!(seq.duration_millis(), 1500);
    }

    #[test]
    fn test_empty_sequence() {
        let seq = Sequence::empty();
        assert!(seq.is_empty());
        assert_eq!(seq.duration_millis(), 0);
        assert_eq!(seq.count_before(1000), 0);
    }

    #[test]
    fn test_count_before() {
        let seq = Sequence::from_millis(vec![
            Event::note_on(0, 0, 60, 100),
            Event::note_on(10, 0, 61, 100),
            Event::note_on(10, 0, 62, 100),
            Event::note_on(20, 0, 63, 100),
        ]);
        assert_eq!(seq.count_before(0), 0);
        assert_eq!(seq.count_before(10), 1);
        assert_eq!(seq.count_before(11), 3);
        assert_eq!(seq.count_before(u64::MAX), 4);
    }
}
