//! Temporal collectors.
//!
//! A collector walks a time-sorted [`Timeline`] forwards as a query time
//! increases and hands back exactly the items newly reached on each step.
//! Collectors are single-owner and hold no locks; share the underlying data
//! (`Arc<Sequence>`, `Arc<[T]>`) and give each consumer its own collector.
//! A [`CollectorGroup`] repositions every registered collector at once.
//!
//! - [`TemporalCollector`] - generic cursor with `advance`, `peek`, `prev`, `seek`
//! - [`IntervalCollector`] - adds the set of intervals active at the query time
//! - [`EventView`] - channel or predicate filtered view of a sequence
//! - [`CollectorGroup`] - seek many collectors together

mod active;
mod cursor;
mod group;
mod timeline;
mod view;

pub use active::IntervalCollector;
pub use cursor::{Reached, SeekHook, TemporalCollector, Trigger};
pub use group::{CollectorGroup, Seekable};
pub use timeline::{Span, Timed, Timeline};
pub use view::EventView;

/// Collector over every event of a shared sequence.
pub type SequenceCollector = TemporalCollector<std::sync::Arc<tempora_midi::Sequence>>;

/// Collector over a filtered view of a sequence.
pub type EventCollector = TemporalCollector<EventView>;
