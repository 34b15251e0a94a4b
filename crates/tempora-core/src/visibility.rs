//! Show/hide rules for timeline-driven visual elements.

use crate::collector::{IntervalCollector, Span, TemporalCollector, Timeline};
use serde::{Deserialize, Serialize};

/// Decides whether an element fed by a collector should be on screen.
///
/// All durations are milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilityRules {
    /// Show this long before the next item starts (default: 1000)
    pub show_before: u64,
    /// Stay visible across gaps up to this long (default: 7000)
    pub show_between: u64,
    /// Stay visible this long after the previous item (default: 2000)
    pub show_after: u64,
}

impl Default for VisibilityRules {
    fn default() -> Self {
        Self {
            show_before: 1000,
            show_between: 7000,
            show_after: 2000,
        }
    }
}

impl VisibilityRules {
    /// Visibility for point events, measured from item start times.
    pub fn events<L: Timeline>(&self, collector: &TemporalCollector<L>, time: u64) -> bool {
        self.decide(collector.prev_time(), collector.peek_time(), time)
    }

    /// Visibility for intervals. Always visible while an interval is active;
    /// gaps are measured from the previous interval's end.
    pub fn intervals<L: Timeline>(&self, collector: &IntervalCollector<L>, time: u64) -> bool
    where
        L::Item: Span,
    {
        if collector.has_active() {
            return true;
        }
        let prev_end = collector.prev().map(|item| item.end());
        let next_start = collector.collector().peek_time();
        self.decide(prev_end, next_start, time)
    }

    fn decide(&self, prev: Option<u64>, next: Option<u64>, time: u64) -> bool {
        if let Some(next) = next {
            if next.saturating_sub(time) <= self.show_before {
                return true;
            }
            if let Some(prev) = prev {
                if next.saturating_sub(prev) <= self.show_between {
                    return true;
                }
            }
        }
        prev.is_some_and(|prev| time.saturating_sub(prev) <= self.show_after)
    }
}
