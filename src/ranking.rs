//! Activity ranking of cells.
//!
//! [`ActivityRanker`] is a max-heap view over the cell groups' connection
//! counts. It is built on demand from the groups, so it can be recomputed at
//! any time and is never threaded through ingestion.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::event_log::CellGroup;

/// A cell tag with its connection count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedCell {
    pub tag: String,
    pub count: usize,
}

// Higher count first; equal counts pop in ascending tag order.
impl Ord for RankedCell {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.tag.cmp(&self.tag))
    }
}

impl PartialOrd for RankedCell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cells ordered by descending connection count.
///
/// # Example
///
/// ```rust
/// use residential_finder::ranking::ActivityRanker;
///
/// let mut ranker = ActivityRanker::from_counts([("A", 50), ("B", 30), ("C", 80)]);
/// assert_eq!(ranker.pop_most_active().unwrap().tag, "C");
/// assert_eq!(ranker.pop_most_active().unwrap().tag, "A");
/// assert_eq!(ranker.pop_most_active().unwrap().tag, "B");
/// assert!(ranker.pop_most_active().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ActivityRanker {
    heap: BinaryHeap<RankedCell>,
}

impl ActivityRanker {
    /// Rank the given cell groups by their current event counts.
    pub fn from_groups(groups: &[CellGroup]) -> Self {
        Self::from_counts(groups.iter().map(|g| (g.tag.as_str(), g.num_connections())))
    }

    /// Rank arbitrary `(tag, count)` pairs.
    pub fn from_counts<'a>(counts: impl IntoIterator<Item = (&'a str, usize)>) -> Self {
        let heap = counts
            .into_iter()
            .map(|(tag, count)| RankedCell {
                tag: tag.to_string(),
                count,
            })
            .collect();
        Self { heap }
    }

    /// Remove and return the most active remaining cell.
    pub fn pop_most_active(&mut self) -> Option<RankedCell> {
        self.heap.pop()
    }

    /// Look at the most active remaining cell without removing it.
    pub fn peek(&self) -> Option<&RankedCell> {
        self.heap.peek()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl Iterator for ActivityRanker {
    type Item = RankedCell;

    fn next(&mut self) -> Option<Self::Item> {
        self.pop_most_active()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.heap.len(), Some(self.heap.len()))
    }
}
