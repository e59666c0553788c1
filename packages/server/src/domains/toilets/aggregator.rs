//! Merges normalized records from every page into one result set.
//!
//! Records are keyed by id and the first sighting wins; later duplicates are
//! dropped whole, never merged field by field. Incomplete records are removed
//! after deduplication, so an incomplete first sighting hides any later copy.

use indexmap::map::Entry;
use indexmap::IndexMap;

use super::models::Toilet;

/// Counters describing what a run discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub records_seen: usize,
    pub duplicates: usize,
    pub incomplete: usize,
}

/// Deduplicated, complete records in first-sighting order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    pub toilets: Vec<Toilet>,
    pub stats: AggregateStats,
}

impl AggregateResult {
    pub fn len(&self) -> usize {
        self.toilets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toilets.is_empty()
    }
}

/// Incremental form of [`aggregate`], fed one page at a time.
#[derive(Debug, Default)]
pub struct Aggregator {
    by_id: IndexMap<String, Toilet>,
    stats: AggregateStats,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, toilet: Toilet) {
        self.stats.records_seen += 1;
        match self.by_id.entry(toilet.id.clone()) {
            Entry::Occupied(_) => self.stats.duplicates += 1,
            Entry::Vacant(slot) => {
                slot.insert(toilet);
            }
        }
    }

    pub fn finish(self) -> AggregateResult {
        let mut stats = self.stats;
        let unique = self.by_id.len();

        let toilets: Vec<Toilet> = self
            .by_id
            .into_values()
            .filter(|toilet| {
                let keep = toilet.is_acceptable();
                if !keep {
                    tracing::debug!(id = %toilet.id, "Discarding incomplete record");
                }
                keep
            })
            .collect();
        stats.incomplete = unique - toilets.len();

        AggregateResult { toilets, stats }
    }
}

impl Extend<Toilet> for Aggregator {
    fn extend<I: IntoIterator<Item = Toilet>>(&mut self, iter: I) {
        for toilet in iter {
            self.push(toilet);
        }
    }
}

/// Deduplicate by id (first wins) and drop incomplete records.
pub fn aggregate<I>(records: I) -> AggregateResult
where
    I: IntoIterator<Item = Toilet>,
{
    let mut aggregator = Aggregator::new();
    aggregator.extend(records);
    aggregator.finish()
}
