//! Chunked, bounded-concurrency scheduling across languages
//!
//! Languages are split into consecutive chunks of `concurrency_limit`. Each
//! chunk runs concurrently and is awaited in full before the next starts, so
//! no more than `concurrency_limit` requests are ever outstanding. Results
//! come back in input order regardless of completion order.

use crate::harvest::collector::Collect;
use crate::model::CollectionResult;
use futures::future::join_all;

/// Runs a collector over a language list, one chunk at a time
#[derive(Debug, Clone, Copy)]
pub struct BatchScheduler {
    concurrency_limit: usize,
}

impl BatchScheduler {
    /// A limit of zero is treated as one
    pub fn new(concurrency_limit: usize) -> Self {
        Self {
            concurrency_limit: concurrency_limit.max(1),
        }
    }

    pub fn concurrency_limit(&self) -> usize {
        self.concurrency_limit
    }

    /// Languages grouped the way `run` will schedule them
    pub fn chunks<'a>(&self, languages: &'a [String]) -> impl Iterator<Item = &'a [String]> {
        languages.chunks(self.concurrency_limit)
    }

    /// Collects every language; the output has one result per input, in input order
    pub async fn run<C: Collect>(&self, collector: &C, languages: &[String]) -> Vec<CollectionResult> {
        let mut results = Vec::with_capacity(languages.len());
        let chunk_count = languages.len().div_ceil(self.concurrency_limit);

        for (index, chunk) in self.chunks(languages).enumerate() {
            tracing::debug!(
                "Starting chunk {}/{}: {}",
                index + 1,
                chunk_count,
                chunk.join(", ")
            );

            // join_all yields in the order the futures were supplied
            let chunk_results = join_all(chunk.iter().map(|language| collector.collect(language))).await;
            results.extend(chunk_results);
        }

        results
    }
}
