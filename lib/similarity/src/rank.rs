//! Ranker
//!
//! Orders a corpus by distance to a query descriptor. Distances are computed in
//! parallel, the sort is stable so ties keep corpus enumeration order, and
//! entries the metric cannot compare are reported instead of being given an
//! extreme distance.

use crate::distance::Metric;
use ordered_float::OrderedFloat;
use pixrank_core::{CorpusEntry, Descriptor, Error};
use rayon::prelude::*;
use serde::Serialize;

/// Distance of one corpus entry to the query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub id: String,
    pub distance: f32,
    /// Per-term weighted contributions, filled when explanation is enabled
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<(String, f32)>,
}

impl RankedResult {
    pub fn new(id: impl Into<String>, distance: f32) -> Self {
        Self {
            id: id.into(),
            distance,
            terms: Vec::new(),
        }
    }
}

/// A corpus entry excluded from the ranking, with the reason
#[derive(Debug)]
pub struct SkippedEntry {
    pub id: String,
    pub error: Error,
}

/// Full ranking of a corpus, ascending by distance
#[derive(Debug, Default)]
pub struct Ranking {
    results: Vec<RankedResult>,
    skipped: Vec<SkippedEntry>,
}

impl Ranking {
    pub fn new(results: Vec<RankedResult>, skipped: Vec<SkippedEntry>) -> Self {
        Self { results, skipped }
    }

    /// All ranked entries, nearest first
    pub fn results(&self) -> &[RankedResult] {
        &self.results
    }

    pub fn skipped(&self) -> &[SkippedEntry] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// The `k` nearest entries (all of them if `k` exceeds the ranking)
    pub fn top(&self, k: usize) -> &[RankedResult] {
        &self.results[..k.min(self.results.len())]
    }

    /// The `k` most dissimilar entries, still in ascending order
    pub fn bottom(&self, k: usize) -> &[RankedResult] {
        let start = self.results.len().saturating_sub(k);
        &self.results[start..]
    }

    pub(crate) fn extend_skipped(&mut self, skipped: impl IntoIterator<Item = SkippedEntry>) {
        self.skipped.extend(skipped);
    }

    pub fn into_parts(self) -> (Vec<RankedResult>, Vec<SkippedEntry>) {
        (self.results, self.skipped)
    }
}

#[derive(Debug, Clone)]
pub struct Ranker {
    metric: Metric,
    explain: bool,
}

impl Ranker {
    pub fn new(metric: Metric) -> Self {
        Self {
            metric,
            explain: false,
        }
    }

    /// Also record per-term contributions for every ranked entry
    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    /// Rank the whole corpus against `query`
    pub fn rank_all(&self, query: &Descriptor, corpus: Vec<CorpusEntry>) -> Ranking {
        let scored: Vec<Result<RankedResult, SkippedEntry>> = corpus
            .into_par_iter()
            .map(|entry| self.score(query, entry))
            .collect();

        let mut results = Vec::with_capacity(scored.len());
        let mut skipped = Vec::new();
        for outcome in scored {
            match outcome {
                Ok(result) => results.push(result),
                Err(entry) => {
                    tracing::warn!("Skipping {}: {}", entry.id, entry.error);
                    skipped.push(entry);
                }
            }
        }

        // sort_by_key is stable: equal distances keep enumeration order
        results.sort_by_key(|r| OrderedFloat(r.distance));
        Ranking::new(results, skipped)
    }

    /// The `k` nearest corpus entries to `query`
    pub fn rank(&self, query: &Descriptor, corpus: Vec<CorpusEntry>, k: usize) -> Vec<RankedResult> {
        if k == 0 || corpus.is_empty() {
            return Vec::new();
        }
        let ranking = self.rank_all(query, corpus);
        let (mut results, _) = ranking.into_parts();
        results.truncate(k);
        results
    }

    fn score(&self, query: &Descriptor, entry: CorpusEntry) -> Result<RankedResult, SkippedEntry> {
        let outcome = if self.explain {
            self.metric.terms(query, &entry.descriptor).map(|terms| {
                let distance: f32 = terms.iter().map(|(_, t)| t).sum();
                (distance, terms)
            })
        } else {
            self.metric
                .distance(query, &entry.descriptor)
                .map(|distance| (distance, Vec::new()))
        };

        match outcome {
            Ok((distance, terms)) => {
                tracing::debug!("{} -> {:.6}", entry.id, distance);
                Ok(RankedResult {
                    id: entry.id,
                    distance,
                    terms,
                })
            }
            Err(error) => Err(SkippedEntry {
                id: entry.id,
                error,
            }),
        }
    }
}
