//! Serializable ranking reports
//!
//! Turns a [`Ranking`] into output structures listing rank, identifier,
//! distance, optional per-term contributions and the entries that were skipped.

use crate::rank::{RankedResult, Ranking, SkippedEntry};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One ranked entry with its position and optional distance breakdown
#[derive(Debug, Clone, Serialize)]
pub struct ExplainedResult {
    /// 1-based position in the full ranking
    pub rank: usize,
    pub id: String,
    pub distance: f32,
    /// Per-term contributions (already weighted)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain: Option<BTreeMap<String, f32>>,
}

impl ExplainedResult {
    pub fn from_ranked(rank: usize, ranked: &RankedResult) -> Self {
        let explain = if ranked.terms.is_empty() {
            None
        } else {
            Some(ranked.terms.iter().cloned().collect())
        };
        Self {
            rank,
            id: ranked.id.clone(),
            distance: ranked.distance,
            explain,
        }
    }
}

impl fmt::Display for ExplainedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {} (distance: {:.4})", self.rank, self.id, self.distance)?;
        if let Some(terms) = &self.explain {
            let parts: Vec<String> = terms
                .iter()
                .map(|(name, value)| format!("{}={:.4}", name, value))
                .collect();
            write!(f, " [{}]", parts.join(", "))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedReport {
    pub id: String,
    pub reason: String,
}

impl From<&SkippedEntry> for SkippedReport {
    fn from(entry: &SkippedEntry) -> Self {
        Self {
            id: entry.id.clone(),
            reason: entry.error.to_string(),
        }
    }
}

/// Output of one retrieval run
#[derive(Debug, Clone, Serialize)]
pub struct RankingReport {
    pub query: String,
    pub metric: String,
    /// Number of corpus entries that were ranked
    pub ranked: usize,
    pub top: Vec<ExplainedResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bottom: Vec<ExplainedResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedReport>,
}

impl RankingReport {
    /// Build a report with the `k` nearest and `bottom` farthest entries
    pub fn new(
        query: impl Into<String>,
        metric: &str,
        ranking: &Ranking,
        k: usize,
        bottom: usize,
    ) -> Self {
        let total = ranking.len();
        let top = ranking
            .top(k)
            .iter()
            .enumerate()
            .map(|(i, r)| ExplainedResult::from_ranked(i + 1, r))
            .collect();
        let tail = ranking.bottom(bottom);
        let offset = total - tail.len();
        let bottom = tail
            .iter()
            .enumerate()
            .map(|(i, r)| ExplainedResult::from_ranked(offset + i + 1, r))
            .collect();

        Self {
            query: query.into(),
            metric: metric.to_string(),
            ranked: total,
            top,
            bottom,
            skipped: ranking.skipped().iter().map(SkippedReport::from).collect(),
        }
    }
}
