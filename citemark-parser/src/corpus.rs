//! Parsing many samples at once.
//!
//! Samples share nothing, so they are parsed in parallel and merged afterwards in
//! input order.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::Serialize;

use crate::{Document, Finding, FindingKind, Options, Severity, model::SpanKind, parse_sample};

/// The result of one corpus run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct Corpus {
    /// One document per sample, in input order.
    pub documents: Vec<Document>,
    /// Every finding of every sample, by sample then by position.
    pub findings: Vec<Finding>,
    pub stats: CorpusStats,
}

impl Corpus {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.stats.errors > 0
    }
}

/// Parse every sample and merge the results.
///
/// Sample `i` of the input becomes document `i` and its findings carry `sample: i`.
#[tracing::instrument(skip_all, fields(samples = samples.len()))]
pub fn parse_corpus<S>(samples: &[S], options: &Options) -> Corpus
where
    S: AsRef<str> + Sync,
{
    let documents: Vec<Document> = samples
        .par_iter()
        .enumerate()
        .map(|(sample, input)| parse_sample(sample, input.as_ref(), options))
        .collect();

    let findings: Vec<Finding> = documents
        .iter()
        .flat_map(|document| document.findings.iter().cloned())
        .collect();
    let stats = CorpusStats::from_documents(&documents);
    tracing::debug!(
        errors = stats.errors,
        warnings = stats.warnings,
        "corpus parsed"
    );

    Corpus {
        documents,
        findings,
        stats,
    }
}

/// How positive (with quotes) and negative (without) samples are balanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Balance {
    /// Positive share within ten points of half.
    Balanced,
    SkewedNegative,
    SkewedPositive,
    Moderate,
}

impl std::fmt::Display for Balance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Balance::Balanced => f.write_str("well-balanced"),
            Balance::SkewedNegative => f.write_str("skewed towards negative examples"),
            Balance::SkewedPositive => f.write_str("skewed towards positive examples"),
            Balance::Moderate => f.write_str("moderate class imbalance"),
        }
    }
}

/// Read-only aggregates over a corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct CorpusStats {
    pub samples: usize,
    pub with_quotes: usize,
    pub without_quotes: usize,
    pub spans: BTreeMap<SpanKind, usize>,
    pub errors: usize,
    pub warnings: usize,
    /// Samples over the character limit.
    pub oversized: Vec<usize>,
    /// Samples sharing their first word, keyed by that word. Likely duplicates.
    pub duplicate_openings: BTreeMap<String, Vec<usize>>,
}

impl CorpusStats {
    #[must_use]
    pub fn from_documents(documents: &[Document]) -> Self {
        let mut stats = Self::default();
        let mut openings: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for document in documents {
            stats.samples += 1;
            if document.has_quotes() {
                stats.with_quotes += 1;
            } else {
                stats.without_quotes += 1;
            }
            for span in &document.spans {
                *stats.spans.entry(span.kind).or_default() += 1;
            }
            for finding in &document.findings {
                match finding.severity {
                    Severity::Error => stats.errors += 1,
                    Severity::Warning => stats.warnings += 1,
                }
                if matches!(finding.kind, FindingKind::OversizedSample { .. }) {
                    stats.oversized.push(document.sample);
                }
            }
            if let Some(word) = document.first_word() {
                openings.entry(word).or_default().push(document.sample);
            }
        }

        openings.retain(|_, samples| samples.len() > 1);
        stats.duplicate_openings = openings;
        stats
    }

    /// Add the counts of another corpus, for totals over several files.
    ///
    /// Sample numbers are only meaningful within one corpus, so `oversized` and
    /// `duplicate_openings` are left alone.
    pub fn add_counts(&mut self, other: &CorpusStats) {
        self.samples += other.samples;
        self.with_quotes += other.with_quotes;
        self.without_quotes += other.without_quotes;
        for (kind, count) in &other.spans {
            *self.spans.entry(*kind).or_default() += count;
        }
        self.errors += other.errors;
        self.warnings += other.warnings;
    }

    #[must_use]
    pub fn span_count(&self, kind: SpanKind) -> usize {
        self.spans.get(&kind).copied().unwrap_or_default()
    }

    /// Share of samples with quotes, in percent.
    #[must_use]
    pub fn positive_percent(&self) -> f64 {
        percent(self.with_quotes, self.samples)
    }

    /// Share of samples without quotes, in percent.
    #[must_use]
    pub fn negative_percent(&self) -> f64 {
        percent(self.without_quotes, self.samples)
    }

    /// `None` for an empty corpus.
    #[must_use]
    pub fn balance(&self) -> Option<Balance> {
        if self.samples == 0 {
            return None;
        }
        let positive = self.positive_percent();
        let negative = self.negative_percent();
        Some(if (positive - 50.0).abs() < 10.0 {
            Balance::Balanced
        } else if negative > 60.0 {
            Balance::SkewedNegative
        } else if positive > 60.0 {
            Balance::SkewedPositive
        } else {
            Balance::Moderate
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
