//! Per-call diagnostic trace.
//!
//! A trace is created for each extraction, appended to while the pipeline
//! runs, and handed back to the caller next to the records. Nothing in the
//! pipeline reads it back.

use serde::Serialize;

use crate::types::Strategy;

/// Record field a resolver produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Id,
    Title,
    Description,
    VideoUrl,
    Thumbnail,
    Language,
}

/// Why a candidate produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Candidate shape was unusable (e.g. a JSON item with no known keys).
    Malformed,
    /// Title, URL and discovered thumbnail were all empty.
    Empty,
    /// Another record already carried the same video URL.
    Duplicate,
}

/// Where a record's thumbnail came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThumbnailSource {
    Discovered,
    Primary,
    Fallback,
    Placeholder,
    Random,
}

/// How a mined URL was paired with a mined numeric ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// The ID string occurs inside the URL.
    Contained,
    /// Paired by index only.
    Positional,
}

/// One locator strategy run.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyAttempt {
    pub strategy: Strategy,
    pub candidates: usize,
    /// Which pattern or selector entry produced the candidates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of ID/URL correlation during URL mining.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorrelationReport {
    pub urls: usize,
    pub ids: usize,
    pub contained: usize,
    pub positional: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldTrace {
    pub candidate: usize,
    pub field: Field,
    /// Name of the sub-resolver that produced the value.
    pub source: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedCandidate {
    pub candidate: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThumbnailTrace {
    pub record_id: String,
    pub source: ThumbnailSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Append-only observability record for one extraction call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticTrace {
    pub attempts: Vec<StrategyAttempt>,
    pub selected: Option<Strategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<CorrelationReport>,
    pub fields: Vec<FieldTrace>,
    pub skipped: Vec<SkippedCandidate>,
    pub thumbnails: Vec<ThumbnailTrace>,
}

impl DiagnosticTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempt(&mut self, attempt: StrategyAttempt) {
        self.attempts.push(attempt);
    }

    pub fn field(&mut self, candidate: usize, field: Field, source: &'static str) {
        self.fields.push(FieldTrace {
            candidate,
            field,
            source,
        });
    }

    pub fn skip(&mut self, candidate: usize, reason: SkipReason) {
        self.skipped.push(SkippedCandidate { candidate, reason });
    }

    pub fn thumbnail(
        &mut self,
        record_id: impl Into<String>,
        source: ThumbnailSource,
        category: Option<String>,
    ) {
        self.thumbnails.push(ThumbnailTrace {
            record_id: record_id.into(),
            source,
            category,
        });
    }

    /// Strategies attempted, in order.
    pub fn attempted(&self) -> impl Iterator<Item = Strategy> + '_ {
        self.attempts.iter().map(|a| a.strategy)
    }

    /// Number of skips recorded for a given reason.
    pub fn skipped_for(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }

    /// Sub-resolver that produced `field` for `candidate`, if any.
    pub fn field_source(&self, candidate: usize, field: Field) -> Option<&'static str> {
        self.fields
            .iter()
            .find(|f| f.candidate == candidate && f.field == field)
            .map(|f| f.source)
    }
}
