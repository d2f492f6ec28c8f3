//! Retrieval evidence attached to assistant answers.

use serde::{Deserialize, Serialize};

/// Confidence band assigned by the retrieval pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBucket {
    High,
    Medium,
    Low,
}

/// A single cited source.
///
/// Sources are immutable once attached to a turn. Every field beyond the id
/// is optional on the wire and stays optional here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRef {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub score: Option<f64>,
    /// Normalized relevance in 0..1
    #[serde(default)]
    pub score_norm: Option<f64>,
    #[serde(default)]
    pub confidence_bucket: Option<ConfidenceBucket>,
}

/// Generation-side measurements reported with a fresh answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMetrics {
    #[serde(default)]
    pub tokens_used: Option<i64>,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default)]
    pub retrieval_score: Option<f64>,
    #[serde(default)]
    pub context_chunks_used: i64,
    #[serde(default)]
    pub user_feedback: Option<i8>,
}
