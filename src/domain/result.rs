//! The result descriptor returned by the pipeline (spec §4.8, §8).

use crate::domain::document_type::DocumentType;
use crate::error::Warning;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub byte_count: u64,
    pub page_count: u32,
    pub signature_block_count: usize,
    pub warnings: Vec<Warning>,
    pub document_type: DocumentType,
    pub generated_at: String,
    /// `true` when the host's cancellation signal fired before composition
    /// completed (spec §5). A cancelled result carries no guarantee of a
    /// valid PDF; buffer sinks are discarded empty, file sinks may hold a
    /// partial file the caller must delete.
    pub cancelled: bool,
}

impl PipelineResult {
    /// Serializes the descriptor to JSON, the same `serde_json::to_vec`
    /// idiom the teacher uses to hand a response struct back across its
    /// HTTP boundary (e.g. `handlers::pdf_hexagonal::store_signature`) —
    /// here the boundary is a host embedding this crate rather than an
    /// HTTP client, but the wire shape is the same convenience.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
