//! A legal-document PDF composition engine: ingests a Markdown-plus-marker
//! document and a document-type identifier, and produces a paginated,
//! legally-formatted PDF byte stream with atomic, side-by-side signature
//! blocks, orphan/widow control, and optional notary sections.
//!
//! The public surface is deliberately small: [`compose`] and
//! [`compose_batch`] are the only entry points a host needs. Everything
//! else — the marker grammar, the per-document-type formatting table, the
//! layout engine's keep-together/orphan-widow rules, the PDF byte emitter —
//! is reachable for hosts that need to drive a sub-stage directly (e.g. a
//! desktop shell previewing just the parsed signature blocks), but `compose`
//! is the contract this crate is measured against.
//!
//! Architecture follows a hexagonal `domain` / `ports` / `adapters` /
//! `services` split, the same shape the teacher repository uses: `domain`
//! holds pure data and pure functions (parsing, formatting, layout), `ports`
//! defines the capability traits a host implements or that this crate
//! implements for itself (`OutputSink`, `ProgressListener`, `CancelSignal`),
//! `adapters` are the concrete implementations of those ports (the
//! `pdf-writer`-backed PDF emitter, file/buffer sinks, a TOML overrides
//! loader), and `services` orchestrates the whole pipeline.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use domain::document_type::DocumentType;
pub use domain::formatting::{FormattingOverrides, FormattingRules, LineSpacing, Margins, PageNumberPosition};
pub use domain::options::{DocumentMetadata, PageNumberFormat, PageNumberOptions, PipelineOptions};
pub use domain::result::PipelineResult;
pub use error::{PipelineError, Result, Warning, WarningCode};
pub use ports::output_sink::{SinkArtifact, SinkChoice};
pub use ports::progress::{CancelSignal, ProgressListener, ProgressMilestone};
pub use services::pipeline::{Pipeline, PipelineOutcome};

/// Composes `document_text` (Markdown plus `[..._BLOCK:id]` markers) into a
/// PDF per `document_type`'s formatting rules (spec §6 "Invocation
/// contract"). Returns the result descriptor and, unless the host's
/// cancellation signal fired, the produced artifact (a byte buffer or a
/// confirmed file path, depending on `options.sink`).
///
/// `document_type` must be one of the eight closed-set identifiers (spec
/// §3); any other value is a fatal `INVALID_DOCUMENT_TYPE` error.
pub fn compose(document_text: &str, document_type: &str, options: PipelineOptions) -> Result<PipelineOutcome> {
    Pipeline::compose(document_text, document_type, options)
}

/// Runs [`compose`] over many independent `(text, documentType, options)`
/// requests, collecting one result per request instead of aborting the
/// whole batch on the first failure (spec §9, generalizing the teacher's
/// `generate_batch_sync`).
pub fn compose_batch(requests: Vec<(String, String, PipelineOptions)>) -> Vec<Result<PipelineOutcome>> {
    Pipeline::compose_batch(requests)
}
