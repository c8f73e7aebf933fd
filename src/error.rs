//! Error handling for the composition pipeline.
//!
//! Mirrors the teacher's hand-rolled `DocumentError`/`ApiError` pattern: a
//! plain enum with a manual `Display` + `std::error::Error` impl rather than
//! `thiserror` (not part of this crate's dependency stack). `PipelineError`
//! covers only the fatal, boundary-facing cases of the taxonomy; everything
//! recoverable is a `Warning` instead.

use std::fmt;

/// Fatal errors that abort composition before (or during) byte emission.
///
/// Variant names match the stable, host-facing codes of the error taxonomy.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// `documentType` is not one of the eight closed-set identifiers.
    InvalidDocumentType(String),
    /// The input text is empty or whitespace-only.
    EmptyContent,
    /// A signature block exceeds the usable area of an empty page and
    /// `options.strict` is enabled.
    SignatureBlockOversized { group_key: String },
    /// A character has no WinAnsi representation and strict encoding was
    /// requested; non-strict callers instead get a `Warning` and a `?`.
    EncodingUnsupported { character: char },
    /// The output sink failed to accept bytes or to finish.
    SinkIoError(String),
    /// The host's cancellation signal fired before composition completed.
    Cancelled,
    /// An internal invariant was violated. The only route to this variant
    /// is an assertion failure in the layout engine or writer; well-formed
    /// input never produces it.
    Internal(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDocumentType(t) => write!(f, "invalid document type: {t}"),
            Self::EmptyContent => write!(f, "document content is empty or whitespace-only"),
            Self::SignatureBlockOversized { group_key } => {
                write!(f, "signature block group '{group_key}' exceeds the usable page area")
            }
            Self::EncodingUnsupported { character } => {
                write!(f, "character {character:?} has no WinAnsi encoding")
            }
            Self::SinkIoError(msg) => write!(f, "output sink I/O failure: {msg}"),
            Self::Cancelled => write!(f, "composition was cancelled"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::SinkIoError(err.to_string())
    }
}

/// The stable error code surfaced to hosts, independent of `Display` text.
impl PipelineError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidDocumentType(_) => "INVALID_DOCUMENT_TYPE",
            Self::EmptyContent => "EMPTY_CONTENT",
            Self::SignatureBlockOversized { .. } => "SIGNATURE_BLOCK_OVERSIZED",
            Self::EncodingUnsupported { .. } => "ENCODING_UNSUPPORTED",
            Self::SinkIoError(_) => "SINK_IO_ERROR",
            Self::Cancelled => "CANCELLED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// A non-fatal, accumulated diagnostic. See spec §7.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Warning {
    pub code: WarningCode,
    pub message: String,
    pub context: String,
}

impl Warning {
    pub fn new(code: WarningCode, message: impl Into<String>, context: impl Into<String>) -> Self {
        Self { code, message: message.into(), context: context.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningCode {
    InvalidMarkerId,
    EmptySignatureBlock,
    CharacterReplaced,
    ForcedPlacement,
    MissingMetadata,
}
