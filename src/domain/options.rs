//! The pipeline's invocation options (spec §6 "options").

use crate::domain::formatting::FormattingOverrides;
use crate::domain::layout_engine::DEFAULT_ORPHAN_WIDOW;
use crate::ports::output_sink::SinkChoice;
use crate::ports::progress::{CancelSignal, NeverCancel, NoopProgressListener, ProgressListener};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageNumberFormat {
    Numeric,
    Roman,
    Alpha,
}

/// Page-numbering presentation (spec §6 `pageNumberFormat`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageNumberOptions {
    pub format: PageNumberFormat,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub starting_number: u32,
}

impl Default for PageNumberOptions {
    fn default() -> Self {
        Self { format: PageNumberFormat::Numeric, prefix: None, suffix: None, starting_number: 1 }
    }
}

/// PDF `/Info` dictionary fields (spec §6 `metadata`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Vec<String>,
    /// Pinned generation timestamp for byte-identical reproducible output
    /// (spec §8 "Round-trip & idempotence"). `None` lets the writer stamp
    /// the current time.
    pub generated_at: Option<String>,
}

impl DocumentMetadata {
    /// Whether any `/Info`-worthy field was supplied; gates both whether the
    /// `/Info` dictionary is written at all and whether the "Doc generated"
    /// footer is stamped on the final page.
    pub fn is_present(&self) -> bool {
        self.title.is_some() || self.author.is_some() || self.subject.is_some() || !self.keywords.is_empty()
    }
}

/// Everything a caller may pass alongside `(documentText, documentType)`
/// (spec §6). `sink` and the two capability callbacks have no sensible
/// `Default`/`Clone`, so this type is built via [`PipelineOptions::new`]
/// rather than struct-update syntax.
pub struct PipelineOptions {
    pub sink: SinkChoice,
    pub formatting_overrides: Option<FormattingOverrides>,
    pub page_number: PageNumberOptions,
    pub metadata: DocumentMetadata,
    pub progress: Box<dyn ProgressListener>,
    pub cancel: Box<dyn CancelSignal>,
    /// Promotes a forced-placement signature overflow from a warning to a
    /// fatal `SIGNATURE_BLOCK_OVERSIZED` error (spec §7).
    pub strict: bool,
    /// Minimum orphan/widow line count for text-block page breaks
    /// (spec §4.6 rule 3, default 2).
    pub orphan_widow: usize,
}

impl PipelineOptions {
    pub fn new(sink: SinkChoice) -> Self {
        Self {
            sink,
            formatting_overrides: None,
            page_number: PageNumberOptions::default(),
            metadata: DocumentMetadata::default(),
            progress: Box::new(NoopProgressListener),
            cancel: Box::new(NeverCancel),
            strict: false,
            orphan_widow: DEFAULT_ORPHAN_WIDOW,
        }
    }
}
