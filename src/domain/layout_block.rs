//! The layout block tagged variant (spec §3 "Layout block"), the unit of
//! pagination consumed by [`crate::services::layout_engine::LayoutEngine`].
//!
//! Expressed as a plain enum + `height()`/`breakable()`/dispatch, per spec
//! §9 ("Polymorphism... expressed as enums-plus-dispatch in a systems
//! implementation — no inheritance required"), the same shape the teacher
//! uses for its own `DocumentMetadata` enum (`domain/document.rs`).

use crate::domain::formatting::Font;
use crate::domain::signature::SignatureBlockRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub font_size: f32,
    pub font: Font,
    pub line_gap: f32,
    pub indent: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadingBlock {
    pub level: u8,
    pub text: String,
    pub font_size: f32,
    pub bold: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutBlock {
    Text(TextBlock),
    Heading(HeadingBlock),
    HorizontalRule { thickness: f32 },
    Signature { record: SignatureBlockRecord, measured_height: f32 },
    Spacer { height: f32 },
}

impl LayoutBlock {
    /// The vertical space this block occupies, computed once at build time
    /// from the document's resolved font/spacing (spec §4.5 — "Block
    /// heights MUST be computed from the final font and spacing chosen by
    /// DocumentFormatter... not nominal defaults").
    pub fn height(&self) -> f32 {
        match self {
            Self::Text(t) => t.lines.len() as f32 * (t.font_size * 1.2 + t.line_gap),
            Self::Heading(h) => h.font_size * 1.2 + 4.0,
            Self::HorizontalRule { .. } => 8.0,
            Self::Signature { measured_height, .. } => *measured_height,
            Self::Spacer { height } => *height,
        }
    }

    /// A `Text` block may be split mid-paragraph across a page boundary
    /// (subject to orphan/widow control, §4.6 rule 3); every other variant
    /// is atomic.
    pub fn breakable(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub fn keep_with_next(&self) -> bool {
        matches!(self, Self::Heading(_))
    }

    /// A `Signature` block must occupy a single page in full (§4.6 rule 1).
    pub fn keep_together(&self) -> bool {
        matches!(self, Self::Signature { .. })
    }
}
