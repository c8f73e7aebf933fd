//! Signature party and block records (spec §3 "Signature party"/"Signature
//! block record").

use crate::domain::marker::SignatureMarker;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineType {
    Signature,
    Initial,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignatureParty {
    pub role: Option<String>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub company: Option<String>,
    pub date: Option<String>,
    pub line_type: Option<LineType>,
    pub notary_state: Option<String>,
    pub notary_county: Option<String>,
    pub commission_expires: Option<String>,
    pub commission_number: Option<String>,
}

impl SignatureParty {
    /// Invariant: at least one of `role`/`lineType` must be populated
    /// (spec §3). An empty party (no role, no line drawn at all) is only
    /// ever produced as the placeholder for an empty signature block.
    pub fn is_populated(&self) -> bool {
        self.role.is_some() || self.line_type.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockLayout {
    Single,
    SideBySide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureBlockRecord {
    pub marker: MarkerRef,
    pub layout: BlockLayout,
    pub parties: Vec<SignatureParty>,
    pub notary_required: bool,
    pub group_key: String,
    /// Original 0-based line index of the `[..._BLOCK:id]` marker itself,
    /// used by the block builder to interleave signature blocks back into
    /// document order alongside the surviving clean lines.
    pub source_line: usize,
}

/// A lightweight, `Serialize`-able stand-in for [`SignatureMarker`] (which
/// carries no `Serialize` impl since its line-range fields are parse-time
/// bookkeeping, not part of the public record shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRef {
    pub id: String,
    pub kind: MarkerKindRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKindRef {
    Signature,
    Initial,
    Notary,
}

impl From<crate::domain::marker::MarkerKind> for MarkerKindRef {
    fn from(k: crate::domain::marker::MarkerKind) -> Self {
        use crate::domain::marker::MarkerKind as K;
        match k {
            K::Signature => Self::Signature,
            K::Initial => Self::Initial,
            K::Notary => Self::Notary,
        }
    }
}

impl SignatureBlockRecord {
    /// Invariant check used by the parser and by tests: side-by-side layout
    /// has exactly two parties; notary blocks carry `notaryRequired = true`
    /// and exactly one party with role `"NOTARY PUBLIC"` (spec §3).
    pub fn upholds_layout_invariant(&self) -> bool {
        match self.layout {
            BlockLayout::SideBySide => self.parties.len() == 2,
            BlockLayout::Single => true,
        }
    }

    pub fn upholds_notary_invariant(&self) -> bool {
        if !self.notary_required {
            return true;
        }
        self.parties
            .iter()
            .filter(|p| p.role.as_deref() == Some("NOTARY PUBLIC"))
            .count()
            == 1
    }
}
