//! Signature marker syntax (spec §3 "Signature marker", §6 "Marker syntax").

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static MARKER_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z][a-z0-9]*(-[a-z0-9]+)*$").expect("marker id pattern is valid"));

/// Recognized marker kinds, one per bracketed tag in spec §6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerKind {
    Signature,
    Initial,
    Notary,
}

impl MarkerKind {
    /// The bracketed tag name this marker starts with, e.g. `SIGNATURE_BLOCK`.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Signature => "SIGNATURE_BLOCK",
            Self::Initial => "INITIALS_BLOCK",
            Self::Notary => "NOTARY_BLOCK",
        }
    }
}

/// A recognized `[TAG:id]` marker and the line range of its trailing
/// content block (set once the end-of-block scan completes).
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureMarker {
    pub kind: MarkerKind,
    pub id: String,
    pub start: usize,
    pub end: usize,
}

impl SignatureMarker {
    /// True when `id` matches `^[a-z][a-z0-9]*(-[a-z0-9]+)*$` (spec §3).
    pub fn is_valid_id(id: &str) -> bool {
        MARKER_ID_RE.is_match(id)
    }

    /// First token of the id, used as the group key for §4.6 rule 4
    /// ("Group-together"). `assignor-assignee-1` groups with
    /// `assignor-assignee-2` under key `assignor`.
    pub fn group_key(id: &str) -> String {
        id.split('-').next().unwrap_or(id).to_string()
    }

    /// The trailing `-<digits>` position ordinal, if present (spec §6).
    pub fn position_ordinal(id: &str) -> Option<u64> {
        let last = id.rsplit('-').next()?;
        last.parse::<u64>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_kebab_case_ids() {
        assert!(SignatureMarker::is_valid_id("party-a-signature"));
        assert!(SignatureMarker::is_valid_id("a"));
        assert!(SignatureMarker::is_valid_id("assignor-assignee-2"));
    }

    #[test]
    fn rejects_uppercase_and_leading_digit() {
        assert!(!SignatureMarker::is_valid_id("ABC"));
        assert!(!SignatureMarker::is_valid_id("1-bad-id"));
        assert!(!SignatureMarker::is_valid_id("-leading-dash"));
        assert!(!SignatureMarker::is_valid_id(""));
    }

    #[test]
    fn group_key_is_first_token() {
        assert_eq!(SignatureMarker::group_key("assignor-assignee-2"), "assignor");
        assert_eq!(SignatureMarker::group_key("party-a-signature"), "party");
    }

    #[test]
    fn position_ordinal_reads_trailing_digits() {
        assert_eq!(SignatureMarker::position_ordinal("witness-block-3"), Some(3));
        assert_eq!(SignatureMarker::position_ordinal("witness-block"), None);
    }
}
