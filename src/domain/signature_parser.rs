//! Signature marker parsing (spec §4.3, component C3) — the most complex
//! parsing stage: detects `[SIGNATURE_BLOCK:id]` / `[INITIALS_BLOCK:id]` /
//! `[NOTARY_BLOCK:id]` markers, consumes the lines that belong to each
//! block's content, and returns the structured records plus the residual
//! document lines with all marker/block text removed.
//!
//! Grounded on the teacher's single-pass, index-tracking line scanners (e.g.
//! `utils::court_document_generator`'s paragraph wrapping loop) generalized
//! from a fixed six-form layout to an open-ended marker grammar.

use crate::domain::marker::{MarkerKind, SignatureMarker};
use crate::domain::parsed_document::{CleanLine, ParsedDocument};
use crate::domain::signature::{BlockLayout, LineType, MarkerKindRef, MarkerRef, SignatureBlockRecord, SignatureParty};
use crate::error::{Warning, WarningCode};
use once_cell::sync::Lazy;
use regex::Regex;

static MARKER_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(SIGNATURE_BLOCK|INITIALS_BLOCK|NOTARY_BLOCK):([^\]]*)\]$").unwrap());
static ROLE_LOOKALIKE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z][A-Z\s]+:?$").unwrap());
static NUMBERED_ITEM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s+[A-Z]").unwrap());
static ARTICLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ARTICLE\s+[IVX\d]+").unwrap());
static SECTION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^SECTION\s+\d+").unwrap());
static UNDERSCORE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{3,}").unwrap());
static LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(Name|Printed Name|Print Name|By|Title|Company|Date):\s*(.*)$").unwrap());
static SIDE_BY_SIDE_GAP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{5,}|\t").unwrap());
static NOTARY_STATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^State of\s+(.*)$").unwrap());
static NOTARY_COUNTY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^County of\s+(.*)$").unwrap());
static COMMISSION_EXPIRES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^My commission expires\s*:?\s*(.*)$").unwrap());
static COMMISSION_NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Commission\s*#\s*:?\s*(.*)$").unwrap());
static SEAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[seal\]|notary seal|place seal here").unwrap());

/// Party-role whitelist (spec §4.3). `PARTY A`..`PARTY Z` is a range, every
/// other entry is an exact string.
fn is_whitelisted_role(candidate: &str) -> bool {
    const EXACT: &[&str] = &[
        "ASSIGNOR",
        "ASSIGNEE",
        "LICENSOR",
        "LICENSEE",
        "DISCLOSING PARTY",
        "RECEIVING PARTY",
        "PARTY",
        "INVENTOR",
        "APPLICANT",
        "COMPANY",
        "WITNESS",
        "NOTARY PUBLIC",
    ];
    if EXACT.contains(&candidate) {
        return true;
    }
    if let Some(letter) = candidate.strip_prefix("PARTY ") {
        return letter.len() == 1 && letter.chars().all(|c| c.is_ascii_uppercase());
    }
    false
}

/// Returns `Some(role)` when `trimmed` is a whitelisted party-role header
/// (optional trailing colon stripped).
fn role_header(trimmed: &str) -> Option<String> {
    if !ROLE_LOOKALIKE_RE.is_match(trimmed) {
        return None;
    }
    let candidate = trimmed.trim_end_matches(':').trim();
    is_whitelisted_role(candidate).then(|| candidate.to_string())
}

/// True when `trimmed` matches one of the non-role-header section-break
/// patterns of spec §4.3 (a look-alike all-caps line that is *not* a
/// whitelisted role, a numbered item, an `ARTICLE`/`SECTION` heading).
fn is_section_header_break(trimmed: &str) -> bool {
    if ROLE_LOOKALIKE_RE.is_match(trimmed) {
        let candidate = trimmed.trim_end_matches(':').trim();
        return !is_whitelisted_role(candidate);
    }
    NUMBERED_ITEM_RE.is_match(trimmed) || ARTICLE_RE.is_match(trimmed) || SECTION_RE.is_match(trimmed)
}

fn longest_underscore_run(line: &str) -> Option<usize> {
    UNDERSCORE_RUN_RE.find_iter(line).map(|m| m.len()).max()
}

/// Splits a line into two side-by-side columns, either on a wide
/// whitespace gap (≥5 spaces or a tab) or, failing that, between two
/// underscore runs of length ≥3 (spec §4.3).
fn detect_side_by_side(line: &str) -> Option<(String, String)> {
    if let Some(m) = SIDE_BY_SIDE_GAP_RE.find(line) {
        let left = line[..m.start()].trim();
        let right = line[m.end()..].trim();
        if !left.is_empty() && !right.is_empty() {
            return Some((left.to_string(), right.to_string()));
        }
    }
    let runs: Vec<_> = UNDERSCORE_RUN_RE.find_iter(line).collect();
    if runs.len() >= 2 {
        let split = (runs[0].end() + runs[1].start()) / 2;
        let left = line[..split].trim();
        let right = line[split..].trim();
        if !left.is_empty() && !right.is_empty() {
            return Some((left.to_string(), right.to_string()));
        }
    }
    None
}

/// Applies one column/line of block content to `party`'s fields. Label
/// fields and notary fields are first-match-wins: a field already set is
/// never overwritten (spec §4.3, "first match wins for date").
fn apply_content(text: &str, party: &mut SignatureParty, kind: MarkerKind) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    if kind == MarkerKind::Notary {
        if let Some(caps) = NOTARY_STATE_RE.captures(trimmed) {
            if party.notary_state.is_none() {
                party.notary_state = Some(caps[1].trim().to_string());
            }
            return;
        }
        if let Some(caps) = NOTARY_COUNTY_RE.captures(trimmed) {
            if party.notary_county.is_none() {
                party.notary_county = Some(caps[1].trim().to_string());
            }
            return;
        }
        if let Some(caps) = COMMISSION_EXPIRES_RE.captures(trimmed) {
            if party.commission_expires.is_none() {
                party.commission_expires = Some(caps[1].trim().to_string());
            }
            return;
        }
        if let Some(caps) = COMMISSION_NUMBER_RE.captures(trimmed) {
            if party.commission_number.is_none() {
                party.commission_number = Some(caps[1].trim().to_string());
            }
            return;
        }
        if SEAL_RE.is_match(trimmed) {
            return;
        }
    }
    if let Some(caps) = LABEL_RE.captures(trimmed) {
        let value = caps[2].trim().to_string();
        match &caps[1] {
            "Name" | "Printed Name" | "Print Name" | "By" => {
                if party.name.is_none() {
                    party.name = Some(value);
                }
            }
            "Title" => {
                if party.title.is_none() {
                    party.title = Some(value);
                }
            }
            "Company" => {
                if party.company.is_none() {
                    party.company = Some(value);
                }
            }
            "Date" => {
                if party.date.is_none() {
                    party.date = Some(value);
                }
            }
            _ => {}
        }
        return;
    }
    if let Some(run_len) = longest_underscore_run(trimmed) {
        if run_len >= 10 {
            party.line_type = Some(LineType::Signature);
        } else if (3..=8).contains(&run_len) && kind == MarkerKind::Initial {
            party.line_type = Some(LineType::Initial);
        }
    }
}

enum Mode {
    Single,
    SideBySide { left: usize, right: usize },
}

struct BlockScan {
    parties: Vec<SignatureParty>,
    mode: Mode,
    current: Option<usize>,
}

impl BlockScan {
    fn new() -> Self {
        Self { parties: Vec::new(), mode: Mode::Single, current: None }
    }

    fn ensure_single(&mut self) -> usize {
        if let Some(idx) = self.current {
            return idx;
        }
        self.parties.push(SignatureParty::default());
        let idx = self.parties.len() - 1;
        self.current = Some(idx);
        idx
    }

    fn start_party(&mut self, role: String) -> usize {
        self.parties.push(SignatureParty { role: Some(role), ..Default::default() });
        let idx = self.parties.len() - 1;
        self.current = Some(idx);
        idx
    }

    fn ensure_side(&mut self, left: bool) -> usize {
        if let Mode::SideBySide { left: l, right: r } = self.mode {
            return if left { l } else { r };
        }
        let l = self.parties.len();
        self.parties.push(SignatureParty::default());
        let r = self.parties.len();
        self.parties.push(SignatureParty::default());
        self.mode = Mode::SideBySide { left: l, right: r };
        if left {
            l
        } else {
            r
        }
    }

    fn handle_line(&mut self, trimmed: &str, kind: MarkerKind) {
        if let Some((left_text, right_text)) = detect_side_by_side(trimmed) {
            let left_idx = self.ensure_side(true);
            let right_idx = self.ensure_side(false);
            Self::handle_column(&mut self.parties, left_idx, &left_text, kind);
            Self::handle_column(&mut self.parties, right_idx, &right_text, kind);
            return;
        }
        match self.mode {
            Mode::Single => {
                if let Some(role) = role_header(trimmed) {
                    self.start_party(role);
                } else {
                    let idx = self.ensure_single();
                    apply_content(trimmed, &mut self.parties[idx], kind);
                }
            }
            Mode::SideBySide { .. } => {
                // A non-split line inside an already side-by-side block carries
                // no reliable column assignment; it is consumed but ignored.
            }
        }
    }

    fn handle_column(parties: &mut [SignatureParty], idx: usize, text: &str, kind: MarkerKind) {
        if let Some(role) = role_header(text.trim()) {
            if parties[idx].role.is_none() {
                parties[idx].role = Some(role);
            }
        } else {
            apply_content(text, &mut parties[idx], kind);
        }
    }

    fn layout(&self) -> BlockLayout {
        match self.mode {
            Mode::Single => BlockLayout::Single,
            Mode::SideBySide { .. } => BlockLayout::SideBySide,
        }
    }
}

pub struct SignatureMarkerParser;

impl SignatureMarkerParser {
    /// Parses the whole document. Returns the clean residual lines plus
    /// structured signature-block records, and any warnings accumulated
    /// along the way (invalid IDs, empty blocks).
    pub fn parse(lines: &[&str]) -> (ParsedDocument, Vec<Warning>) {
        let mut clean_lines = Vec::new();
        let mut signature_blocks = Vec::new();
        let mut warnings = Vec::new();
        let mut i = 0usize;

        while i < lines.len() {
            let line = lines[i];
            let trimmed = line.trim();
            if let Some(caps) = MARKER_LINE_RE.captures(trimmed) {
                let kind = match &caps[1] {
                    "SIGNATURE_BLOCK" => MarkerKind::Signature,
                    "INITIALS_BLOCK" => MarkerKind::Initial,
                    _ => MarkerKind::Notary,
                };
                let id = caps[2].to_string();
                if !SignatureMarker::is_valid_id(&id) {
                    warnings.push(Warning::new(
                        WarningCode::InvalidMarkerId,
                        format!("marker id '{id}' does not match the kebab-case id pattern"),
                        line.to_string(),
                    ));
                    clean_lines.push(CleanLine { original_index: i, text: line.to_string() });
                    i += 1;
                    continue;
                }
                let (record, consumed, block_warnings) = Self::parse_block(lines, i, i + 1, kind, &id);
                signature_blocks.push(record);
                warnings.extend(block_warnings);
                i = consumed;
                continue;
            }
            clean_lines.push(CleanLine { original_index: i, text: line.to_string() });
            i += 1;
        }

        (ParsedDocument { clean_lines, signature_blocks }, warnings)
    }

    /// Scans the content of one block starting at `start`. Returns the
    /// built record, the index just past the last consumed line, and any
    /// warnings (currently only `EMPTY_SIGNATURE_BLOCK`).
    fn parse_block(
        lines: &[&str],
        marker_line: usize,
        start: usize,
        kind: MarkerKind,
        id: &str,
    ) -> (SignatureBlockRecord, usize, Vec<Warning>) {
        let mut scan = BlockScan::new();
        let mut seen_content = false;
        let mut blank_run = 0u32;
        let mut j = start;

        while j < lines.len() {
            let trimmed = lines[j].trim();
            if trimmed.is_empty() {
                blank_run += 1;
                if blank_run >= 2 && seen_content {
                    break;
                }
                j += 1;
                continue;
            }
            blank_run = 0;
            if MARKER_LINE_RE.is_match(trimmed) {
                break;
            }
            if detect_side_by_side(trimmed).is_some() || role_header(trimmed).is_some() {
                scan.handle_line(trimmed, kind);
                seen_content = true;
                j += 1;
                continue;
            }
            if is_section_header_break(trimmed) {
                break;
            }
            scan.handle_line(trimmed, kind);
            seen_content = true;
            j += 1;
        }

        let mut warnings = Vec::new();
        if scan.parties.is_empty() {
            warnings.push(Warning::new(
                WarningCode::EmptySignatureBlock,
                format!("signature block '{id}' contains no recognizable party content"),
                id.to_string(),
            ));
        }

        let record = SignatureBlockRecord {
            marker: MarkerRef { id: id.to_string(), kind: MarkerKindRef::from(kind) },
            layout: scan.layout(),
            parties: scan.parties,
            notary_required: kind == MarkerKind::Notary,
            group_key: SignatureMarker::group_key(id),
            source_line: marker_line,
        };
        (record, j, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<&str> {
        text.lines().collect()
    }

    #[test]
    fn minimal_nda_single_party() {
        let text = "[SIGNATURE_BLOCK:party-a-signature]\nPARTY A:\n__________\nName: A\nDate: 2024-01-01";
        let (doc, warnings) = SignatureMarkerParser::parse(&lines(text));
        assert!(warnings.is_empty());
        assert_eq!(doc.signature_blocks.len(), 1);
        let block = &doc.signature_blocks[0];
        assert_eq!(block.layout, BlockLayout::Single);
        assert_eq!(block.parties.len(), 1);
        assert_eq!(block.parties[0].role.as_deref(), Some("PARTY A"));
        assert_eq!(block.parties[0].line_type, Some(LineType::Signature));
        assert_eq!(block.parties[0].name.as_deref(), Some("A"));
        assert_eq!(block.parties[0].date.as_deref(), Some("2024-01-01"));
    }

    #[test]
    fn side_by_side_detects_two_parties() {
        let text = "[SIGNATURE_BLOCK:assignor-assignee]\nASSIGNOR                              ASSIGNEE\n__________                              __________\nName: Alpha Corp                    Name: Beta Inc\nDate: 2024-02-02                    Date: 2024-02-02";
        let (doc, warnings) = SignatureMarkerParser::parse(&lines(text));
        assert!(warnings.is_empty());
        let block = &doc.signature_blocks[0];
        assert_eq!(block.layout, BlockLayout::SideBySide);
        assert_eq!(block.parties.len(), 2);
        assert_eq!(block.parties[0].role.as_deref(), Some("ASSIGNOR"));
        assert_eq!(block.parties[1].role.as_deref(), Some("ASSIGNEE"));
        assert!(block.upholds_layout_invariant());
    }

    #[test]
    fn invalid_marker_id_becomes_literal_text_with_warning() {
        let text = "Intro line.\n[SIGNATURE_BLOCK:1-bad-id]\nPARTY A:\n__________";
        let (doc, warnings) = SignatureMarkerParser::parse(&lines(text));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, WarningCode::InvalidMarkerId);
        assert!(doc.signature_blocks.is_empty());
        assert!(doc.clean_lines.iter().any(|l| l.text == "[SIGNATURE_BLOCK:1-bad-id]"));
        // the rest of the document is parsed as ordinary prose, not a block.
        assert!(doc.clean_lines.iter().any(|l| l.text == "PARTY A:"));
    }

    #[test]
    fn witness_is_a_party_role_not_a_section_break() {
        let text = "[SIGNATURE_BLOCK:witness-block]\nWITNESS\n__________\nName: W";
        let (doc, _) = SignatureMarkerParser::parse(&lines(text));
        let block = &doc.signature_blocks[0];
        assert_eq!(block.parties.len(), 1);
        assert_eq!(block.parties[0].role.as_deref(), Some("WITNESS"));
        assert_eq!(block.parties[0].name.as_deref(), Some("W"));
    }

    #[test]
    fn two_consecutive_blank_lines_terminate_a_single_blank_does_not() {
        let text = "[SIGNATURE_BLOCK:party-a]\nPARTY A:\n__________\n\nName: A\n\n\nAfter block.";
        let (doc, _) = SignatureMarkerParser::parse(&lines(text));
        let block = &doc.signature_blocks[0];
        // the single blank line did not terminate the block, so Name: A was consumed.
        assert_eq!(block.parties[0].name.as_deref(), Some("A"));
        assert!(doc.clean_lines.iter().any(|l| l.text == "After block."));
    }

    #[test]
    fn unterminated_block_closes_at_end_of_document() {
        let text = "[SIGNATURE_BLOCK:party-a]\nPARTY A:\n__________\nName: A";
        let (doc, warnings) = SignatureMarkerParser::parse(&lines(text));
        assert!(warnings.is_empty());
        assert_eq!(doc.signature_blocks.len(), 1);
        assert_eq!(doc.signature_blocks[0].parties[0].name.as_deref(), Some("A"));
    }

    #[test]
    fn empty_block_warns_and_has_zero_parties() {
        let text = "[SIGNATURE_BLOCK:empty-one]\n[SIGNATURE_BLOCK:party-a]\nPARTY A:\n__________";
        let (doc, warnings) = SignatureMarkerParser::parse(&lines(text));
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, WarningCode::EmptySignatureBlock);
        assert_eq!(doc.signature_blocks.len(), 2);
        assert!(doc.signature_blocks[0].parties.is_empty());
        assert_eq!(doc.signature_blocks[1].parties.len(), 1);
    }

    #[test]
    fn notary_block_captures_jurisdiction_and_commission_fields() {
        let text = "[NOTARY_BLOCK:notary-1]\nNOTARY PUBLIC\n__________\nState of California\nCounty of Santa Clara\nMy commission expires: 2030-01-01\nCommission #: 12345\n[SEAL]";
        let (doc, warnings) = SignatureMarkerParser::parse(&lines(text));
        assert!(warnings.is_empty());
        let block = &doc.signature_blocks[0];
        assert!(block.notary_required);
        let party = &block.parties[0];
        assert_eq!(party.role.as_deref(), Some("NOTARY PUBLIC"));
        assert_eq!(party.notary_state.as_deref(), Some("California"));
        assert_eq!(party.notary_county.as_deref(), Some("Santa Clara"));
        assert_eq!(party.commission_expires.as_deref(), Some("2030-01-01"));
        assert_eq!(party.commission_number.as_deref(), Some("12345"));
        assert!(block.upholds_notary_invariant());
    }

    #[test]
    fn article_heading_terminates_block() {
        let text = "[SIGNATURE_BLOCK:party-a]\nPARTY A:\n__________\nARTICLE II\nNext section text.";
        let (doc, _) = SignatureMarkerParser::parse(&lines(text));
        assert!(doc.clean_lines.iter().any(|l| l.text == "ARTICLE II"));
        assert!(doc.clean_lines.iter().any(|l| l.text == "Next section text."));
    }
}
