//! Markdown line recognizer (spec §4.2, component C2).
//!
//! Recognizes exactly the documented subset: ATX headings (`#`..`######`),
//! horizontal rules, and prose, plus segment-level bold/italic delimiters
//! that are stripped rather than rendered (spec §4.2's documented Open
//! Question — this crate picks "strip" as the v1 behavior and records that
//! choice in `DESIGN.md`). Pure and restartable over a line iterator, the
//! same statelessness the teacher's domain logic favors (e.g.
//! `domain::deadline_calc::ServiceMethod::additional_days`).

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})[ \t]+(\S.*)$").unwrap());
static RULE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ \t]*([-_*])(?:[ \t]*\1){2,}[ \t]*$").unwrap());
static EMPHASIS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\*{1,3}|_{1,3})(\S(?:.*?\S)?)\1").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub enum RecognizedLine {
    Heading { level: u8, text: String },
    HorizontalRule,
    Prose(String),
}

pub struct MarkdownRecognizer;

impl MarkdownRecognizer {
    /// Classifies a single line. `#`-`######` followed by whitespace and
    /// non-empty text is a heading; a line of ≥3 `-`, `_`, or `*` (optional
    /// surrounding whitespace) is a horizontal rule; everything else is
    /// prose with inline emphasis delimiters stripped.
    pub fn recognize(line: &str) -> RecognizedLine {
        if let Some(caps) = HEADING_RE.captures(line) {
            let level = caps[1].len() as u8;
            return RecognizedLine::Heading { level, text: caps[2].trim_end().to_string() };
        }
        if RULE_RE.is_match(line) {
            return RecognizedLine::HorizontalRule;
        }
        RecognizedLine::Prose(Self::strip_emphasis(line))
    }

    /// Strips balanced `*`/`_` emphasis delimiters around non-whitespace
    /// runs rather than rendering bold/italic (spec §4.2 permits either;
    /// this crate strips, since the writer only emits plain text runs with
    /// one font/weight per run and the layout engine has no notion of
    /// mixed-weight text within a single line).
    fn strip_emphasis(line: &str) -> String {
        EMPHASIS_RE.replace_all(line, "$2").into_owned()
    }

    /// Font size policy: H1=16, H2=14, H3=12, H4-H6=12 (spec §4.2).
    pub fn heading_font_size(level: u8) -> f32 {
        match level {
            1 => 16.0,
            2 => 14.0,
            _ => 12.0,
        }
    }

    /// Bold policy: H1-H3 bold, H4-H6 normal (spec §4.2).
    pub fn heading_bold(level: u8) -> bool {
        level <= 3
    }
}
