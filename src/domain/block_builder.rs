//! Transforms a parsed document into an ordered sequence of typed layout
//! blocks (spec §4.5, component C5). Text runs are grouped paragraph by
//! paragraph, headings and rules become atomic single-line blocks, and
//! every signature-block record becomes a `Signature` block whose height
//! is computed deterministically from the parties it carries.

use crate::domain::formatting::FormattingRules;
use crate::domain::layout_block::{HeadingBlock, LayoutBlock, TextBlock};
use crate::domain::markdown::{MarkdownRecognizer, RecognizedLine};
use crate::domain::parsed_document::ParsedDocument;
use crate::domain::signature::{BlockLayout, SignatureBlockRecord};

const SIGNATURE_LINE_SLOT: f32 = 30.0;
const FIELD_LINE_HEIGHT: f32 = 20.0;
const INTER_PARTY_PADDING: f32 = 20.0;
const NOTARY_ACKNOWLEDGEMENT_HEIGHT: f32 = 4.0 * FIELD_LINE_HEIGHT;
const NOTARY_SIGNATURE_SLOT: f32 = 30.0;
const NOTARY_COMMISSION_HEIGHT: f32 = 2.0 * FIELD_LINE_HEIGHT;
const NOTARY_SEAL_HEIGHT: f32 = 20.0;

pub struct BlockBuilder;

/// A document item in original-line order: either a surviving clean line
/// or a signature block anchored at its marker's source line, merged by
/// `source_line` so the builder walks the document exactly as written.
enum Item<'a> {
    Line(&'a str),
    Signature(&'a SignatureBlockRecord),
}

impl BlockBuilder {
    pub fn build(parsed: &ParsedDocument, rules: &FormattingRules) -> Vec<LayoutBlock> {
        let items = Self::merge_in_order(parsed);
        let mut blocks = Vec::new();
        let mut paragraph: Vec<String> = Vec::new();

        let flush = |paragraph: &mut Vec<String>, blocks: &mut Vec<LayoutBlock>| {
            if paragraph.is_empty() {
                return;
            }
            blocks.push(LayoutBlock::Text(TextBlock {
                lines: std::mem::take(paragraph),
                font_size: rules.font_size,
                font: rules.font,
                line_gap: rules.line_spacing.addition_points(),
                indent: rules.paragraph_indent,
            }));
            blocks.push(LayoutBlock::Spacer { height: rules.paragraph_spacing });
        };

        for item in items {
            match item {
                Item::Line(line) => {
                    if line.trim().is_empty() {
                        flush(&mut paragraph, &mut blocks);
                        continue;
                    }
                    match MarkdownRecognizer::recognize(line) {
                        RecognizedLine::Heading { level, text } => {
                            flush(&mut paragraph, &mut blocks);
                            blocks.push(LayoutBlock::Heading(HeadingBlock {
                                level,
                                text,
                                font_size: MarkdownRecognizer::heading_font_size(level),
                                bold: MarkdownRecognizer::heading_bold(level),
                            }));
                        }
                        RecognizedLine::HorizontalRule => {
                            flush(&mut paragraph, &mut blocks);
                            blocks.push(LayoutBlock::HorizontalRule { thickness: 0.75 });
                        }
                        RecognizedLine::Prose(text) => paragraph.push(text),
                    }
                }
                Item::Signature(record) => {
                    flush(&mut paragraph, &mut blocks);
                    let measured_height = Self::measure_signature_block(record);
                    blocks.push(LayoutBlock::Signature { record: record.clone(), measured_height });
                }
            }
        }
        flush(&mut paragraph, &mut blocks);
        blocks
    }

    /// Restores document order across `clean_lines` (already ordered by
    /// `original_index`) and `signature_blocks` (ordered by `source_line`),
    /// since both sequences were produced independently by the marker
    /// parser.
    fn merge_in_order(parsed: &ParsedDocument) -> Vec<Item<'_>> {
        let mut items = Vec::with_capacity(parsed.clean_lines.len() + parsed.signature_blocks.len());
        let mut line_iter = parsed.clean_lines.iter().peekable();
        let mut block_iter = parsed.signature_blocks.iter().peekable();

        loop {
            match (line_iter.peek(), block_iter.peek()) {
                (Some(line), Some(block)) => {
                    if line.original_index < block.source_line {
                        items.push(Item::Line(&line_iter.next().unwrap().text));
                    } else {
                        items.push(Item::Signature(block_iter.next().unwrap()));
                    }
                }
                (Some(_), None) => items.push(Item::Line(&line_iter.next().unwrap().text)),
                (None, Some(_)) => items.push(Item::Signature(block_iter.next().unwrap())),
                (None, None) => break,
            }
        }
        items
    }

    /// Deterministic signature-block height formula (spec §4.5).
    fn measure_signature_block(record: &SignatureBlockRecord) -> f32 {
        let column_height = |skip: usize, take: usize| -> f32 {
            record
                .parties
                .iter()
                .skip(skip)
                .take(take)
                .map(Self::party_height)
                .sum::<f32>()
        };
        let base = match record.layout {
            BlockLayout::Single => column_height(0, record.parties.len()),
            BlockLayout::SideBySide => {
                let left = column_height(0, 1);
                let right = column_height(1, 1);
                left.max(right)
            }
        };
        let notary_addition = if record.notary_required {
            NOTARY_ACKNOWLEDGEMENT_HEIGHT + NOTARY_SIGNATURE_SLOT + NOTARY_COMMISSION_HEIGHT + NOTARY_SEAL_HEIGHT
        } else {
            0.0
        };
        base.max(SIGNATURE_LINE_SLOT) + notary_addition
    }

    fn party_height(party: &crate::domain::signature::SignatureParty) -> f32 {
        let mut height = SIGNATURE_LINE_SLOT + INTER_PARTY_PADDING;
        if party.name.is_some() {
            height += FIELD_LINE_HEIGHT;
        }
        if party.title.is_some() {
            height += FIELD_LINE_HEIGHT;
        }
        if party.company.is_some() {
            height += FIELD_LINE_HEIGHT;
        }
        if party.date.is_some() {
            height += FIELD_LINE_HEIGHT;
        }
        height
    }
}
