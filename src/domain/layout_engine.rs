//! Paginates an ordered block stream (spec §4.6, component C6): the
//! highest-share component, since it is where keep-together, keep-with-next,
//! orphan/widow, group-together, and forced-placement interact.
//!
//! The engine is single-threaded and deterministic — identical inputs
//! always produce identical page assignments, a property exercised by
//! `tests/pipeline.rs`'s round-trip scenarios.

use crate::domain::formatting::FormattingRules;
use crate::domain::layout_block::{LayoutBlock, TextBlock};
use crate::domain::page::Page;
use crate::error::{PipelineError, Warning, WarningCode};
use std::collections::VecDeque;

pub const DEFAULT_ORPHAN_WIDOW: usize = 2;

pub struct LayoutEngine;

impl LayoutEngine {
    /// Lays out `blocks` onto pages sized by `rules`. `orphan_widow` is the
    /// minimum number of text lines that must remain on either side of a
    /// page break inside a `Text` block (spec default 2). `strict` promotes
    /// a forced-placement of an oversized signature block from a warning
    /// into a fatal `SIGNATURE_BLOCK_OVERSIZED` error.
    pub fn layout(
        blocks: Vec<LayoutBlock>,
        rules: &FormattingRules,
        orphan_widow: usize,
        strict: bool,
    ) -> Result<(Vec<Page>, Vec<Warning>), PipelineError> {
        let mut pages = vec![Page::new(1, rules.usable_area_for(1))];
        let mut warnings = Vec::new();
        let mut pending: VecDeque<LayoutBlock> = blocks.into();

        while let Some(block) = pending.pop_front() {
            match block {
                LayoutBlock::Signature { record, measured_height } => {
                    let mut group = vec![(record, measured_height)];
                    while let Some(LayoutBlock::Signature { .. }) = pending.front() {
                        let same_group = matches!(
                            pending.front(),
                            Some(LayoutBlock::Signature { record: r, .. }) if r.group_key == group[0].0.group_key
                        );
                        if !same_group {
                            break;
                        }
                        if let Some(LayoutBlock::Signature { record, measured_height }) = pending.pop_front() {
                            group.push((record, measured_height));
                        }
                    }
                    Self::place_signature_group(&mut pages, rules, group, strict, &mut warnings)?;
                }
                LayoutBlock::Heading(heading) => {
                    let block = LayoutBlock::Heading(heading);
                    let fits_with_next = {
                        let current = pages.last().unwrap();
                        let remaining_after = current.remaining_height() - block.height();
                        Self::heading_fits_with_next(remaining_after, pending.front())
                    };
                    let current_fits = pages.last().unwrap().remaining_height() >= block.height();
                    if current_fits && fits_with_next {
                        pages.last_mut().unwrap().blocks.push(block);
                    } else {
                        Self::open_new_page(&mut pages, rules);
                        pages.last_mut().unwrap().blocks.push(block);
                    }
                }
                LayoutBlock::Text(text) => {
                    Self::place_text(&mut pages, rules, text, orphan_widow, &mut pending);
                }
                LayoutBlock::HorizontalRule { .. } | LayoutBlock::Spacer { .. } => {
                    let height = block.height();
                    if pages.last().unwrap().remaining_height() < height {
                        Self::open_new_page(&mut pages, rules);
                    }
                    pages.last_mut().unwrap().blocks.push(block);
                }
            }
        }

        Ok((pages, warnings))
    }

    fn heading_fits_with_next(remaining_after_heading: f32, next: Option<&LayoutBlock>) -> bool {
        match next {
            None => true,
            Some(LayoutBlock::Text(t)) => {
                let per_line = t.font_size * 1.2 + t.line_gap;
                remaining_after_heading >= per_line * DEFAULT_ORPHAN_WIDOW as f32
            }
            Some(other) => remaining_after_heading >= other.height(),
        }
    }

    /// Opens a new page after the current one, unless the current page is
    /// still empty (in which case there is nothing to close).
    fn open_new_page(pages: &mut Vec<Page>, rules: &FormattingRules) {
        if pages.last().map(|p| p.blocks.is_empty()).unwrap_or(false) {
            return;
        }
        let next_number = pages.last().map(|p| p.number).unwrap_or(0) + 1;
        pages.push(Page::new(next_number, rules.usable_area_for(next_number)));
    }

    fn place_signature_group(
        pages: &mut Vec<Page>,
        rules: &FormattingRules,
        group: Vec<(crate::domain::signature::SignatureBlockRecord, f32)>,
        strict: bool,
        warnings: &mut Vec<Warning>,
    ) -> Result<(), PipelineError> {
        if group.len() == 1 {
            let (record, height) = group.into_iter().next().unwrap();
            return Self::place_single_signature(pages, rules, record, height, strict, warnings);
        }

        let total: f32 = group.iter().map(|(_, h)| h).sum();
        let remaining = pages.last().unwrap().remaining_height();
        if total <= remaining {
            for (record, height) in group {
                pages.last_mut().unwrap().blocks.push(LayoutBlock::Signature { record, measured_height: height });
            }
            return Ok(());
        }

        let next_number = pages.last().map(|p| p.number).unwrap_or(0) + 1;
        let empty_page_height = rules.usable_area_for(next_number).height;
        if total <= empty_page_height {
            Self::open_new_page(pages, rules);
            for (record, height) in group {
                pages.last_mut().unwrap().blocks.push(LayoutBlock::Signature { record, measured_height: height });
            }
            return Ok(());
        }

        // The group does not fit together even on an empty page; fall back
        // to placing each block independently (spec §4.6 rule 4).
        for (record, height) in group {
            Self::place_single_signature(pages, rules, record, height, strict, warnings)?;
        }
        Ok(())
    }

    fn place_single_signature(
        pages: &mut Vec<Page>,
        rules: &FormattingRules,
        record: crate::domain::signature::SignatureBlockRecord,
        height: f32,
        strict: bool,
        warnings: &mut Vec<Warning>,
    ) -> Result<(), PipelineError> {
        let remaining = pages.last().unwrap().remaining_height();
        if height <= remaining {
            pages.last_mut().unwrap().blocks.push(LayoutBlock::Signature { record, measured_height: height });
            return Ok(());
        }

        Self::open_new_page(pages, rules);
        let remaining_on_new_page = pages.last().unwrap().remaining_height();
        if height <= remaining_on_new_page {
            pages.last_mut().unwrap().blocks.push(LayoutBlock::Signature { record, measured_height: height });
            return Ok(());
        }

        if strict {
            return Err(PipelineError::SignatureBlockOversized { group_key: record.group_key });
        }
        warnings.push(Warning::new(
            WarningCode::ForcedPlacement,
            format!("signature block '{}' exceeds the usable area of an empty page", record.marker.id),
            record.group_key.clone(),
        ));
        pages.last_mut().unwrap().blocks.push(LayoutBlock::Signature { record, measured_height: height });
        Ok(())
    }

    /// Places a `Text` block, splitting it across a page boundary subject
    /// to orphan/widow control (spec §4.6 rule 3 and 5).
    fn place_text(
        pages: &mut Vec<Page>,
        rules: &FormattingRules,
        block: TextBlock,
        orphan_widow: usize,
        pending: &mut VecDeque<LayoutBlock>,
    ) {
        let per_line = block.font_size * 1.2 + block.line_gap;
        let total_lines = block.lines.len();
        let full_height = total_lines as f32 * per_line;
        let remaining = pages.last().unwrap().remaining_height();

        if full_height <= remaining {
            pages.last_mut().unwrap().blocks.push(LayoutBlock::Text(block));
            return;
        }

        let mut max_lines_fit = (remaining / per_line).floor() as usize;
        if max_lines_fit < orphan_widow || total_lines <= orphan_widow {
            // Can't leave `orphan_widow` lines on the current page; move the
            // whole block to a fresh page instead of splitting it.
            Self::open_new_page(pages, rules);
            pending.push_front(LayoutBlock::Text(block));
            return;
        }

        let remaining_lines_after = total_lines - max_lines_fit;
        if remaining_lines_after > 0 && remaining_lines_after < orphan_widow {
            let reduce = orphan_widow - remaining_lines_after;
            max_lines_fit = max_lines_fit.saturating_sub(reduce);
        }
        if max_lines_fit < orphan_widow {
            Self::open_new_page(pages, rules);
            pending.push_front(LayoutBlock::Text(block));
            return;
        }

        let font_size = block.font_size;
        let font = block.font;
        let line_gap = block.line_gap;
        let indent = block.indent;
        let mut lines = block.lines;
        let rest = lines.split_off(max_lines_fit);

        pages.last_mut().unwrap().blocks.push(LayoutBlock::Text(TextBlock { lines, font_size, font, line_gap, indent }));
        Self::open_new_page(pages, rules);
        pending.push_front(LayoutBlock::Text(TextBlock { lines: rest, font_size, font, line_gap, indent }));
    }
}
