//! Per-document-type formatting rules (spec §3 "Formatting rules", §4.4).
//!
//! Generalizes the teacher's hardcoded `72.0`/`612.0`/`Times-Roman` literals
//! scattered across `adapters/pdf_writer_adapter.rs` into a data table keyed
//! by [`DocumentType`], following the same "static base table + caller
//! override merge" shape as `domain/config.rs::Configuration::merge` (kept
//! as a plain typed struct merge here rather than that module's dot-path
//! JSON merge, since the override surface is small and closed).

use crate::domain::document_type::DocumentType;
use serde::{Deserialize, Serialize};

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineSpacing {
    Single,
    OneHalf,
    Double,
}

impl LineSpacing {
    /// Points added to the base line height (spec §3).
    pub fn addition_points(&self) -> f32 {
        match self {
            Self::Single => 0.0,
            Self::OneHalf => 6.0,
            Self::Double => 12.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Font {
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
}

impl Font {
    /// The base-14 PostScript name `pdf-writer`'s `Type1Font` expects.
    pub fn base_font_name(&self) -> &'static [u8] {
        match self {
            Self::TimesRoman => b"Times-Roman",
            Self::TimesBold => b"Times-Bold",
            Self::TimesItalic => b"Times-Italic",
            Self::TimesBoldItalic => b"Times-BoldItalic",
        }
    }

    /// The PDF resource name this font is registered under (one per family
    /// actually referenced, per §4.7).
    pub fn resource_name(&self) -> &'static [u8] {
        match self {
            Self::TimesRoman => b"FTR",
            Self::TimesBold => b"FTB",
            Self::TimesItalic => b"FTI",
            Self::TimesBoldItalic => b"FTBI",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageNumberPosition {
    BottomLeft,
    BottomCenter,
    BottomRight,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsableArea {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattingRules {
    pub line_spacing: LineSpacing,
    pub font_size: f32,
    pub font: Font,
    pub margins: Margins,
    pub page_number_position: PageNumberPosition,
    pub paragraph_indent: f32,
    pub paragraph_spacing: f32,
    pub signature_line_spacing: LineSpacing,
    /// `Some(points)` when page 1 uses a different top margin than the rest
    /// of the document (spec §4.4, office-action-response at 108pt/page 1).
    pub first_page_top_margin: Option<f32>,
}

impl FormattingRules {
    pub fn section_spacing(&self) -> f32 {
        self.paragraph_spacing * 1.5
    }

    pub fn list_spacing(&self) -> f32 {
        self.paragraph_spacing * 0.5
    }

    pub fn title_spacing(&self) -> f32 {
        self.paragraph_spacing * 2.0
    }

    /// `fontSize * 1.2 + spacing-addition` (spec §4.4).
    pub fn line_height(&self, font_size: f32) -> f32 {
        font_size * 1.2 + self.line_spacing.addition_points()
    }

    fn top_margin_for(&self, page_number: u32) -> f32 {
        match (page_number, self.first_page_top_margin) {
            (1, Some(first_page_margin)) => first_page_margin,
            _ => self.margins.top,
        }
    }

    /// Page size minus the margins effective on `page_number` (spec §4.4,
    /// testable property in §8).
    pub fn usable_area_for(&self, page_number: u32) -> UsableArea {
        let top = self.top_margin_for(page_number);
        UsableArea {
            width: PAGE_WIDTH - self.margins.left - self.margins.right,
            height: PAGE_HEIGHT - top - self.margins.bottom,
        }
    }
}

/// Caller-supplied per-type rule deltas (spec §6 `formattingOverrides`).
/// Every field is optional; absent fields fall back to the base rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FormattingOverrides {
    pub line_spacing: Option<LineSpacing>,
    pub font_size: Option<f32>,
    pub font: Option<Font>,
    pub margins: Option<Margins>,
    pub page_number_position: Option<PageNumberPosition>,
    pub paragraph_indent: Option<f32>,
    pub paragraph_spacing: Option<f32>,
}

impl FormattingOverrides {
    fn apply(&self, base: FormattingRules) -> FormattingRules {
        FormattingRules {
            line_spacing: self.line_spacing.unwrap_or(base.line_spacing),
            font_size: self.font_size.unwrap_or(base.font_size),
            font: self.font.unwrap_or(base.font),
            margins: self.margins.unwrap_or(base.margins),
            page_number_position: self.page_number_position.unwrap_or(base.page_number_position),
            paragraph_indent: self.paragraph_indent.unwrap_or(base.paragraph_indent),
            paragraph_spacing: self.paragraph_spacing.unwrap_or(base.paragraph_spacing),
            ..base
        }
    }
}

/// Resolves base rules per document type and merges non-mutating caller
/// overrides (spec §9 "Singletons for formatting rules"). The base table is
/// a `const fn`-free match rather than a `once_cell::Lazy` map: it is total,
/// small (eight entries) and has no heap allocation to amortize, so a match
/// is both simpler and just as "lazily initialised" in effect.
pub struct DocumentFormatter;

impl DocumentFormatter {
    pub fn rules_for(doc_type: DocumentType, overrides: Option<&FormattingOverrides>) -> FormattingRules {
        let base = Self::base_rules(doc_type);
        match overrides {
            Some(o) => o.apply(base),
            None => base,
        }
    }

    fn base_rules(doc_type: DocumentType) -> FormattingRules {
        use DocumentType::*;
        let standard_margins = Margins { top: 72.0, bottom: 72.0, left: 72.0, right: 72.0 };

        match doc_type {
            ProvisionalPatentApplication => FormattingRules {
                line_spacing: LineSpacing::Double,
                font_size: 12.0,
                font: Font::TimesRoman,
                margins: standard_margins,
                page_number_position: PageNumberPosition::BottomCenter,
                paragraph_indent: 36.0,
                paragraph_spacing: 12.0,
                signature_line_spacing: LineSpacing::Single,
                first_page_top_margin: None,
            },
            OfficeActionResponse => FormattingRules {
                line_spacing: LineSpacing::Double,
                font_size: 12.0,
                font: Font::TimesRoman,
                margins: standard_margins,
                page_number_position: PageNumberPosition::BottomRight,
                paragraph_indent: 0.0,
                paragraph_spacing: 12.0,
                signature_line_spacing: LineSpacing::Single,
                first_page_top_margin: Some(108.0),
            },
            TrademarkApplication => FormattingRules {
                line_spacing: LineSpacing::OneHalf,
                font_size: 12.0,
                font: Font::TimesRoman,
                margins: standard_margins,
                page_number_position: PageNumberPosition::BottomCenter,
                paragraph_indent: 36.0,
                paragraph_spacing: 10.0,
                signature_line_spacing: LineSpacing::Single,
                first_page_top_margin: None,
            },
            PatentAssignmentAgreement => FormattingRules {
                line_spacing: LineSpacing::OneHalf,
                font_size: 12.0,
                font: Font::TimesRoman,
                margins: standard_margins,
                page_number_position: PageNumberPosition::BottomCenter,
                paragraph_indent: 0.0,
                paragraph_spacing: 12.0,
                signature_line_spacing: LineSpacing::Single,
                first_page_top_margin: None,
            },
            NdaIpSpecific => FormattingRules {
                line_spacing: LineSpacing::Single,
                font_size: 11.0,
                font: Font::TimesRoman,
                margins: standard_margins,
                page_number_position: PageNumberPosition::BottomCenter,
                paragraph_indent: 0.0,
                paragraph_spacing: 10.0,
                signature_line_spacing: LineSpacing::Single,
                first_page_top_margin: None,
            },
            PatentLicenseAgreement => FormattingRules {
                line_spacing: LineSpacing::OneHalf,
                font_size: 12.0,
                font: Font::TimesRoman,
                margins: standard_margins,
                page_number_position: PageNumberPosition::BottomCenter,
                paragraph_indent: 0.0,
                paragraph_spacing: 12.0,
                signature_line_spacing: LineSpacing::Single,
                first_page_top_margin: None,
            },
            TechnologyTransferAgreement => FormattingRules {
                line_spacing: LineSpacing::OneHalf,
                font_size: 12.0,
                font: Font::TimesRoman,
                margins: standard_margins,
                page_number_position: PageNumberPosition::BottomCenter,
                paragraph_indent: 0.0,
                paragraph_spacing: 12.0,
                signature_line_spacing: LineSpacing::Single,
                first_page_top_margin: None,
            },
            CeaseAndDesistLetter => FormattingRules {
                line_spacing: LineSpacing::Single,
                font_size: 12.0,
                font: Font::TimesRoman,
                margins: Margins { top: 72.0, bottom: 72.0, left: 90.0, right: 90.0 },
                page_number_position: PageNumberPosition::None,
                paragraph_indent: 0.0,
                paragraph_spacing: 10.0,
                signature_line_spacing: LineSpacing::Single,
                first_page_top_margin: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn office_action_uses_108pt_top_margin_on_page_one_only() {
        let rules = DocumentFormatter::rules_for(DocumentType::OfficeActionResponse, None);
        let page1 = rules.usable_area_for(1);
        let page2 = rules.usable_area_for(2);
        assert_eq!(page1.height, PAGE_HEIGHT - 108.0 - 72.0);
        assert_eq!(page2.height, PAGE_HEIGHT - 72.0 - 72.0);
    }

    #[test]
    fn overrides_merge_non_destructively() {
        let overrides = FormattingOverrides { font_size: Some(14.0), ..Default::default() };
        let rules = DocumentFormatter::rules_for(DocumentType::NdaIpSpecific, Some(&overrides));
        assert_eq!(rules.font_size, 14.0);
        assert_eq!(rules.line_spacing, LineSpacing::Single);
    }

    #[test]
    fn line_height_formula() {
        let rules = DocumentFormatter::rules_for(DocumentType::NdaIpSpecific, None);
        assert_eq!(rules.line_height(12.0), 12.0 * 1.2 + 0.0);
        let double_spaced = DocumentFormatter::rules_for(DocumentType::ProvisionalPatentApplication, None);
        assert_eq!(double_spaced.line_height(12.0), 12.0 * 1.2 + 12.0);
    }
}
