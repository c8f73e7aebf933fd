//! The closed set of document types this engine knows how to format.
//!
//! Generalizes the teacher's `domain::document::DocumentType` (six fixed
//! federal-court forms, one render method each) into the eight
//! general-purpose legal-document identifiers of spec §3. Any other value
//! reaching `DocumentType::parse` is a fatal `INVALID_DOCUMENT_TYPE` input
//! error (§6), never a warning.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    ProvisionalPatentApplication,
    OfficeActionResponse,
    TrademarkApplication,
    PatentAssignmentAgreement,
    NdaIpSpecific,
    PatentLicenseAgreement,
    TechnologyTransferAgreement,
    CeaseAndDesistLetter,
}

impl DocumentType {
    pub const ALL: [DocumentType; 8] = [
        Self::ProvisionalPatentApplication,
        Self::OfficeActionResponse,
        Self::TrademarkApplication,
        Self::PatentAssignmentAgreement,
        Self::NdaIpSpecific,
        Self::PatentLicenseAgreement,
        Self::TechnologyTransferAgreement,
        Self::CeaseAndDesistLetter,
    ];

    /// Parses the wire identifier (e.g. `"nda-ip-specific"`). Any value
    /// outside the closed set is a fatal input error, never ignored.
    pub fn parse(value: &str) -> Result<Self, PipelineError> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == value)
            .ok_or_else(|| PipelineError::InvalidDocumentType(value.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProvisionalPatentApplication => "provisional-patent-application",
            Self::OfficeActionResponse => "office-action-response",
            Self::TrademarkApplication => "trademark-application",
            Self::PatentAssignmentAgreement => "patent-assignment-agreement",
            Self::NdaIpSpecific => "nda-ip-specific",
            Self::PatentLicenseAgreement => "patent-license-agreement",
            Self::TechnologyTransferAgreement => "technology-transfer-agreement",
            Self::CeaseAndDesistLetter => "cease-and-desist-letter",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant() {
        for t in DocumentType::ALL {
            assert_eq!(DocumentType::parse(t.as_str()).unwrap(), t);
        }
    }

    #[test]
    fn rejects_unknown_type() {
        let err = DocumentType::parse("divorce-petition").unwrap_err();
        assert_eq!(err.code(), "INVALID_DOCUMENT_TYPE");
    }
}
