//! Supporting documents and field extraction

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{DocumentId, PortError, UserId};

use crate::error::ClaimError;

/// Categories of evidence attached to a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    IdentityProof,
    ResidenceProof,
    GramSabhaResolution,
    SurveyMap,
    TaxReceipt,
    Other,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::IdentityProof => "IdentityProof",
            DocumentKind::ResidenceProof => "ResidenceProof",
            DocumentKind::GramSabhaResolution => "GramSabhaResolution",
            DocumentKind::SurveyMap => "SurveyMap",
            DocumentKind::TaxReceipt => "TaxReceipt",
            DocumentKind::Other => "Other",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IdentityProof" => Ok(DocumentKind::IdentityProof),
            "ResidenceProof" => Ok(DocumentKind::ResidenceProof),
            "GramSabhaResolution" => Ok(DocumentKind::GramSabhaResolution),
            "SurveyMap" => Ok(DocumentKind::SurveyMap),
            "TaxReceipt" => Ok(DocumentKind::TaxReceipt),
            "Other" => Ok(DocumentKind::Other),
            other => Err(ClaimError::Validation(format!(
                "Unknown document kind: {other}"
            ))),
        }
    }
}

/// One field pulled out of a document by the extraction collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedField {
    pub name: String,
    pub value: String,
    /// Extractor confidence in [0, 1]
    pub confidence: f32,
}

/// Outcome of running extraction over an uploaded document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub fields: Vec<ExtractedField>,
    pub anomalies: Vec<String>,
    pub needs_review: Vec<String>,
}

impl ExtractionResult {
    /// Placeholder stored when the extraction collaborator fails; the
    /// document is kept, review is flagged
    pub fn degraded() -> Self {
        Self {
            fields: Vec::new(),
            anomalies: Vec::new(),
            needs_review: vec!["Automatic extraction failed; manual review required".to_string()],
        }
    }
}

/// An uploaded supporting document
///
/// The `sha256` fingerprint deduplicates uploads within a claim; the file
/// body itself lives behind `storage_ref`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub kind: DocumentKind,
    pub storage_ref: String,
    /// 64 lowercase hex characters
    pub sha256: String,
    pub uploaded_by: UserId,
    pub uploaded_at: DateTime<Utc>,
    pub extraction: Option<ExtractionResult>,
}

impl Document {
    pub fn new(
        name: impl Into<String>,
        kind: DocumentKind,
        storage_ref: impl Into<String>,
        sha256: impl Into<String>,
        uploaded_by: UserId,
    ) -> Result<Self, ClaimError> {
        let sha256 = sha256.into();
        if !is_valid_fingerprint(&sha256) {
            return Err(ClaimError::Validation(
                "Document fingerprint must be 64 lowercase hex characters".to_string(),
            ));
        }
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ClaimError::validation("Document name is required"));
        }
        Ok(Self {
            id: DocumentId::new_v7(),
            name,
            kind,
            storage_ref: storage_ref.into(),
            sha256,
            uploaded_by,
            uploaded_at: Utc::now(),
            extraction: None,
        })
    }
}

fn is_valid_fingerprint(sha256: &str) -> bool {
    sha256.len() == 64
        && sha256
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

/// Keyword-driven extractor used when no ML collaborator is configured
///
/// Looks for well-known field labels in whatever text excerpt accompanied
/// the upload and reports obvious gaps as review items.
#[derive(Debug, Default)]
pub struct KeywordExtractor;

impl KeywordExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core so the port adapter stays a thin wrapper
    pub fn extract_fields(&self, document_name: &str, excerpt: Option<&str>) -> ExtractionResult {
        let mut fields = Vec::new();
        let mut needs_review = Vec::new();

        if let Some(text) = excerpt {
            for (label, field_name) in [
                ("name", "claimant_name"),
                ("village", "village"),
                ("survey", "survey_number"),
                ("area", "land_area"),
                ("date", "document_date"),
            ] {
                if let Some(value) = find_labeled_value(text, label) {
                    fields.push(ExtractedField {
                        name: field_name.to_string(),
                        value,
                        confidence: 0.6,
                    });
                }
            }
        }

        if fields.is_empty() {
            needs_review.push(format!(
                "No recognizable fields found in '{document_name}'"
            ));
        }

        ExtractionResult {
            fields,
            anomalies: Vec::new(),
            needs_review,
        }
    }
}

/// Finds `label: value` or `label - value` on a single line, case-insensitive
fn find_labeled_value(text: &str, label: &str) -> Option<String> {
    for line in text.lines() {
        let lower = line.to_lowercase();
        if let Some(idx) = lower.find(label) {
            let rest = &line[idx + label.len()..];
            let value = rest.trim_start_matches([':', '-', ' ']).trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Port adapter around [`KeywordExtractor`]
#[async_trait::async_trait]
impl crate::ports::DocumentExtractor for KeywordExtractor {
    async fn extract(
        &self,
        document_name: &str,
        excerpt: Option<&str>,
    ) -> Result<ExtractionResult, PortError> {
        Ok(self.extract_fields(document_name, excerpt))
    }
}

impl core_kernel::DomainPort for KeywordExtractor {}

#[cfg(test)]
mod tests {
    use super::*;

    const SHA: &str = "a3f5b8c9d2e1f4a6b7c8d9e0f1a2b3c4d5e6f7a8b9c0d1e2f3a4b5c6d7e8f9a0";

    #[test]
    fn test_document_new_validates_fingerprint() {
        let doc = Document::new(
            "patta.pdf",
            DocumentKind::TaxReceipt,
            "s3://docs/patta.pdf",
            SHA,
            UserId::new(),
        );
        assert!(doc.is_ok());
    }

    #[test]
    fn test_document_rejects_short_fingerprint() {
        let doc = Document::new(
            "patta.pdf",
            DocumentKind::TaxReceipt,
            "s3://docs/patta.pdf",
            "abc123",
            UserId::new(),
        );
        assert!(doc.is_err());
    }

    #[test]
    fn test_document_rejects_uppercase_fingerprint() {
        let upper = SHA.to_uppercase();
        let doc = Document::new(
            "patta.pdf",
            DocumentKind::TaxReceipt,
            "s3://docs/patta.pdf",
            upper,
            UserId::new(),
        );
        assert!(doc.is_err());
    }

    #[test]
    fn test_keyword_extractor_finds_labeled_fields() {
        let extractor = KeywordExtractor::new();
        let text = "Name: Ramesh Gond\nVillage: Bichhiya\nSurvey: 142/2\n";
        let result = extractor.extract_fields("claim_form.pdf", Some(text));

        assert!(result
            .fields
            .iter()
            .any(|f| f.name == "claimant_name" && f.value == "Ramesh Gond"));
        assert!(result
            .fields
            .iter()
            .any(|f| f.name == "survey_number" && f.value == "142/2"));
        assert!(result.needs_review.is_empty());
    }

    #[test]
    fn test_keyword_extractor_flags_empty_documents() {
        let extractor = KeywordExtractor::new();
        let result = extractor.extract_fields("scan.jpg", None);

        assert!(result.fields.is_empty());
        assert_eq!(result.needs_review.len(), 1);
    }

    #[test]
    fn test_degraded_extraction_flags_review() {
        let result = ExtractionResult::degraded();
        assert!(result.fields.is_empty());
        assert_eq!(result.needs_review.len(), 1);
    }
}
