//! Batch result packaging
//!
//! Pure functions of a [`BatchOutcome`]: a deflated zip archive with one
//! entry per successful document, or a JSON body with inline-base64
//! payloads. Neither touches the renderer.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Serialize;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::types::{BatchOutcome, ConversionFailure};

/// Inline-encoded batch response body.
///
/// `documents` maps the original zero-based index to the base64 of the
/// produced PDF; `errors` is present only when at least one item failed.
#[derive(Debug, Serialize)]
pub struct InlineBatchResponse {
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub documents: BTreeMap<usize, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ConversionFailure>>,
}

/// Build a zip archive holding one `document_<index+1>.pdf` entry per
/// success, ordered by original index.
///
/// Failure counts are not stored in the archive; the HTTP layer attaches
/// them out-of-band as response headers.
pub fn build_zip_archive(outcome: &BatchOutcome) -> Result<Vec<u8>, ZipError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let entry_options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (index, pdf) in &outcome.successes {
        writer.start_file(format!("document_{}.pdf", index + 1), entry_options)?;
        writer.write_all(pdf)?;
    }

    Ok(writer.finish()?.into_inner())
}

/// Build the inline JSON body for a batch outcome.
pub fn build_inline_response(outcome: &BatchOutcome) -> InlineBatchResponse {
    let documents = outcome
        .successes
        .iter()
        .map(|(index, pdf)| (*index, BASE64.encode(pdf)))
        .collect();

    InlineBatchResponse {
        total: outcome.total,
        success_count: outcome.success_count(),
        failure_count: outcome.failure_count(),
        documents,
        errors: if outcome.failures.is_empty() {
            None
        } else {
            Some(outcome.failures.clone())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn outcome_with_gap() -> BatchOutcome {
        BatchOutcome {
            total: 3,
            successes: vec![(0, b"%PDF-1.4 first".to_vec()), (2, b"%PDF-1.4 third".to_vec())],
            failures: vec![ConversionFailure {
                index: 1,
                message: "Conversion timeout after 30s".to_string(),
                kind: "timeout".to_string(),
            }],
        }
    }

    #[test]
    fn test_zip_entries_named_by_original_index() {
        let archive_bytes = build_zip_archive(&outcome_with_gap()).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(archive_bytes)).unwrap();

        let names: Vec<String> = archive.file_names().map(String::from).collect();
        assert_eq!(names, vec!["document_1.pdf", "document_3.pdf"]);

        let mut first = String::new();
        archive
            .by_name("document_1.pdf")
            .unwrap()
            .read_to_string(&mut first)
            .unwrap();
        assert_eq!(first, "%PDF-1.4 first");
    }

    #[test]
    fn test_zip_entry_count_matches_success_count() {
        let outcome = outcome_with_gap();
        let archive_bytes = build_zip_archive(&outcome).unwrap();
        let archive = ZipArchive::new(Cursor::new(archive_bytes)).unwrap();
        assert_eq!(archive.len(), outcome.success_count());
    }

    #[test]
    fn test_inline_response_round_trips_payloads() {
        let outcome = outcome_with_gap();
        let body = build_inline_response(&outcome);

        assert_eq!(body.total, 3);
        assert_eq!(body.success_count, 2);
        assert_eq!(body.failure_count, 1);
        assert_eq!(
            BASE64.decode(&body.documents[&0]).unwrap(),
            b"%PDF-1.4 first"
        );
        assert_eq!(
            BASE64.decode(&body.documents[&2]).unwrap(),
            b"%PDF-1.4 third"
        );

        let errors = body.errors.unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].index, 1);
        assert_eq!(errors[0].kind, "timeout");
    }

    #[test]
    fn test_inline_response_omits_errors_when_clean() {
        let outcome = BatchOutcome {
            total: 1,
            successes: vec![(0, b"%PDF-1.4 only".to_vec())],
            failures: vec![],
        };
        let body = build_inline_response(&outcome);
        assert!(body.errors.is_none());

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("errors").is_none());
        assert_eq!(json["success_count"], 1);
    }
}
