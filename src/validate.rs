//! Local preconditions checked before a request is sent.
//!
//! The checks run in a fixed order and stop at the first failure:
//!
//! 1. a file is selected
//! 2. its extension matches the source format
//! 3. both formats are chosen
//! 4. the pair is in the compatibility table
//!
//! The order is user-visible: a `report.pdf` submitted with no source format
//! reports a type mismatch, not a missing selection.

use crate::error::SubmitError;
use crate::file::SelectedFile;
use crate::format::{CompatibilityTable, Format};
use serde::{Deserialize, Serialize};

/// The source/target pair as currently chosen, possibly incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormatSelection {
    pub source: Option<Format>,
    pub target: Option<Format>,
}

impl FormatSelection {
    pub fn new(source: Option<Format>, target: Option<Format>) -> Self {
        Self { source, target }
    }
}

/// A request that passed every local check.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub file: SelectedFile,
    pub from: Format,
    pub to: Format,
}

/// Run the ordered checks against the current selection.
pub fn validate_submission(
    file: Option<&SelectedFile>,
    selection: FormatSelection,
    table: &CompatibilityTable,
) -> Result<ValidatedRequest, SubmitError> {
    let file = file.ok_or(SubmitError::MissingFile)?;

    let actual = file.extension();
    let expected = selection.source.map(Format::code).unwrap_or("");
    if actual != expected {
        return Err(SubmitError::FormatMismatch {
            actual_extension: actual,
            expected_format: expected.to_string(),
        });
    }

    let (Some(from), Some(to)) = (selection.source, selection.target) else {
        return Err(SubmitError::MissingFormatSelection);
    };

    if !table.allows(from, to) {
        return Err(SubmitError::UnsupportedConversion { from, to });
    }

    Ok(ValidatedRequest {
        file: file.clone(),
        from,
        to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> SelectedFile {
        SelectedFile::new(name, b"x".to_vec())
    }

    fn check(
        f: Option<&SelectedFile>,
        source: Option<Format>,
        target: Option<Format>,
    ) -> Result<ValidatedRequest, SubmitError> {
        validate_submission(
            f,
            FormatSelection::new(source, target),
            CompatibilityTable::standard(),
        )
    }

    #[test]
    fn missing_file_wins_over_everything() {
        let err = check(None, None, None).unwrap_err();
        assert!(matches!(err, SubmitError::MissingFile));
    }

    #[test]
    fn report_pdf_as_docx_is_a_mismatch() {
        let f = file("report.pdf");
        match check(Some(&f), Some(Format::Docx), Some(Format::Pdf)).unwrap_err() {
            SubmitError::FormatMismatch {
                actual_extension,
                expected_format,
            } => {
                assert_eq!(actual_extension, "PDF");
                assert_eq!(expected_format, "DOCX");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn empty_source_is_checked_as_mismatch_first() {
        let f = file("report.pdf");
        let err = check(Some(&f), None, Some(Format::Docx)).unwrap_err();
        assert!(
            matches!(&err, SubmitError::FormatMismatch { expected_format, .. } if expected_format.is_empty()),
            "got: {err:?}"
        );
    }

    #[test]
    fn missing_target_after_extension_matches() {
        let f = file("report.pdf");
        let err = check(Some(&f), Some(Format::Pdf), None).unwrap_err();
        assert!(matches!(err, SubmitError::MissingFormatSelection));
    }

    #[test]
    fn extension_match_is_case_insensitive_on_name() {
        let f = file("scan.PnG");
        let req = check(Some(&f), Some(Format::Png), Some(Format::Jpg)).unwrap();
        assert_eq!((req.from, req.to), (Format::Png, Format::Jpg));
    }

    #[test]
    fn every_pair_outside_table_is_unsupported() {
        let table = CompatibilityTable::standard();
        for from in Format::ALL {
            let f = file(&format!("input.{}", from.code().to_lowercase()));
            for to in Format::ALL {
                let result = check(Some(&f), Some(from), Some(to));
                if table.allows(from, to) {
                    assert!(result.is_ok(), "{from}->{to} should pass");
                } else {
                    assert!(
                        matches!(result, Err(SubmitError::UnsupportedConversion { from: a, to: b }) if a == from && b == to),
                        "{from}->{to} should be unsupported"
                    );
                }
            }
        }
    }
}
