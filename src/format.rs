//! Supported format codes and the static compatibility table.
//!
//! [`Format`] is the closed set of codes a user may pick as source or target.
//! [`CompatibilityTable`] narrows that set to the pairs the controller is
//! willing to submit. Anything outside the table is rejected locally, before a
//! network call is spent on it.

use crate::error::ParseFormatError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// A selectable file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Format {
    Docx,
    Pdf,
    Html,
    Xlsx,
    Pptx,
    Png,
    Jpg,
    Txt,
    Epub,
    Svg,
    Tiff,
    Csv,
    Xls,
    Doc,
    Rtf,
    Odt,
    Pages,
    Key,
    Numbers,
    Bmp,
}

impl Format {
    /// Every supported format, in the order the picker lists them.
    pub const ALL: [Format; 20] = [
        Format::Docx,
        Format::Pdf,
        Format::Html,
        Format::Xlsx,
        Format::Pptx,
        Format::Png,
        Format::Jpg,
        Format::Txt,
        Format::Epub,
        Format::Svg,
        Format::Tiff,
        Format::Csv,
        Format::Xls,
        Format::Doc,
        Format::Rtf,
        Format::Odt,
        Format::Pages,
        Format::Key,
        Format::Numbers,
        Format::Bmp,
    ];

    /// Uppercase code, e.g. `"DOCX"`.
    pub fn code(self) -> &'static str {
        match self {
            Format::Docx => "DOCX",
            Format::Pdf => "PDF",
            Format::Html => "HTML",
            Format::Xlsx => "XLSX",
            Format::Pptx => "PPTX",
            Format::Png => "PNG",
            Format::Jpg => "JPG",
            Format::Txt => "TXT",
            Format::Epub => "EPUB",
            Format::Svg => "SVG",
            Format::Tiff => "TIFF",
            Format::Csv => "CSV",
            Format::Xls => "XLS",
            Format::Doc => "DOC",
            Format::Rtf => "RTF",
            Format::Odt => "ODT",
            Format::Pages => "PAGES",
            Format::Key => "KEY",
            Format::Numbers => "NUMBERS",
            Format::Bmp => "BMP",
        }
    }

    /// Lowercase code as used in service endpoint paths, e.g. `"docx"`.
    pub fn api_code(self) -> String {
        self.code().to_ascii_lowercase()
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Format {
    type Err = ParseFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Format::ALL
            .into_iter()
            .find(|f| f.code() == upper)
            .ok_or_else(|| ParseFormatError(s.to_string()))
    }
}

/// Uppercased text after the last `.` of `name`.
///
/// A name without any `.` yields the whole name uppercased; a trailing dot
/// yields the empty string.
pub fn extension_of(name: &str) -> String {
    let ext = match name.rsplit_once('.') {
        Some((_, ext)) => ext,
        None => name,
    };
    ext.to_uppercase()
}

/// Which target formats each source format may be converted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityTable {
    rules: BTreeMap<Format, BTreeSet<Format>>,
}

static STANDARD_TABLE: Lazy<CompatibilityTable> = Lazy::new(|| {
    use Format::*;
    CompatibilityTable::from_rules([
        (Docx, &[Pdf, Txt][..]),
        (Pdf, &[Docx, Jpg, Txt][..]),
        (Png, &[Jpg, Pdf][..]),
        (Jpg, &[Png, Pdf][..]),
        (Xlsx, &[Pdf, Csv][..]),
        (Txt, &[Pdf][..]),
    ])
});

impl CompatibilityTable {
    /// The process-wide table of permitted conversions.
    pub fn standard() -> &'static CompatibilityTable {
        &STANDARD_TABLE
    }

    /// Build a table from `(source, targets)` rules.
    pub fn from_rules<'a>(rules: impl IntoIterator<Item = (Format, &'a [Format])>) -> Self {
        let mut map: BTreeMap<Format, BTreeSet<Format>> = BTreeMap::new();
        for (from, targets) in rules {
            map.entry(from).or_default().extend(targets.iter().copied());
        }
        Self { rules: map }
    }

    pub fn allows(&self, from: Format, to: Format) -> bool {
        self.rules.get(&from).is_some_and(|t| t.contains(&to))
    }

    /// Allowed targets for `from`, empty if `from` is not a source at all.
    pub fn targets_for(&self, from: Format) -> impl Iterator<Item = Format> + '_ {
        self.rules.get(&from).into_iter().flatten().copied()
    }

    /// Every permitted `(from, to)` pair.
    pub fn pairs(&self) -> impl Iterator<Item = (Format, Format)> + '_ {
        self.rules
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (*from, *to)))
    }

    pub fn sources(&self) -> impl Iterator<Item = Format> + '_ {
        self.rules.keys().copied()
    }
}
