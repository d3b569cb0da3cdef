//! Request parameters sent alongside the file.

use crate::file::SelectedFile;
use crate::format::Format;

/// Name of the multipart field carrying the file.
pub const FILE_PARAM: &str = "File";

/// The file plus any extra named parameters for one conversion request.
#[derive(Debug, Clone)]
pub struct ConversionParams {
    file: SelectedFile,
    extra: Vec<(String, String)>,
}

impl ConversionParams {
    pub fn new(file: SelectedFile) -> Self {
        Self {
            file,
            extra: Vec::new(),
        }
    }

    /// Parameters for `from → to`, including the pair-specific extras.
    ///
    /// PNG → JPG is the only pair with an extra: `scale=true`.
    pub fn for_pair(file: SelectedFile, from: Format, to: Format) -> Self {
        let mut params = Self::new(file);
        if from == Format::Png && to == Format::Jpg {
            params.add("scale", "true");
        }
        params
    }

    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.extra.push((name.into(), value.into()));
        self
    }

    pub fn file(&self) -> &SelectedFile {
        &self.file
    }

    pub fn extra(&self) -> &[(String, String)] {
        &self.extra
    }

    /// Value of the first extra parameter called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.extra
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
