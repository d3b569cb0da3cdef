//! The user's chosen input file.

use crate::error::FileConvertError;
use crate::format::extension_of;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// A file picked for conversion: its name plus the bytes to upload.
///
/// Content is reference-counted so the controller can hand a copy to the
/// service call without holding its own lock across the upload.
#[derive(Clone)]
pub struct SelectedFile {
    name: String,
    content: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a local file, keeping only its final path component as the name.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, FileConvertError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FileConvertError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => FileConvertError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => FileConvertError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let name = file_name(path);
        debug!("Loaded {} ({} bytes) from {}", name, bytes.len(), path.display());
        Ok(Self::new(name, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Uppercased extension inferred from the name, e.g. `"PDF"`.
    pub fn extension(&self) -> String {
        extension_of(&self.name)
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("len", &self.content.len())
            .finish()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_comes_from_name() {
        let f = SelectedFile::new("Quarterly.Report.xlsx", vec![1u8, 2, 3]);
        assert_eq!(f.extension(), "XLSX");
        assert_eq!(f.len(), 3);
    }

    #[test]
    fn debug_omits_content() {
        let f = SelectedFile::new("a.txt", b"secret body".to_vec());
        let dbg = format!("{f:?}");
        assert!(dbg.contains("a.txt"));
        assert!(!dbg.contains("secret"));
    }

    #[tokio::test]
    async fn from_path_reads_bytes_and_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let f = SelectedFile::from_path(&path).await.unwrap();
        assert_eq!(f.name(), "notes.txt");
        assert_eq!(f.content(), b"hello");
    }

    #[tokio::test]
    async fn from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SelectedFile::from_path(dir.path().join("nope.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, FileConvertError::FileNotFound { .. }), "got: {err:?}");
    }
}
