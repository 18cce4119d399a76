//! Uploaded file handles
//!
//! A [`FileUpload`] is created by the multipart reader for every file part of a
//! request and shared (read-only) with the decoder and the resolvers through
//! an `Arc`. All handles of a request live in an [`UploadStore`]; once the
//! request completes the store and every operation referencing it are dropped,
//! which frees buffered content and deletes spooled temporary files.

use bytes::Bytes;
use indexmap::IndexMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Where the content of an uploaded file lives
pub enum FileContent {
    /// Buffered in memory
    Memory(Bytes),

    /// Spooled to a temporary file, deleted on drop
    Disk(NamedTempFile),
}

/// A file received as part of a multipart GraphQL request
pub struct FileUpload {
    field_name: String,
    file_name: String,
    content_type: String,
    size: u64,
    content: FileContent,
}

impl FileUpload {
    /// Create an in-memory upload
    pub fn new(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        content: Bytes,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            size: content.len() as u64,
            content: FileContent::Memory(content),
        }
    }

    /// Create an upload backed by a temporary file
    pub fn spooled(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        size: u64,
        file: NamedTempFile,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            size,
            content: FileContent::Disk(file),
        }
    }

    /// Name of the multipart field that carried the file
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Original file name declared by the client
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declared content type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Size of the content in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Location of the spooled file, if the upload was written to disk
    pub fn path(&self) -> Option<&Path> {
        match &self.content {
            FileContent::Memory(_) => None,
            FileContent::Disk(file) => Some(file.path()),
        }
    }

    /// Read the whole content of the file
    pub async fn bytes(&self) -> std::io::Result<Bytes> {
        match &self.content {
            FileContent::Memory(bytes) => Ok(bytes.clone()),
            FileContent::Disk(file) => tokio::fs::read(file.path()).await.map(Bytes::from),
        }
    }
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("field_name", &self.field_name)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.size)
            .field("on_disk", &self.path().is_some())
            .finish()
    }
}

/// Request-scoped collection of uploaded files, keyed by field name
///
/// Iteration follows the order in which parts appeared in the body.
#[derive(Debug, Default)]
pub struct UploadStore {
    files: IndexMap<String, Arc<FileUpload>>,
}

impl UploadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; returns `false` if a file with the same field name exists
    pub fn insert(&mut self, upload: FileUpload) -> bool {
        if self.files.contains_key(upload.field_name()) {
            return false;
        }
        self.files
            .insert(upload.field_name().to_string(), Arc::new(upload));
        true
    }

    pub fn get(&self, field_name: &str) -> Option<&Arc<FileUpload>> {
        self.files.get(field_name)
    }

    pub fn contains(&self, field_name: &str) -> bool {
        self.files.contains_key(field_name)
    }

    /// Field names in upload order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_memory_upload_accessors() {
        let upload = FileUpload::new("0", "a.txt", "text/plain", Bytes::from_static(b"alpha"));

        assert_eq!(upload.field_name(), "0");
        assert_eq!(upload.file_name(), "a.txt");
        assert_eq!(upload.content_type(), "text/plain");
        assert_eq!(upload.size(), 5);
        assert!(upload.path().is_none());
        assert_eq!(upload.bytes().await.unwrap(), Bytes::from_static(b"alpha"));
    }

    #[tokio::test]
    async fn test_spooled_upload_is_deleted_on_drop() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"on disk").unwrap();
        let upload = FileUpload::spooled("1", "b.txt", "text/plain", 7, file);

        let path = upload.path().unwrap().to_path_buf();
        assert!(path.exists());
        assert_eq!(upload.bytes().await.unwrap(), Bytes::from_static(b"on disk"));

        drop(upload);
        assert!(!path.exists());
    }

    #[test]
    fn test_store_rejects_duplicate_field_names() {
        let mut store = UploadStore::new();
        assert!(store.insert(FileUpload::new("0", "a.txt", "text/plain", Bytes::new())));
        assert!(!store.insert(FileUpload::new("0", "b.txt", "text/plain", Bytes::new())));
        assert!(store.insert(FileUpload::new("1", "c.txt", "text/plain", Bytes::new())));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("0").unwrap().file_name(), "a.txt");
        assert_eq!(store.field_names().collect::<Vec<_>>(), vec!["0", "1"]);
    }
}
