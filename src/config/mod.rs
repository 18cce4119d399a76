//! Configuration loading and management

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What to do with file parts that no `map` entry references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnusedFilePolicy {
    /// Keep the request, drop the file with the rest of the request
    #[default]
    Ignore,

    /// Fail the request with `UNUSED_FILE_PART`
    Reject,
}

/// Options of the GraphQL HTTP handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerOptions {
    /// Route the handler is mounted on
    pub path: String,

    /// Accept `multipart/form-data` requests (file uploads)
    pub multipart_enabled: bool,

    /// Accept an array of operations in a single request
    pub batching_enabled: bool,

    /// Policy for uploaded parts not referenced by the map
    pub unused_file_parts: UnusedFilePolicy,

    /// Maximum size of a single multipart part, in bytes
    pub max_file_size: Option<u64>,

    /// Maximum size of the whole request body, in bytes
    pub max_request_size: Option<u64>,

    /// Spool uploaded files to temporary files in this directory
    /// instead of keeping them in memory
    pub uploads_directory: Option<PathBuf>,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            path: "/graphql".to_string(),
            multipart_enabled: false,
            batching_enabled: false,
            unused_file_parts: UnusedFilePolicy::Ignore,
            max_file_size: None,
            max_request_size: None,
            uploads_directory: None,
        }
    }
}

impl HandlerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    ///
    /// Missing keys take their default value.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') {
            anyhow::bail!("path must start with '/', got '{}'", self.path);
        }
        if self.max_file_size == Some(0) || self.max_request_size == Some(0) {
            anyhow::bail!("size limits must be greater than zero");
        }
        Ok(())
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_multipart_enabled(mut self, enabled: bool) -> Self {
        self.multipart_enabled = enabled;
        self
    }

    pub fn with_batching_enabled(mut self, enabled: bool) -> Self {
        self.batching_enabled = enabled;
        self
    }

    pub fn with_unused_file_parts(mut self, policy: UnusedFilePolicy) -> Self {
        self.unused_file_parts = policy;
        self
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }

    pub fn with_max_request_size(mut self, bytes: u64) -> Self {
        self.max_request_size = Some(bytes);
        self
    }

    pub fn with_uploads_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.uploads_directory = Some(dir.into());
        self
    }
}
