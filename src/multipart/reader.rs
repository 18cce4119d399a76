//! Reading multipart bodies
//!
//! This is the only part of the multipart pipeline that performs I/O: it
//! drives `multer` over the request body and collects the `operations` and
//! `map` parts plus every file part. Decoding happens afterwards, on the
//! collected [`MultipartParts`].
//!
//! File parts are buffered in memory unless an uploads directory is
//! configured, in which case they are streamed chunk by chunk into a
//! temporary file and never held in memory as a whole.

use bytes::Bytes;
use futures::Stream;
use multer::{Constraints, Field, Multipart, SizeLimit};
use std::path::Path;
use tokio::io::AsyncWriteExt;

use crate::config::HandlerOptions;
use crate::core::error::DecodeError;
use crate::core::upload::{FileUpload, UploadStore};

/// Name of the part carrying the operations document
pub const OPERATIONS_PART: &str = "operations";

/// Name of the part carrying the file map
pub const MAP_PART: &str = "map";

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Buffered parts of a multipart GraphQL request
#[derive(Debug, Default)]
pub struct MultipartParts {
    pub operations: Option<Bytes>,
    pub map: Option<Bytes>,
    pub files: UploadStore,
}

/// Extract the boundary from a `multipart/form-data` content type
pub fn parse_boundary(content_type: &str) -> Result<String, DecodeError> {
    multer::parse_boundary(content_type).map_err(|e| DecodeError::InvalidMultipart {
        message: e.to_string(),
    })
}

/// Read every part of a multipart body
///
/// Each part name may appear once; a repeated `operations`, `map` or file
/// part is rejected as `INVALID_MULTIPART`.
pub async fn read_multipart<S, O, E>(
    stream: S,
    boundary: String,
    options: &HandlerOptions,
) -> Result<MultipartParts, DecodeError>
where
    S: Stream<Item = Result<O, E>> + Send + 'static,
    O: Into<Bytes> + 'static,
    E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    let mut multipart = Multipart::with_constraints(stream, boundary, constraints(options));
    let mut parts = MultipartParts::default();

    while let Some(field) = multipart.next_field().await.map_err(multer_error)? {
        let Some(field_name) = field.name().map(str::to_string) else {
            tracing::debug!("Skipping multipart part without a name");
            continue;
        };

        match field_name.as_str() {
            OPERATIONS_PART => {
                let data = field.bytes().await.map_err(multer_error)?;
                set_once(&mut parts.operations, OPERATIONS_PART, data)?;
            }
            MAP_PART => {
                let data = field.bytes().await.map_err(multer_error)?;
                set_once(&mut parts.map, MAP_PART, data)?;
            }
            _ => {
                if parts.files.contains(&field_name) {
                    return Err(duplicate_part(&field_name));
                }

                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| field_name.clone());
                let content_type = field
                    .content_type()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

                let upload = match &options.uploads_directory {
                    Some(dir) => {
                        spool(dir, field_name.clone(), file_name, content_type, field).await?
                    }
                    None => {
                        let data = field.bytes().await.map_err(multer_error)?;
                        FileUpload::new(field_name.clone(), file_name, content_type, data)
                    }
                };

                tracing::debug!(
                    field = %field_name,
                    size = upload.size(),
                    spooled = upload.path().is_some(),
                    "Read multipart file part"
                );

                if !parts.files.insert(upload) {
                    return Err(duplicate_part(&field_name));
                }
            }
        }
    }

    Ok(parts)
}

fn set_once(slot: &mut Option<Bytes>, name: &str, data: Bytes) -> Result<(), DecodeError> {
    if slot.is_some() {
        return Err(duplicate_part(name));
    }
    tracing::debug!(field = name, size = data.len(), "Read multipart part");
    *slot = Some(data);
    Ok(())
}

fn duplicate_part(name: &str) -> DecodeError {
    DecodeError::InvalidMultipart {
        message: format!("part '{}' appears more than once", name),
    }
}

fn constraints(options: &HandlerOptions) -> Constraints {
    let mut limit = SizeLimit::new();
    if let Some(max) = options.max_file_size {
        limit = limit.per_field(max);
    }
    if let Some(max) = options.max_request_size {
        limit = limit.whole_stream(max);
    }
    Constraints::new().size_limit(limit)
}

fn multer_error(err: multer::Error) -> DecodeError {
    match err {
        multer::Error::FieldSizeExceeded { limit, field_name } => DecodeError::PayloadTooLarge {
            limit,
            message: format!("part '{}'", field_name.unwrap_or_default()),
        },
        multer::Error::StreamSizeExceeded { limit } => DecodeError::PayloadTooLarge {
            limit,
            message: "request body".to_string(),
        },
        other => DecodeError::InvalidMultipart {
            message: other.to_string(),
        },
    }
}

/// Stream a file part into a temporary file inside `dir`
async fn spool(
    dir: &Path,
    field_name: String,
    file_name: String,
    content_type: String,
    mut field: Field<'_>,
) -> Result<FileUpload, DecodeError> {
    let dir = dir.to_path_buf();
    let temp = tokio::task::spawn_blocking(move || {
        tempfile::Builder::new()
            .prefix("graphql-upload-")
            .tempfile_in(&dir)
    })
    .await
    .map_err(|e| spool_error(e.to_string()))?
    .map_err(|e| spool_error(e.to_string()))?;

    let handle = temp
        .as_file()
        .try_clone()
        .map_err(|e| spool_error(e.to_string()))?;
    let mut writer = tokio::fs::File::from_std(handle);

    let mut size = 0u64;
    while let Some(chunk) = field.chunk().await.map_err(multer_error)? {
        size += chunk.len() as u64;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| spool_error(e.to_string()))?;
    }
    writer
        .flush()
        .await
        .map_err(|e| spool_error(e.to_string()))?;

    Ok(FileUpload::spooled(
        field_name,
        file_name,
        content_type,
        size,
        temp,
    ))
}

fn spool_error(message: String) -> DecodeError {
    tracing::error!(error = %message, "Failed to spool uploaded file");
    DecodeError::InvalidMultipart {
        message: format!("could not store uploaded file: {}", message),
    }
}
