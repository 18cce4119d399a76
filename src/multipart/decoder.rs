//! Decoding multipart GraphQL requests
//!
//! Turns buffered [`MultipartParts`] into executable operations: parses the
//! `operations` document, parses the `map`, and substitutes every mapped
//! `null` placeholder with the matching uploaded file. Decoding is pure and
//! deterministic; any failure rejects the whole request.

use indexmap::IndexMap;
use serde_json::Value;

use super::path::{VariablePath, replace_null};
use super::reader::{MAP_PART, MultipartParts, OPERATIONS_PART};
use crate::config::{HandlerOptions, UnusedFilePolicy};
use crate::core::error::DecodeError;
use crate::core::request::GraphQLBatch;
use crate::core::value::InputValue;

/// Field name to the paths its file must be substituted at, in map order
pub type UploadMap = IndexMap<String, Vec<VariablePath>>;

/// Decode a multipart request into one or more operations
pub fn decode_multipart(
    parts: &MultipartParts,
    options: &HandlerOptions,
) -> Result<GraphQLBatch, DecodeError> {
    let operations = parts
        .operations
        .as_ref()
        .ok_or(DecodeError::MissingOperations)?;
    let mut batch = GraphQLBatch::from_slice(OPERATIONS_PART, operations)?;

    if batch.is_batched() && !options.batching_enabled {
        return Err(DecodeError::BatchingDisabled);
    }

    let map = parse_map(parts.map.as_deref().ok_or(DecodeError::MissingMap)?)?;
    let batched = batch.is_batched();
    let operations = batch.operations_mut();

    for (field, paths) in &map {
        let upload = parts
            .files
            .get(field)
            .ok_or_else(|| DecodeError::MissingFilePart {
                field: field.clone(),
            })?;

        for path in paths {
            let (index, route) = path.locate(batched)?;
            let operation = operations.get_mut(index).ok_or_else(|| {
                DecodeError::unresolved(path, format!("operation {} does not exist", index))
            })?;

            replace_null(
                &mut operation.variables,
                route,
                InputValue::Upload(upload.clone()),
            )
            .map_err(|message| DecodeError::unresolved(path, message))?;

            tracing::debug!(field = %field, path = %path, "Bound uploaded file");
        }
    }

    for field in parts.files.field_names() {
        if map.contains_key(field) {
            continue;
        }
        match options.unused_file_parts {
            UnusedFilePolicy::Ignore => {
                tracing::debug!(field = %field, "Ignoring file part not referenced by map");
            }
            UnusedFilePolicy::Reject => {
                return Err(DecodeError::UnusedFilePart {
                    field: field.to_string(),
                });
            }
        }
    }

    Ok(batch)
}

/// Parse the `map` part
pub fn parse_map(bytes: &[u8]) -> Result<UploadMap, DecodeError> {
    let raw: IndexMap<String, Value> =
        serde_json::from_slice(bytes).map_err(|e| DecodeError::invalid_json(MAP_PART, e))?;

    raw.into_iter()
        .map(|(field, value)| {
            let paths = parse_map_entry(&field, value)?;
            Ok((field, paths))
        })
        .collect()
}

fn parse_map_entry(field: &str, value: Value) -> Result<Vec<VariablePath>, DecodeError> {
    let invalid = |message: &str| DecodeError::InvalidMap {
        field: field.to_string(),
        message: message.to_string(),
    };

    let Value::Array(items) = value else {
        return Err(invalid("expected an array of paths"));
    };
    if items.is_empty() {
        return Err(invalid("expected at least one path"));
    }

    items
        .iter()
        .map(|item| {
            item.as_str()
                .ok_or_else(|| invalid("paths must be strings"))
                .and_then(VariablePath::parse)
        })
        .collect()
}
