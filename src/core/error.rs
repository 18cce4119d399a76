//! Typed error handling for the GraphQL upload handler
//!
//! Errors that happen before a GraphQL operation can run (malformed bodies,
//! broken upload maps, disabled features) are client request errors. They are
//! reported as a well-formed HTTP response and never reach the executor.
//! Errors raised while executing an operation are not represented here: they
//! are collected into the `errors` array of the GraphQL response instead.
//!
//! # Error Categories
//!
//! - [`DecodeError`]: the request body could not be turned into operations
//! - [`RequestError`]: HTTP-level problems unrelated to the GraphQL payload
//! - [`GraphQLError`]: executor failures, reported inside a GraphQL response
//!   rather than as an HTTP error
//!
//! # Example
//!
//! ```rust,ignore
//! match decode_multipart(parts, &options) {
//!     Ok(batch) => execute(batch).await,
//!     Err(DecodeError::MissingFilePart { field }) => {
//!         println!("client forgot to send {}", field);
//!     }
//!     Err(e) => return HandlerError::from(e).into_response(),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

/// The main error type of the handler
#[derive(Debug)]
pub enum HandlerError {
    /// The request body could not be decoded into GraphQL operations
    Decode(DecodeError),

    /// HTTP/Request errors
    Request(RequestError),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::Decode(e) => write!(f, "{}", e),
            HandlerError::Request(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for HandlerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HandlerError::Decode(e) => Some(e),
            HandlerError::Request(e) => Some(e),
        }
    }
}

/// Error response structure for HTTP responses
///
/// Shaped like a GraphQL response without `data`, so GraphQL clients can
/// read request errors the same way they read execution errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: Vec<ErrorEntry>,
}

/// One entry of [`ErrorResponse::errors`]
#[derive(Debug, Serialize)]
pub struct ErrorEntry {
    /// Human-readable error message
    pub message: String,
    /// Machine-readable details, always containing `code`
    pub extensions: serde_json::Value,
}

impl HandlerError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::Decode(e) => e.status_code(),
            HandlerError::Request(e) => e.status_code(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            HandlerError::Decode(e) => e.error_code(),
            HandlerError::Request(e) => e.error_code(),
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        let mut extensions = serde_json::Map::new();
        extensions.insert("code".to_string(), self.error_code().into());
        if let Some(serde_json::Value::Object(details)) = self.details() {
            extensions.extend(details);
        }

        ErrorResponse {
            errors: vec![ErrorEntry {
                message: self.to_string(),
                extensions: serde_json::Value::Object(extensions),
            }],
        }
    }

    /// Get additional details for the error
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            HandlerError::Decode(DecodeError::MissingFilePart { field })
            | HandlerError::Decode(DecodeError::UnusedFilePart { field }) => {
                Some(serde_json::json!({ "field": field }))
            }
            HandlerError::Decode(DecodeError::UnresolvedPath { path, .. }) => {
                Some(serde_json::json!({ "path": path }))
            }
            HandlerError::Decode(DecodeError::PayloadTooLarge { limit, .. }) => {
                Some(serde_json::json!({ "limit": limit }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Decode Errors
// =============================================================================

/// Errors raised while turning a request body into GraphQL operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Multipart request is missing the 'operations' part")]
    MissingOperations,

    #[error("Invalid JSON in '{part}': {message}")]
    InvalidJson { part: String, message: String },

    #[error("Invalid operations: {message}")]
    InvalidOperations { message: String },

    #[error("Multipart request is missing the 'map' part")]
    MissingMap,

    #[error("Invalid map entry '{field}': {message}")]
    InvalidMap { field: String, message: String },

    #[error("Path '{path}' does not resolve to a null placeholder: {message}")]
    UnresolvedPath { path: String, message: String },

    #[error("Map references file part '{field}' which was not uploaded")]
    MissingFilePart { field: String },

    #[error("File part '{field}' is not referenced by the map")]
    UnusedFilePart { field: String },

    #[error("Batched requests are disabled")]
    BatchingDisabled,

    #[error("Multipart requests are disabled")]
    MultipartDisabled,

    #[error("Malformed multipart body: {message}")]
    InvalidMultipart { message: String },

    #[error("Payload exceeds the configured limit of {limit} bytes ({message})")]
    PayloadTooLarge { limit: u64, message: String },
}

impl DecodeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            DecodeError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            DecodeError::MissingOperations => "MISSING_OPERATIONS",
            DecodeError::InvalidJson { .. } => "INVALID_JSON",
            DecodeError::InvalidOperations { .. } => "INVALID_OPERATIONS",
            DecodeError::MissingMap => "MISSING_MAP",
            DecodeError::InvalidMap { .. } => "INVALID_MAP",
            DecodeError::UnresolvedPath { .. } => "UNRESOLVED_PATH",
            DecodeError::MissingFilePart { .. } => "MISSING_FILE_PART",
            DecodeError::UnusedFilePart { .. } => "UNUSED_FILE_PART",
            DecodeError::BatchingDisabled => "BATCHING_DISABLED",
            DecodeError::MultipartDisabled => "MULTIPART_DISABLED",
            DecodeError::InvalidMultipart { .. } => "INVALID_MULTIPART",
            DecodeError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
        }
    }

    pub(crate) fn invalid_json(part: &str, err: impl fmt::Display) -> Self {
        DecodeError::InvalidJson {
            part: part.to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn unresolved(path: impl fmt::Display, message: impl Into<String>) -> Self {
        DecodeError::UnresolvedPath {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl From<DecodeError> for HandlerError {
    fn from(err: DecodeError) -> Self {
        HandlerError::Decode(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Content type is neither JSON nor multipart
    UnsupportedMediaType { content_type: String },

    /// Request body could not be read
    InvalidBody { message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::UnsupportedMediaType { content_type } => {
                write!(f, "Unsupported content type: '{}'", content_type)
            }
            RequestError::InvalidBody { message } => {
                write!(f, "Invalid request body: {}", message)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::UnsupportedMediaType { .. } => "UNSUPPORTED_MEDIA_TYPE",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
        }
    }
}

impl From<RequestError> for HandlerError {
    fn from(err: RequestError) -> Self {
        HandlerError::Request(err)
    }
}

// =============================================================================
// GraphQL Errors
// =============================================================================

/// Errors related to GraphQL operations
#[derive(Debug)]
pub enum GraphQLError {
    /// Query parsing error
    ParseError { message: String },

    /// The requested operation cannot be selected or run
    InvalidOperation { operation: String, message: String },

    /// Field resolution error
    FieldResolutionError { field: String, message: String },
}

impl fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphQLError::ParseError { message } => {
                write!(f, "Failed to parse query: {}", message)
            }
            GraphQLError::InvalidOperation { operation, message } => {
                write!(f, "Invalid GraphQL operation '{}': {}", operation, message)
            }
            GraphQLError::FieldResolutionError { field, message } => {
                write!(f, "Failed to resolve field '{}': {}", field, message)
            }
        }
    }
}

impl std::error::Error for GraphQLError {}

impl GraphQLError {
    /// Code reported in the `extensions` of the matching response error
    pub fn error_code(&self) -> &'static str {
        match self {
            GraphQLError::ParseError { .. } => "GRAPHQL_PARSE_ERROR",
            GraphQLError::InvalidOperation { .. } => "GRAPHQL_INVALID_OPERATION",
            GraphQLError::FieldResolutionError { .. } => "GRAPHQL_FIELD_RESOLUTION_ERROR",
        }
    }
}
