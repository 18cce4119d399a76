//! GraphQL HTTP exposure
//!
//! Serves `POST {path}` for both plain JSON requests and multipart upload
//! requests, and answers with a single response object or, for batches, an
//! array of responses in operation order.

mod executor;

pub use executor::GraphQLExecutor;

use axum::{
    Extension, Json, Router,
    body::Body,
    extract::Request,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
};
use std::sync::Arc;

use crate::core::error::{DecodeError, HandlerError, RequestError};
use crate::core::request::GraphQLBatch;
use crate::core::response::BatchResponse;
use crate::multipart::{decode_multipart, parse_boundary, read_multipart};
use crate::server::host::GraphQLHost;

const MULTIPART_FORM_DATA: &str = "multipart/form-data";
const APPLICATION_JSON: &str = "application/json";

/// GraphQL API exposure implementation
pub struct GraphQLExposure;

impl GraphQLExposure {
    /// Build the GraphQL router from a host
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let host = Arc::new(builder.build_host()?);
    /// let app = GraphQLExposure::build_router(host);
    /// ```
    pub fn build_router(host: Arc<GraphQLHost>) -> Router {
        Router::new()
            .route(&host.options.path, post(graphql_handler))
            .layer(Extension(host))
    }
}

/// Handler for GraphQL queries and mutations, JSON or multipart
async fn graphql_handler(
    Extension(host): Extension<Arc<GraphQLHost>>,
    request: Request,
) -> Response {
    match handle_request(&host, request).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => {
            tracing::warn!(code = err.error_code(), error = %err, "Rejected GraphQL request");
            err.into_response()
        }
    }
}

async fn handle_request(
    host: &GraphQLHost,
    request: Request,
) -> Result<BatchResponse, HandlerError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    let batch = match mime.as_str() {
        MULTIPART_FORM_DATA => decode_multipart_body(host, &content_type, request.into_body()).await?,
        APPLICATION_JSON => decode_json_body(host, request.into_body()).await?,
        _ => return Err(RequestError::UnsupportedMediaType { content_type }.into()),
    };

    tracing::debug!(
        operations = batch.operations().len(),
        batched = batch.is_batched(),
        "Executing GraphQL request"
    );

    Ok(host.executor.execute_batch(&batch).await)
}

async fn decode_multipart_body(
    host: &GraphQLHost,
    content_type: &str,
    body: Body,
) -> Result<GraphQLBatch, HandlerError> {
    let options = host.options.as_ref();
    if !options.multipart_enabled {
        return Err(DecodeError::MultipartDisabled.into());
    }

    let boundary = parse_boundary(content_type)?;
    let parts = read_multipart(body.into_data_stream(), boundary, options).await?;
    Ok(decode_multipart(&parts, options)?)
}

async fn decode_json_body(host: &GraphQLHost, body: Body) -> Result<GraphQLBatch, HandlerError> {
    let options = host.options.as_ref();
    let limit = options
        .max_request_size
        .and_then(|max| usize::try_from(max).ok())
        .unwrap_or(usize::MAX);

    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| match options.max_request_size {
            Some(limit) => HandlerError::from(DecodeError::PayloadTooLarge {
                limit,
                message: "request body".to_string(),
            }),
            None => HandlerError::from(RequestError::InvalidBody {
                message: e.to_string(),
            }),
        })?;

    let batch = GraphQLBatch::from_slice("body", &bytes)?;
    if batch.is_batched() && !options.batching_enabled {
        return Err(DecodeError::BatchingDisabled.into());
    }
    Ok(batch)
}
