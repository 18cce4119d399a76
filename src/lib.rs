//! # graphql-upload
//!
//! A GraphQL HTTP handler for axum with file uploads and request batching.
//!
//! ## Features
//!
//! - **Multipart Uploads**: the GraphQL multipart request convention
//!   (`operations`, `map` and file parts), files substituted into `null`
//!   variable placeholders
//! - **Batching**: an array of operations in one request, answered by an
//!   array of responses in the same order
//! - **Opt-In**: multipart and batching are both disabled unless configured
//! - **Resolver Registry**: fields dispatched by `(type, field)` to async
//!   resolvers or plain closures
//! - **Configuration-Based**: handler options loadable from YAML
//! - **Bounded Resources**: per-file and per-request size limits, optional
//!   streaming of uploads straight into temporary files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use graphql_upload::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     GraphQLServerBuilder::new()
//!         .with_options(
//!             HandlerOptions::new()
//!                 .with_multipart_enabled(true)
//!                 .with_batching_enabled(true),
//!         )
//!         .register_fn("Mutation", "singleUpload", |args, _ctx| {
//!             Ok(json!({ "id": args.upload("file")?.file_name() }))
//!         })
//!         .serve("127.0.0.1:3000")
//!         .await
//! }
//! ```

pub mod config;
pub mod core;
pub mod multipart;
pub mod server;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{DecodeError, GraphQLError, HandlerError, RequestError},
        request::{GraphQLBatch, OperationRequest},
        resolver::{FnResolver, Resolver, ResolverArgs, ResolverContext, ResolverRegistry},
        response::{BatchResponse, GraphQLResponse, ResponseError},
        upload::{FileUpload, UploadStore},
        value::InputValue,
    };

    // === Multipart ===
    pub use crate::multipart::{MultipartParts, VariablePath, decode_multipart, read_multipart};

    // === Config ===
    pub use crate::config::{HandlerOptions, UnusedFilePolicy};

    // === Server ===
    pub use crate::server::{GraphQLExecutor, GraphQLExposure, GraphQLHost, GraphQLServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::{Value, json};

    // === Axum ===
    pub use axum::Router;
}
