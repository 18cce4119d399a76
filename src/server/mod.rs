//! Server module for building the GraphQL HTTP server
//!
//! - `host`: options, resolver registry and executor
//! - `builder`: fluent `GraphQLServerBuilder` with graceful `serve`
//! - `exposure`: axum routing and the GraphQL executor

pub mod builder;
pub mod exposure;
pub mod host;

pub use builder::GraphQLServerBuilder;
pub use exposure::{GraphQLExecutor, GraphQLExposure};
pub use host::GraphQLHost;
