//! API exposure modules
//!
//! Each exposure consumes a `GraphQLHost` and produces a Router.

pub mod graphql;

pub use graphql::{GraphQLExecutor, GraphQLExposure};
