//! GraphQL executor module
//!
//! A small executor over `graphql-parser` documents: it selects the
//! operation, collects fields, substitutes variables into arguments and
//! dispatches each field to the resolver registered for its
//! `(type, field)` pair.
//!
//! - `core`: operation selection, variables and batches
//! - `field_resolver`: field dispatch and result projection
//! - `utils`: field collection and value conversion

mod core;
mod field_resolver;
mod utils;

pub use core::GraphQLExecutor;
