//! Server host for transport-agnostic API exposure
//!
//! `GraphQLHost` holds everything a request needs once the server is built:
//! the handler options, the resolver registry and the executor over it.

use anyhow::Result;
use std::sync::Arc;

use crate::config::HandlerOptions;
use crate::core::resolver::ResolverRegistry;
use crate::server::exposure::graphql::GraphQLExecutor;

/// Host context containing all handler state
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(GraphQLHost::new(options, registry)?);
/// let app = GraphQLExposure::build_router(host);
/// ```
pub struct GraphQLHost {
    /// Handler options (path, enabled features, limits)
    pub options: Arc<HandlerOptions>,

    /// Resolvers keyed by `(type, field)`
    pub registry: Arc<ResolverRegistry>,

    /// Executor bound to `registry`
    pub executor: GraphQLExecutor,
}

impl GraphQLHost {
    /// Build the host, validating the options first
    pub fn new(options: HandlerOptions, registry: ResolverRegistry) -> Result<Self> {
        options.validate()?;

        let registry = Arc::new(registry);
        Ok(Self {
            options: Arc::new(options),
            executor: GraphQLExecutor::new(registry.clone()),
            registry,
        })
    }

    /// Whether at least one resolver is registered
    pub fn is_ready(&self) -> bool {
        !self.registry.is_empty()
    }
}
