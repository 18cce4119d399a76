//! GraphQLServerBuilder for fluent API to build HTTP servers

use super::exposure::GraphQLExposure;
use super::host::GraphQLHost;
use crate::config::HandlerOptions;
use crate::core::resolver::{Resolver, ResolverArgs, ResolverContext, ResolverRegistry};
use anyhow::Result;
use axum::Router;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Builder for a GraphQL server accepting JSON and multipart requests
///
/// # Example
///
/// ```ignore
/// let app = GraphQLServerBuilder::new()
///     .with_options(HandlerOptions::new().with_multipart_enabled(true))
///     .register_fn("Mutation", "singleUpload", |args, _| {
///         Ok(json!({ "id": args.upload("file")?.file_name() }))
///     })
///     .build()?;
/// ```
pub struct GraphQLServerBuilder {
    options: HandlerOptions,
    registry: ResolverRegistry,
}

impl GraphQLServerBuilder {
    /// Create a new builder with default options
    pub fn new() -> Self {
        Self {
            options: HandlerOptions::default(),
            registry: ResolverRegistry::new(),
        }
    }

    /// Replace the handler options
    pub fn with_options(mut self, options: HandlerOptions) -> Self {
        self.options = options;
        self
    }

    /// Load the handler options from a YAML file
    pub fn with_options_file(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.options = HandlerOptions::from_yaml_file(path)?;
        Ok(self)
    }

    /// Register a resolver for `type_name.field_name`
    pub fn register_resolver(
        mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        resolver: impl Resolver + 'static,
    ) -> Self {
        self.registry.register(type_name, field_name, resolver);
        self
    }

    /// Register a synchronous closure for `type_name.field_name`
    pub fn register_fn<F>(
        mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        f: F,
    ) -> Self
    where
        F: Fn(&ResolverArgs, &ResolverContext<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.registry.register_fn(type_name, field_name, f);
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(self) -> Result<GraphQLHost> {
        if self.registry.is_empty() {
            tracing::warn!("Building a GraphQL host without any resolver");
        }
        GraphQLHost::new(self.options, self.registry)
    }

    /// Build the final router, with HTTP tracing
    pub fn build(self) -> Result<Router> {
        let host = Arc::new(self.build_host()?);
        Ok(GraphQLExposure::build_router(host)
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http())))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// GraphQLServerBuilder::new()
    ///     .with_options_file("graphql.yaml")?
    ///     .register_resolver("Mutation", "singleUpload", SingleUpload)
    ///     .serve("127.0.0.1:3000").await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let path = self.options.path.clone();
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("GraphQL server listening on {}{}", addr, path);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for GraphQLServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for a shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
