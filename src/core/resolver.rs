//! Resolver registry
//!
//! Applications expose GraphQL fields by registering a [`Resolver`] under a
//! `(type name, field name)` pair. The executor looks resolvers up by that
//! pair only, so the multipart decoder and the HTTP layer never need to know
//! which fields exist.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::upload::FileUpload;
use super::value::InputValue;

/// Handler producing the value of one GraphQL field
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Resolve the field
    ///
    /// # Arguments
    /// * `args` - Field arguments with variables (and uploads) substituted
    /// * `ctx` - Where in the operation the field is being resolved
    ///
    /// # Returns
    /// A JSON value; objects and lists are further projected through the
    /// field's sub-selection by the executor.
    async fn resolve(&self, args: &ResolverArgs, ctx: &ResolverContext<'_>) -> Result<Value>;
}

/// Adapter turning a synchronous closure into a [`Resolver`]
pub struct FnResolver<F>(pub F);

#[async_trait]
impl<F> Resolver for FnResolver<F>
where
    F: Fn(&ResolverArgs, &ResolverContext<'_>) -> Result<Value> + Send + Sync,
{
    async fn resolve(&self, args: &ResolverArgs, ctx: &ResolverContext<'_>) -> Result<Value> {
        (self.0)(args, ctx)
    }
}

/// Arguments passed to a resolver, in the order they appear in the query
#[derive(Debug, Clone, Default)]
pub struct ResolverArgs {
    values: IndexMap<String, InputValue>,
}

impl ResolverArgs {
    pub fn new(values: IndexMap<String, InputValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&InputValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InputValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get a string argument
    pub fn str(&self, name: &str) -> Result<&str> {
        self.get(name)
            .and_then(InputValue::as_str)
            .ok_or_else(|| anyhow!("Argument '{}' must be a string", name))
    }

    /// Get an uploaded file argument
    pub fn upload(&self, name: &str) -> Result<&Arc<FileUpload>> {
        match self.get(name) {
            Some(InputValue::Upload(upload)) => Ok(upload),
            Some(_) => Err(anyhow!("Argument '{}' is not an uploaded file", name)),
            None => Err(anyhow!("Missing required argument '{}'", name)),
        }
    }

    /// Get a list of uploaded files, in list order
    pub fn uploads(&self, name: &str) -> Result<Vec<&Arc<FileUpload>>> {
        let items = match self.get(name) {
            Some(InputValue::List(items)) => items,
            Some(_) => return Err(anyhow!("Argument '{}' is not a list", name)),
            None => return Err(anyhow!("Missing required argument '{}'", name)),
        };

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_upload()
                    .ok_or_else(|| anyhow!("Argument '{}[{}]' is not an uploaded file", name, i))
            })
            .collect()
    }
}

/// Where a resolver is being invoked
#[derive(Debug, Clone)]
pub struct ResolverContext<'a> {
    /// Type owning the field ("Query", "Mutation", or a `__typename`)
    pub type_name: &'a str,
    /// Field name (not the alias)
    pub field_name: &'a str,
    /// Parent object for nested fields, `None` at the root
    pub source: Option<&'a Value>,
    /// Name of the executing operation, if any
    pub operation_name: Option<&'a str>,
    /// `extensions` object sent with the operation
    pub extensions: &'a serde_json::Map<String, Value>,
    /// Response path of the field
    pub path: &'a [Value],
}

/// Registry of resolvers keyed by `(type name, field name)`
///
/// Stored per type so lookups borrow the names from the query document.
#[derive(Default, Clone)]
pub struct ResolverRegistry {
    types: HashMap<String, HashMap<String, Arc<dyn Resolver>>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver, replacing any previous one for the same field
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        resolver: impl Resolver + 'static,
    ) {
        self.types
            .entry(type_name.into())
            .or_default()
            .insert(field_name.into(), Arc::new(resolver));
    }

    /// Register a synchronous closure
    pub fn register_fn<F>(
        &mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        f: F,
    ) where
        F: Fn(&ResolverArgs, &ResolverContext<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.register(type_name, field_name, FnResolver(f));
    }

    pub fn get(&self, type_name: &str, field_name: &str) -> Option<&Arc<dyn Resolver>> {
        self.types.get(type_name)?.get(field_name)
    }

    pub fn contains(&self, type_name: &str, field_name: &str) -> bool {
        self.get(type_name, field_name).is_some()
    }

    /// Distinct type names with at least one resolver, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered fields across all types
    pub fn len(&self) -> usize {
        self.types.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.types.values().all(HashMap::is_empty)
    }
}
