//! Field resolution and result projection

use futures::future::{BoxFuture, FutureExt};
use graphql_parser::query::{Field, Selection};
use indexmap::IndexMap;
use serde_json::Value;

use super::utils::{self, Fragments};
use crate::core::error::GraphQLError;
use crate::core::resolver::{ResolverContext, ResolverRegistry};
use crate::core::response::ResponseError;
use crate::core::value::InputValue;

/// State shared by every field of one operation
pub(super) struct ExecutionContext<'d, 'q> {
    pub registry: &'d ResolverRegistry,
    pub fragments: Fragments<'d, 'q>,
    pub variables: IndexMap<String, InputValue>,
    pub operation_name: Option<&'d str>,
    pub extensions: &'d serde_json::Map<String, Value>,
}

/// Execute a selection set against a parent object (or a root type when
/// `source` is `None`)
pub(super) fn execute_selection_set<'a, 'q>(
    ctx: &'a ExecutionContext<'a, 'q>,
    errors: &'a mut Vec<ResponseError>,
    type_name: Option<&'a str>,
    source: Option<&'a Value>,
    selections: &'a [Selection<'q, String>],
    path: &'a [Value],
) -> BoxFuture<'a, Value> {
    async move {
        let fields = utils::collect_fields(selections, &ctx.fragments, &ctx.variables, type_name);
        let mut result = serde_json::Map::new();

        // Fields run one after another, which also keeps mutation root
        // fields serial.
        for field in fields {
            let key = utils::response_key(field);
            if result.contains_key(key) {
                continue;
            }

            let mut field_path = path.to_vec();
            field_path.push(Value::String(key.to_string()));

            let value =
                resolve_field(ctx, &mut *errors, type_name, source, field, &field_path).await;
            result.insert(key.to_string(), value);
        }

        Value::Object(result)
    }
    .boxed()
}

fn resolve_field<'a, 'q>(
    ctx: &'a ExecutionContext<'a, 'q>,
    errors: &'a mut Vec<ResponseError>,
    type_name: Option<&'a str>,
    source: Option<&'a Value>,
    field: &'a Field<'q, String>,
    path: &'a [Value],
) -> BoxFuture<'a, Value> {
    async move {
        let name = field.name.as_str();
        if name == "__typename" {
            return type_name.map_or(Value::Null, |t| Value::String(t.to_string()));
        }

        let resolver = type_name.and_then(|t| ctx.registry.get(t, name));
        let value = match (resolver, source) {
            (Some(resolver), _) => {
                let args = utils::field_arguments(field, &ctx.variables);
                let resolver_ctx = ResolverContext {
                    type_name: type_name.unwrap_or_default(),
                    field_name: name,
                    source,
                    operation_name: ctx.operation_name,
                    extensions: ctx.extensions,
                    path,
                };

                match resolver.resolve(&args, &resolver_ctx).await {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::debug!(field = %name, error = %e, "Resolver failed");
                        errors.push(
                            ResponseError::new(e.to_string()).with_path(path.to_vec()),
                        );
                        return Value::Null;
                    }
                }
            }
            (None, Some(Value::Object(object))) => object
                .get(name)
                .or_else(|| object.get(&utils::camel_to_snake(name)))
                .cloned()
                .unwrap_or(Value::Null),
            (None, _) => {
                let error = GraphQLError::FieldResolutionError {
                    field: name.to_string(),
                    message: format!(
                        "no resolver registered on type '{}'",
                        type_name.unwrap_or("<unknown>")
                    ),
                };
                errors.push(
                    ResponseError::new(error.to_string())
                        .with_path(path.to_vec())
                        .with_code(error.error_code()),
                );
                return Value::Null;
            }
        };

        complete_value(ctx, errors, value, &field.selection_set.items, path).await
    }
    .boxed()
}

/// Project a resolved value through the field's sub-selection
fn complete_value<'a, 'q>(
    ctx: &'a ExecutionContext<'a, 'q>,
    errors: &'a mut Vec<ResponseError>,
    value: Value,
    selections: &'a [Selection<'q, String>],
    path: &'a [Value],
) -> BoxFuture<'a, Value> {
    async move {
        if selections.is_empty() {
            return value;
        }

        match value {
            Value::Array(items) => {
                let mut completed = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    let mut item_path = path.to_vec();
                    item_path.push(Value::from(i));
                    completed
                        .push(complete_value(ctx, &mut *errors, item, selections, &item_path).await);
                }
                Value::Array(completed)
            }
            Value::Object(_) => {
                let type_name = value.get("__typename").and_then(Value::as_str);
                execute_selection_set(ctx, errors, type_name, Some(&value), selections, path).await
            }
            other => other,
        }
    }
    .boxed()
}
