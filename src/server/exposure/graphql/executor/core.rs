//! Core GraphQL executor orchestration

use futures::future::join_all;
use graphql_parser::query::{
    Definition, Document, OperationDefinition, VariableDefinition, parse_query,
};
use indexmap::IndexMap;
use std::sync::Arc;

use super::field_resolver::{ExecutionContext, execute_selection_set};
use super::utils;
use crate::core::error::GraphQLError;
use crate::core::request::{GraphQLBatch, OperationRequest};
use crate::core::resolver::ResolverRegistry;
use crate::core::response::{BatchResponse, GraphQLResponse, ResponseError};
use crate::core::value::InputValue;

/// GraphQL executor dispatching fields to a [`ResolverRegistry`]
pub struct GraphQLExecutor {
    registry: Arc<ResolverRegistry>,
}

impl GraphQLExecutor {
    /// Create a new executor over the given registry
    pub fn new(registry: Arc<ResolverRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ResolverRegistry {
        &self.registry
    }

    /// Execute one operation
    ///
    /// Never fails: request-level problems (parse errors, no runnable
    /// operation) produce a response without `data`, field-level problems a
    /// `null` field plus an `errors` entry.
    pub async fn execute(&self, request: &OperationRequest) -> GraphQLResponse {
        match self.execute_request(request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(error = %error, "GraphQL request error");
                GraphQLResponse::from_error(
                    ResponseError::new(error.to_string()).with_code(error.error_code()),
                )
            }
        }
    }

    /// Execute every operation of a batch
    ///
    /// Operations run concurrently; responses keep the position of their
    /// operation.
    pub async fn execute_batch(&self, batch: &GraphQLBatch) -> BatchResponse {
        match batch {
            GraphQLBatch::Single(operation) => BatchResponse::Single(self.execute(operation).await),
            GraphQLBatch::Batch(operations) => BatchResponse::Batch(
                join_all(operations.iter().map(|operation| self.execute(operation))).await,
            ),
        }
    }

    async fn execute_request(
        &self,
        request: &OperationRequest,
    ) -> Result<GraphQLResponse, GraphQLError> {
        let doc = parse_query::<String>(&request.query).map_err(|e| GraphQLError::ParseError {
            message: e.to_string(),
        })?;

        let operation = select_operation(&doc, request.operation_name.as_deref())?;
        let (root_type, variable_definitions, selection_set) = match operation {
            OperationDefinition::Query(query) => (
                "Query",
                query.variable_definitions.as_slice(),
                &query.selection_set,
            ),
            OperationDefinition::Mutation(mutation) => (
                "Mutation",
                mutation.variable_definitions.as_slice(),
                &mutation.selection_set,
            ),
            OperationDefinition::SelectionSet(selection_set) => ("Query", &[][..], selection_set),
            OperationDefinition::Subscription(subscription) => {
                return Err(GraphQLError::InvalidOperation {
                    operation: subscription
                        .name
                        .clone()
                        .unwrap_or_else(|| "<anonymous>".to_string()),
                    message: "Subscriptions are not supported".to_string(),
                });
            }
        };

        tracing::debug!(
            operation = ?request.operation_name,
            root = root_type,
            "Executing GraphQL operation"
        );

        let ctx = ExecutionContext {
            registry: self.registry.as_ref(),
            fragments: doc
                .definitions
                .iter()
                .filter_map(|def| match def {
                    Definition::Fragment(fragment) => Some((fragment.name.as_str(), fragment)),
                    Definition::Operation(_) => None,
                })
                .collect(),
            variables: coerce_variables(variable_definitions, &request.variables),
            operation_name: request.operation_name.as_deref(),
            extensions: &request.extensions,
        };

        let mut errors = Vec::new();
        let data = execute_selection_set(
            &ctx,
            &mut errors,
            Some(root_type),
            None,
            &selection_set.items,
            &[],
        )
        .await;

        Ok(GraphQLResponse {
            data: Some(data),
            errors,
        })
    }
}

fn operation_name<'d>(operation: &'d OperationDefinition<'_, String>) -> Option<&'d str> {
    match operation {
        OperationDefinition::Query(q) => q.name.as_deref(),
        OperationDefinition::Mutation(m) => m.name.as_deref(),
        OperationDefinition::Subscription(s) => s.name.as_deref(),
        OperationDefinition::SelectionSet(_) => None,
    }
}

/// Pick the operation to run
fn select_operation<'d, 'q>(
    doc: &'d Document<'q, String>,
    name: Option<&str>,
) -> Result<&'d OperationDefinition<'q, String>, GraphQLError> {
    let operations: Vec<&'d OperationDefinition<'q, String>> = doc
        .definitions
        .iter()
        .filter_map(|def| match def {
            Definition::Operation(op) => Some(op),
            Definition::Fragment(_) => None,
        })
        .collect();

    match name {
        Some(name) => operations
            .into_iter()
            .find(|op| operation_name(op) == Some(name))
            .ok_or_else(|| GraphQLError::InvalidOperation {
                operation: name.to_string(),
                message: "Unknown operation".to_string(),
            }),
        None => match operations.as_slice() {
            &[op] => Ok(op),
            [] => Err(GraphQLError::InvalidOperation {
                operation: "<anonymous>".to_string(),
                message: "No operation found in query".to_string(),
            }),
            _ => Err(GraphQLError::InvalidOperation {
                operation: "<anonymous>".to_string(),
                message: "Must provide operation name if query contains multiple operations"
                    .to_string(),
            }),
        },
    }
}

/// Values of the declared variables, falling back to their defaults
fn coerce_variables(
    definitions: &[VariableDefinition<'_, String>],
    provided: &IndexMap<String, InputValue>,
) -> IndexMap<String, InputValue> {
    let no_variables = IndexMap::new();
    definitions
        .iter()
        .filter_map(|def| {
            let value = match provided.get(&def.name) {
                Some(value) => value.clone(),
                None => utils::value_to_input(def.default_value.as_ref()?, &no_variables),
            };
            Some((def.name.clone(), value))
        })
        .collect()
}
