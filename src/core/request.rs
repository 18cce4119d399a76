//! GraphQL operation requests
//!
//! Both plain JSON bodies and the `operations` part of a multipart body are
//! parsed here into [`GraphQLBatch`].

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use super::error::DecodeError;
use super::value::InputValue;

/// A single GraphQL operation ready for execution
#[derive(Debug, Clone)]
pub struct OperationRequest {
    pub query: String,
    pub operation_name: Option<String>,
    pub variables: IndexMap<String, InputValue>,
    pub extensions: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOperation {
    query: Option<String>,
    #[serde(default)]
    operation_name: Option<String>,
    #[serde(default)]
    variables: Option<serde_json::Map<String, Value>>,
    #[serde(default)]
    extensions: Option<serde_json::Map<String, Value>>,
}

impl OperationRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: None,
            variables: IndexMap::new(),
            extensions: serde_json::Map::new(),
        }
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Parse a single operation object
    ///
    /// `index` is the position inside a batch, used in error messages only.
    pub fn from_json(value: Value, index: Option<usize>) -> Result<Self, DecodeError> {
        let location = match index {
            Some(i) => format!("operation {}", i),
            None => "operation".to_string(),
        };

        if !value.is_object() {
            return Err(DecodeError::InvalidOperations {
                message: format!("{} must be a JSON object", location),
            });
        }

        let raw: RawOperation =
            serde_json::from_value(value).map_err(|e| DecodeError::InvalidOperations {
                message: format!("{}: {}", location, e),
            })?;

        let query = raw.query.ok_or_else(|| DecodeError::InvalidOperations {
            message: format!("{} is missing 'query'", location),
        })?;

        let variables = raw
            .variables
            .unwrap_or_default()
            .into_iter()
            .map(|(k, v)| (k, InputValue::from(v)))
            .collect();

        Ok(Self {
            query,
            operation_name: raw.operation_name,
            variables,
            extensions: raw.extensions.unwrap_or_default(),
        })
    }
}

/// One operation, or an ordered batch of operations
#[derive(Debug, Clone)]
pub enum GraphQLBatch {
    Single(OperationRequest),
    Batch(Vec<OperationRequest>),
}

impl GraphQLBatch {
    /// Parse an `operations` document: an object or a non-empty array of objects
    pub fn from_json(value: Value) -> Result<Self, DecodeError> {
        match value {
            Value::Array(items) => {
                if items.is_empty() {
                    return Err(DecodeError::InvalidOperations {
                        message: "batch must contain at least one operation".to_string(),
                    });
                }
                let operations = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| OperationRequest::from_json(item, Some(i)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(GraphQLBatch::Batch(operations))
            }
            other => Ok(GraphQLBatch::Single(OperationRequest::from_json(
                other, None,
            )?)),
        }
    }

    /// Parse raw bytes of an `operations` document
    pub fn from_slice(part: &str, bytes: &[u8]) -> Result<Self, DecodeError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| DecodeError::invalid_json(part, e))?;
        Self::from_json(value)
    }

    pub fn is_batched(&self) -> bool {
        matches!(self, GraphQLBatch::Batch(_))
    }

    /// Operations in batch order
    pub fn operations(&self) -> &[OperationRequest] {
        match self {
            GraphQLBatch::Single(op) => std::slice::from_ref(op),
            GraphQLBatch::Batch(ops) => ops,
        }
    }

    pub(crate) fn operations_mut(&mut self) -> &mut [OperationRequest] {
        match self {
            GraphQLBatch::Single(op) => std::slice::from_mut(op),
            GraphQLBatch::Batch(ops) => ops,
        }
    }
}
