//! GraphQL responses
//!
//! Execution never fails as a whole: problems are reported as entries of the
//! `errors` array, and a batch always yields one response per operation.

use serde::Serialize;
use serde_json::Value;

/// One entry of a GraphQL `errors` array
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl ResponseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            extensions: None,
        }
    }

    pub fn with_path(mut self, path: Vec<Value>) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.extensions = Some(serde_json::json!({ "code": code }));
        self
    }
}

/// Result of executing one operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphQLResponse {
    /// Absent when the operation could not start (parse or selection errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ResponseError>,
}

impl GraphQLResponse {
    pub fn from_data(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// A request error: no `data` key at all
    pub fn from_error(error: ResponseError) -> Self {
        Self {
            data: None,
            errors: vec![error],
        }
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Response to a whole HTTP request, positionally aligned with the batch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchResponse {
    Single(GraphQLResponse),
    Batch(Vec<GraphQLResponse>),
}

impl BatchResponse {
    pub fn is_batched(&self) -> bool {
        matches!(self, BatchResponse::Batch(_))
    }

    pub fn responses(&self) -> &[GraphQLResponse] {
        match self {
            BatchResponse::Single(r) => std::slice::from_ref(r),
            BatchResponse::Batch(rs) => rs,
        }
    }
}
