//! Variable and argument values
//!
//! [`InputValue`] is a JSON tree with one extra leaf kind: a handle to an
//! uploaded file. Variables decoded from a request start as plain JSON and
//! get `null` placeholders replaced with [`InputValue::Upload`] by the
//! multipart decoder.

use indexmap::IndexMap;
use serde_json::{Number, Value};
use std::sync::Arc;

use super::upload::FileUpload;

/// A GraphQL input value that may contain uploaded files
#[derive(Debug, Clone)]
pub enum InputValue {
    Null,
    Boolean(bool),
    Number(Number),
    String(String),
    List(Vec<InputValue>),
    Object(IndexMap<String, InputValue>),
    Upload(Arc<FileUpload>),
}

impl InputValue {
    pub fn is_null(&self) -> bool {
        matches!(self, InputValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            InputValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            InputValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            InputValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[InputValue]> {
        match self {
            InputValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, InputValue>> {
        match self {
            InputValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_upload(&self) -> Option<&Arc<FileUpload>> {
        match self {
            InputValue::Upload(upload) => Some(upload),
            _ => None,
        }
    }

    /// Render as JSON, uploads become their file name
    pub fn to_json(&self) -> Value {
        match self {
            InputValue::Null => Value::Null,
            InputValue::Boolean(b) => Value::Bool(*b),
            InputValue::Number(n) => Value::Number(n.clone()),
            InputValue::String(s) => Value::String(s.clone()),
            InputValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            InputValue::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            InputValue::Upload(upload) => Value::String(upload.file_name().to_string()),
        }
    }
}

impl From<Value> for InputValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => InputValue::Null,
            Value::Bool(b) => InputValue::Boolean(b),
            Value::Number(n) => InputValue::Number(n),
            Value::String(s) => InputValue::String(s),
            Value::Array(items) => InputValue::List(items.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                InputValue::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<Arc<FileUpload>> for InputValue {
    fn from(upload: Arc<FileUpload>) -> Self {
        InputValue::Upload(upload)
    }
}
