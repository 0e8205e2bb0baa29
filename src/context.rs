//! Render context passed through to the template engine

use serde::Serialize;
use serde_json::{Map, Value};

/// Key-value data substituted into a template at render time.
///
/// The context is an ordinary JSON object handed to the engine unchanged; the
/// pipeline never inspects or transforms it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RenderContext {
    values: Map<String, Value>,
}

impl RenderContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value under `key`, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Build a context from any serializable value.
    ///
    /// Fails when the value does not serialize to a JSON object.
    pub fn from_serialize(value: impl Serialize) -> Result<Self, serde_json::Error> {
        use serde::de::Error;

        match serde_json::to_value(value)? {
            Value::Object(values) => Ok(Self { values }),
            other => Err(serde_json::Error::custom(format!(
                "render context must be a map, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Look up a value by key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Whether the context holds no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of top-level keys
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a map",
    }
}
