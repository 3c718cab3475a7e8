use serde_json::{Map, Number, Value};

/// A decoded JSON node
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Vec<JsonValue>),
    Mapping(Vec<(String, JsonValue)>),
}

impl JsonValue {
    /// Field lookup on a mapping node. Returns `None` for other node kinds.
    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        match self {
            JsonValue::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, JsonValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            JsonValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            JsonValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            JsonValue::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            JsonValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[JsonValue]> {
        match self {
            JsonValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&[(String, JsonValue)]> {
        match self {
            JsonValue::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Short name of the node kind, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            JsonValue::Null => "null",
            JsonValue::Bool(_) => "boolean",
            JsonValue::Number(_) => "number",
            JsonValue::String(_) => "string",
            JsonValue::Sequence(_) => "sequence",
            JsonValue::Mapping(_) => "mapping",
        }
    }
}

impl From<Value> for JsonValue {
    fn from(value: Value) -> Self {
        decode(value)
    }
}

impl From<&JsonValue> for Value {
    fn from(value: &JsonValue) -> Self {
        encode(value)
    }
}

/// Convert a JSON document into a tree.
pub fn decode(value: Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(b),
        Value::Number(n) => JsonValue::Number(n),
        Value::String(s) => JsonValue::String(s),
        Value::Array(items) => JsonValue::Sequence(items.into_iter().map(decode).collect()),
        Value::Object(map) => {
            JsonValue::Mapping(map.into_iter().map(|(k, v)| (k, decode(v))).collect())
        }
    }
}

/// Convert a tree back into a JSON document.
pub fn encode(tree: &JsonValue) -> Value {
    match tree {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => Value::Number(n.clone()),
        JsonValue::String(s) => Value::String(s.clone()),
        JsonValue::Sequence(items) => Value::Array(items.iter().map(encode).collect()),
        JsonValue::Mapping(entries) => {
            let mut map = Map::with_capacity(entries.len());
            for (k, v) in entries {
                map.insert(k.clone(), encode(v));
            }
            Value::Object(map)
        }
    }
}
