// Request body assembly.
//
// Optional arguments are only written into a body when they carry a
// value: `None`, empty strings, empty lists and zero counts are left
// out instead of being sent as `null`.

use serde_json::{Map, Value};

#[derive(Clone, Debug, Default)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn opt_str(mut self, key: &str, value: Option<&str>) -> Self {
        if let Some(v) = value.filter(|v| !v.is_empty()) {
            self.fields.insert(key.to_string(), Value::from(v));
        }
        self
    }

    pub fn opt_count(mut self, key: &str, value: Option<u32>) -> Self {
        if let Some(v) = value.filter(|v| *v > 0) {
            self.fields.insert(key.to_string(), Value::from(v));
        }
        self
    }

    /// Insert a nested object, skipped when it has no fields.
    pub fn opt_object(mut self, key: &str, value: Option<Map<String, Value>>) -> Self {
        if let Some(v) = value.filter(|m| !m.is_empty()) {
            self.fields.insert(key.to_string(), Value::Object(v));
        }
        self
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Addressing for the target FHIR store plus an on-behalf-of identity.
#[derive(Clone, Debug, Default)]
pub struct Meta {
    pub fhir_store_id: Option<String>,
    pub instance_name: Option<String>,
    pub on_behalf_of_email: Option<String>,
}

impl Meta {
    /// The `meta` object, or `None` when no field is set.
    pub fn to_map(&self) -> Option<Map<String, Value>> {
        let map = Payload::new()
            .opt_str("fhir_store_id", self.fhir_store_id.as_deref())
            .opt_str("instance_name", self.instance_name.as_deref())
            .opt_str("on_behalf_of_email", self.on_behalf_of_email.as_deref())
            .into_map();
        (!map.is_empty()).then_some(map)
    }
}

/// Read a string field, treating non-strings as absent.
pub(crate) fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

/// `success` as a bool; missing or non-bool counts as failure.
pub(crate) fn is_success(value: &Value) -> bool {
    value.get("success").and_then(Value::as_bool).unwrap_or(false)
}

/// First non-empty array among `keys`.
pub(crate) fn first_array<'a>(value: &'a Value, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .filter_map(|k| value.get(*k).and_then(Value::as_array))
        .find(|a| !a.is_empty())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Render a scalar id for display without JSON quoting.
pub(crate) fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "None".to_string(),
        Some(other) => other.to_string(),
    }
}

/// Failure text for an envelope: `message`, then `error`.
pub(crate) fn error_message(value: Option<&Value>) -> String {
    value
        .and_then(|v| str_field(v, "message").or_else(|| str_field(v, "error")))
        .unwrap_or("Unknown error")
        .to_string()
}
