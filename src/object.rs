//! Parsed instances: validated, defaulted views of an input mapping

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::registry::Schema;

/// A validated instance produced by [`Schema::parse`].
///
/// Values are keyed by field name, with coercions applied and defaults
/// filled in. The object carries its schema, so per-field metadata drives
/// the accessor surface: write-only fields hide from [`get`](Object::get),
/// and [`is_set`](Object::is_set) follows each field's cardinality.
/// Strongly-typed domain structs are obtained via
/// [`deserialize`](Object::deserialize).
#[derive(Debug, Clone)]
pub struct Object {
    schema: Schema,
    values: Map<String, Value>,
}

impl Object {
    pub(crate) fn new(schema: Schema, values: Map<String, Value>) -> Self {
        Self { schema, values }
    }

    /// The owning type's name.
    pub fn type_name(&self) -> &str {
        self.schema.type_name()
    }

    /// Read a field's value by field name. Returns `None` for unknown
    /// fields and for fields declared write-only.
    pub fn get(&self, field_name: &str) -> Option<&Value> {
        let descriptor = self.schema.field(field_name)?;
        if !descriptor.is_readable() {
            return None;
        }
        self.values.get(field_name)
    }

    /// Whether the field holds a set value: truthiness for a Single field,
    /// non-empty sequence for a Many field. Works on write-only fields too.
    pub fn is_set(&self, field_name: &str) -> bool {
        match (self.schema.field(field_name), self.values.get(field_name)) {
            (Some(descriptor), Some(value)) => descriptor.is_populated(value),
            _ => false,
        }
    }

    /// All stored fields as a field-name-keyed mapping, write-only fields
    /// included.
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    /// Consume the object into its field-name-keyed mapping.
    pub fn into_value(self) -> Value {
        Value::Object(self.values)
    }

    /// Deserialize into a typed struct via serde.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_value())?)
    }
}
