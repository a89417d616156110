//! Schema registration and the parse algorithm
//!
//! A [`Schema`] holds the field table and strictness policy for one target
//! type. It is built once through [`SchemaBuilder`] and immutable
//! afterwards, so concurrent parses against the same schema are safe.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::coerce::{BooleanParser, TypeParser};
use crate::error::{MappingError, Result};
use crate::field::{Cardinality, FieldDescriptor, FieldOptions};
use crate::object::Object;

/// The set of field descriptors and strictness policy for one target type.
///
/// Cheap to clone; clones share the same immutable registration, which is
/// what lets a schema double as the coercion collaborator of another
/// schema's nested field.
#[derive(Debug, Clone)]
pub struct Schema {
    inner: Arc<SchemaInner>,
}

#[derive(Debug)]
struct SchemaInner {
    type_name: String,
    strict: bool,
    fields: Vec<FieldDescriptor>,
    /// Every key that can reach a field: the field name and, when distinct,
    /// the source-key alias. Both point at the same slot in `fields`.
    index: HashMap<String, usize>,
}

impl Schema {
    /// Start registering fields for a target type.
    pub fn builder(type_name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            type_name: type_name.into(),
            strict: true,
            fields: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// The target type's name, as used in error messages.
    pub fn type_name(&self) -> &str {
        &self.inner.type_name
    }

    /// Whether unmapped input keys are fatal.
    pub fn is_strict(&self) -> bool {
        self.inner.strict
    }

    /// Look up a descriptor by its field name (aliases do not resolve here).
    pub fn field(&self, field_name: &str) -> Option<&FieldDescriptor> {
        self.inner
            .index
            .get(field_name)
            .map(|&slot| &self.inner.fields[slot])
            .filter(|descriptor| descriptor.field_name() == field_name)
    }

    /// The registered descriptors, one per field.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.inner.fields.iter()
    }

    /// Unpack an untyped mapping into a validated [`Object`].
    ///
    /// Input keys are resolved to descriptors in the mapping's own
    /// iteration order and coerced; fields absent under both their field
    /// name and alias are then defaulted, failing on the first required
    /// field without a value. Explicit values always win over defaults.
    /// Any error aborts the whole parse; a partially populated object
    /// never escapes.
    pub fn parse(&self, input: &Value) -> Result<Object> {
        let mapping = input.as_object().ok_or_else(|| {
            MappingError::InvalidInput(format!(
                "'{}' requires a mapping to parse, got {}",
                self.inner.type_name,
                json_kind(input)
            ))
        })?;

        let mut values = Map::new();
        // One mark per descriptor slot covers both keys that can reach it,
        // so a field populated through its alias is not re-defaulted.
        let mut satisfied = vec![false; self.inner.fields.len()];

        for (key, raw) in mapping {
            match self.inner.index.get(key) {
                Some(&slot) => {
                    self.inner.fields[slot].apply(&mut values, raw, &self.inner.type_name)?;
                    satisfied[slot] = true;
                }
                None if self.inner.strict => {
                    return Err(MappingError::UnsupportedAttribute {
                        key: key.clone(),
                        value: raw.clone(),
                        type_name: self.inner.type_name.clone(),
                    });
                }
                None => {
                    debug!(key = %key, type_name = %self.inner.type_name, "ignoring unmapped key");
                }
            }
        }

        for (slot, descriptor) in self.inner.fields.iter().enumerate() {
            if !satisfied[slot] {
                descriptor.apply_default(&mut values, &self.inner.type_name)?;
            }
        }

        Ok(Object::new(self.clone(), values))
    }
}

/// A schema is itself a coercion collaborator: nested fields declared with
/// `parser(other_schema)` recurse into this same algorithm, and the nested
/// object flattens back into a field-name-keyed value.
impl TypeParser for Schema {
    fn parse(&self, raw: &Value) -> Result<Value> {
        Schema::parse(self, raw).map(Object::into_value)
    }

    fn type_name(&self) -> &str {
        &self.inner.type_name
    }
}

/// Registration-time builder for a [`Schema`].
///
/// Field-declaring methods validate the field spec immediately and are
/// chainable with `?`:
///
/// ```
/// use reify::{FieldOptions, Schema};
/// use serde_json::json;
///
/// # fn main() -> reify::Result<()> {
/// let person = Schema::builder("Person")
///     .field("name", FieldOptions::new())?
///     .many("aliases", FieldOptions::new().required(false).default_with(|| json!([])))?
///     .boolean("admin", FieldOptions::new().required(false).default_value(false))?
///     .build();
///
/// let bob = person.parse(&json!({ "name": "bob" }))?;
/// assert_eq!(bob.get("name"), Some(&json!("bob")));
/// assert_eq!(bob.get("aliases"), Some(&json!([])));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SchemaBuilder {
    type_name: String,
    strict: bool,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl SchemaBuilder {
    /// Declare one field. Re-declaring a field name overwrites the earlier
    /// descriptor, it does not accumulate.
    pub fn field(mut self, field_name: &str, options: FieldOptions) -> Result<Self> {
        let descriptor = FieldDescriptor::new(field_name, options)?;
        self.insert(descriptor);
        Ok(self)
    }

    /// Declare a field normalized by [`BooleanParser`]. Write-only unless
    /// the options say otherwise, since a flag is usually queried through
    /// [`Object::is_set`](crate::Object::is_set) rather than read.
    pub fn boolean(self, field_name: &str, options: FieldOptions) -> Result<Self> {
        if options.parser.is_some() || options.builder.is_some() {
            return Err(MappingError::InvalidFieldSpec {
                field: field_name.to_string(),
                reason: "boolean fields always coerce through the boolean parser".to_string(),
            });
        }
        let readable = options.readable.unwrap_or(false);
        let options = FieldOptions {
            parser: Some(Arc::new(BooleanParser)),
            cardinality: Some(Cardinality::Single),
            readable: Some(readable),
            ..options
        };
        self.field(field_name, options)
    }

    /// Declare a sequence field: the coercion is mapped over every element
    /// of the raw value.
    pub fn many(self, field_name: &str, options: FieldOptions) -> Result<Self> {
        let options = FieldOptions {
            cardinality: Some(Cardinality::Many),
            ..options
        };
        self.field(field_name, options)
    }

    /// Unmapped input keys: fatal when strict (the default), silently
    /// dropped when not.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Seal the registration.
    pub fn build(self) -> Schema {
        Schema {
            inner: Arc::new(SchemaInner {
                type_name: self.type_name,
                strict: self.strict,
                fields: self.fields,
                index: self.index,
            }),
        }
    }

    fn insert(&mut self, descriptor: FieldDescriptor) {
        if let Some(&slot) = self.index.get(descriptor.field_name()) {
            // Overwrite in place, dropping the old descriptor's alias key
            // so it cannot resolve to stale metadata.
            if let Some(old_alias) = self.fields[slot].source_key() {
                let old_alias = old_alias.to_string();
                self.index.remove(&old_alias);
            }
            if let Some(alias) = descriptor.source_key() {
                self.index.insert(alias.to_string(), slot);
            }
            self.fields[slot] = descriptor;
        } else {
            let slot = self.fields.len();
            self.index.insert(descriptor.field_name().to_string(), slot);
            if let Some(alias) = descriptor.source_key() {
                self.index.insert(alias.to_string(), slot);
            }
            self.fields.push(descriptor);
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
