//! Field descriptors: per-field metadata and coercion dispatch

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::coerce::{BuilderFn, TypeParser};
use crate::error::{MappingError, Result};

/// Whether a field holds one coerced value or a sequence of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    /// The raw value is coerced once.
    #[default]
    Single,
    /// The raw value is a sequence; the coercion is mapped over each element.
    Many,
}

/// A field's fallback when its keys are absent from the input.
#[derive(Clone)]
pub enum FieldDefault {
    /// A concrete value, cloned on every resolution.
    Value(Value),
    /// A producer invoked on every resolution. Never cached, so two parses
    /// of the same schema never share a default instance.
    Producer(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldDefault::Value(v) => f.debug_tuple("Value").field(v).finish(),
            FieldDefault::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// The transformation applied to a raw value before storage.
#[derive(Clone, Default)]
pub enum Coercion {
    /// Store the raw value unchanged.
    #[default]
    None,
    /// Delegate to a type-like collaborator's `parse`.
    Parser(Arc<dyn TypeParser>),
    /// Delegate to a builder function.
    Builder(BuilderFn),
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coercion::None => f.write_str("None"),
            Coercion::Parser(p) => write!(f, "Parser({})", p.type_name()),
            Coercion::Builder(_) => f.write_str("Builder(..)"),
        }
    }
}

/// The recognized per-field options, each independently optional.
///
/// Unset options fall back to the descriptor defaults: `required` true,
/// `readable` true, cardinality [`Single`](Cardinality::Single), no alias,
/// no default, pass-through coercion.
#[derive(Clone, Default)]
pub struct FieldOptions {
    pub(crate) required: Option<bool>,
    pub(crate) default: Option<FieldDefault>,
    pub(crate) parser: Option<Arc<dyn TypeParser>>,
    pub(crate) builder: Option<BuilderFn>,
    pub(crate) cardinality: Option<Cardinality>,
    pub(crate) source_key: Option<String>,
    pub(crate) readable: Option<bool>,
}

impl FieldOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether absence of the field is fatal. Defaults to `true`.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// A concrete default value, cloned each time it is needed.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(FieldDefault::Value(value.into()));
        self
    }

    /// A default producer, invoked each time a default is needed.
    pub fn default_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(FieldDefault::Producer(Arc::new(producer)));
        self
    }

    /// Coerce through a type-like collaborator, e.g. a nested
    /// [`Schema`](crate::Schema). Mutually exclusive with [`builder`](Self::builder).
    pub fn parser<P: TypeParser + 'static>(mut self, parser: P) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Coerce through a builder function. Mutually exclusive with
    /// [`parser`](Self::parser).
    pub fn builder<F>(mut self, builder: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.builder = Some(Arc::new(builder));
        self
    }

    /// Coerce element-wise over a sequence instead of once.
    pub fn many(mut self) -> Self {
        self.cardinality = Some(Cardinality::Many);
        self
    }

    /// The key expected in the input mapping, when it differs from the
    /// field name (e.g. a differently-cased external name).
    pub fn source_key(mut self, key: impl Into<String>) -> Self {
        self.source_key = Some(key.into());
        self
    }

    /// Whether the field is exposed through [`Object::get`](crate::Object::get).
    /// A write-only field is still stored and still serialized.
    pub fn readable(mut self, readable: bool) -> Self {
        self.readable = Some(readable);
        self
    }
}

/// Immutable metadata for one mapped field of a target type.
#[derive(Clone)]
pub struct FieldDescriptor {
    field_name: String,
    source_key: Option<String>,
    cardinality: Cardinality,
    required: bool,
    default: Option<FieldDefault>,
    coercion: Coercion,
    readable: bool,
}

impl FieldDescriptor {
    /// Build a descriptor from its options, validating the coercion spec
    /// immediately rather than at first parse.
    pub(crate) fn new(field_name: &str, options: FieldOptions) -> Result<Self> {
        let coercion = match (options.parser, options.builder) {
            (Some(_), Some(_)) => {
                return Err(MappingError::InvalidFieldSpec {
                    field: field_name.to_string(),
                    reason: "a type parser and a builder are mutually exclusive".to_string(),
                })
            }
            (Some(parser), None) => Coercion::Parser(parser),
            (None, Some(builder)) => Coercion::Builder(builder),
            (None, None) => Coercion::None,
        };

        Ok(Self {
            field_name: field_name.to_string(),
            // An alias identical to the field name is no alias at all.
            source_key: options.source_key.filter(|k| k != field_name),
            cardinality: options.cardinality.unwrap_or_default(),
            required: options.required.unwrap_or(true),
            default: options.default,
            coercion,
            readable: options.readable.unwrap_or(true),
        })
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The alias key, when one was declared and differs from the field name.
    pub fn source_key(&self) -> Option<&str> {
        self.source_key.as_deref()
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    /// Coerce `raw` per cardinality and store it under the field name.
    pub(crate) fn apply(
        &self,
        out: &mut Map<String, Value>,
        raw: &Value,
        type_name: &str,
    ) -> Result<()> {
        let value = match self.cardinality {
            Cardinality::Single => self.coerce(raw)?,
            Cardinality::Many => {
                let items = raw.as_array().ok_or_else(|| {
                    MappingError::InvalidInput(format!(
                        "field '{}' of '{}' expects a sequence",
                        self.field_name, type_name
                    ))
                })?;
                let coerced = items
                    .iter()
                    .map(|item| self.coerce(item))
                    .collect::<Result<Vec<_>>>()?;
                Value::Array(coerced)
            }
        };
        out.insert(self.field_name.clone(), value);
        Ok(())
    }

    /// Store the resolved default, or fail if the field is required.
    /// Required-ness is checked first: a required field is never defaulted,
    /// even when a default was declared.
    pub(crate) fn apply_default(&self, out: &mut Map<String, Value>, type_name: &str) -> Result<()> {
        if self.required {
            return Err(MappingError::MissingRequiredField {
                field: self.field_name.clone(),
                type_name: type_name.to_string(),
            });
        }
        out.insert(self.field_name.clone(), self.resolve_default());
        Ok(())
    }

    /// Resolve the fallback value, invoking a producer anew on every call.
    pub fn resolve_default(&self) -> Value {
        match &self.default {
            Some(FieldDefault::Value(value)) => value.clone(),
            Some(FieldDefault::Producer(producer)) => producer(),
            None => Value::Null,
        }
    }

    /// Whether a stored value counts as set for this field: truthiness for
    /// a Single field, non-empty sequence for a Many field.
    pub(crate) fn is_populated(&self, value: &Value) -> bool {
        match self.cardinality {
            Cardinality::Single => !matches!(value, Value::Null | Value::Bool(false)),
            Cardinality::Many => value.as_array().is_some_and(|items| !items.is_empty()),
        }
    }

    fn coerce(&self, raw: &Value) -> Result<Value> {
        match &self.coercion {
            Coercion::None => Ok(raw.clone()),
            Coercion::Parser(parser) => parser.parse(raw),
            Coercion::Builder(builder) => builder(raw),
        }
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("field_name", &self.field_name)
            .field("source_key", &self.source_key)
            .field("cardinality", &self.cardinality)
            .field("required", &self.required)
            .field("default", &self.default)
            .field("coercion", &self.coercion)
            .field("readable", &self.readable)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_parser_and_builder_are_exclusive() {
        let options = FieldOptions::new()
            .parser(crate::BooleanParser)
            .builder(|raw| Ok(raw.clone()));
        let err = FieldDescriptor::new("flag", options).unwrap_err();
        assert!(matches!(
            err,
            MappingError::InvalidFieldSpec { ref field, .. } if field == "flag"
        ));
    }

    #[test]
    fn test_defaults_of_unset_options() {
        let descriptor = FieldDescriptor::new("name", FieldOptions::new()).unwrap();
        assert!(descriptor.is_required());
        assert!(descriptor.is_readable());
        assert_eq!(descriptor.cardinality(), Cardinality::Single);
        assert!(descriptor.source_key().is_none());
    }

    #[test]
    fn test_alias_equal_to_field_name_is_dropped() {
        let options = FieldOptions::new().source_key("name");
        let descriptor = FieldDescriptor::new("name", options).unwrap();
        assert!(descriptor.source_key().is_none());
    }

    #[test]
    fn test_producer_runs_on_every_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let options = FieldOptions::new().required(false).default_with(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            json!([])
        });
        let descriptor = FieldDescriptor::new("aliases", options).unwrap();

        assert_eq!(descriptor.resolve_default(), json!([]));
        assert_eq!(descriptor.resolve_default(), json!([]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_required_wins_over_default() {
        let options = FieldOptions::new().default_value("fallback");
        let descriptor = FieldDescriptor::new("name", options).unwrap();
        let mut out = Map::new();
        let err = descriptor.apply_default(&mut out, "Person").unwrap_err();
        assert!(matches!(err, MappingError::MissingRequiredField { .. }));
        assert!(out.is_empty());
    }

    #[test]
    fn test_many_rejects_non_sequence() {
        let options = FieldOptions::new().many();
        let descriptor = FieldDescriptor::new("tags", options).unwrap();
        let mut out = Map::new();
        let err = descriptor.apply(&mut out, &json!("solo"), "Person").unwrap_err();
        assert!(matches!(err, MappingError::InvalidInput(_)));
    }

    #[test]
    fn test_is_populated_by_cardinality() {
        let single = FieldDescriptor::new("name", FieldOptions::new()).unwrap();
        assert!(single.is_populated(&json!("bob")));
        assert!(single.is_populated(&json!(0)));
        assert!(!single.is_populated(&Value::Null));
        assert!(!single.is_populated(&json!(false)));

        let many = FieldDescriptor::new("tags", FieldOptions::new().many()).unwrap();
        assert!(many.is_populated(&json!(["a"])));
        assert!(!many.is_populated(&json!([])));
        assert!(!many.is_populated(&Value::Null));
    }
}
