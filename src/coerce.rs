//! Coercion contracts and the built-in boolean converter

use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;

/// The capability a type-like coercion collaborator exposes.
///
/// Anything that can turn one raw value into its coerced form can back a
/// field: nested [`Schema`](crate::Schema)s implement this trait, as does
/// [`BooleanParser`]. Implementations may fail with a
/// [`MappingError`](crate::MappingError) for structurally bad input, which
/// propagates unchanged to the outermost caller.
pub trait TypeParser: Send + Sync {
    /// Parse one raw value into its coerced form.
    fn parse(&self, raw: &Value) -> Result<Value>;

    /// Name used in diagnostics.
    fn type_name(&self) -> &str {
        "parser"
    }
}

/// A builder function: single-argument coercion with no contract beyond
/// "may fail".
pub type BuilderFn = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// Normalizes loosely-typed input into a boolean.
///
/// The string `"false"` and numeric zero map to `false`; everything else
/// follows plain truthiness, where `null` and `false` are the only falsey
/// values. Note that `""` and `"0"` are therefore `true`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanParser;

impl TypeParser for BooleanParser {
    fn parse(&self, raw: &Value) -> Result<Value> {
        let truthy = match raw {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::String(s) => s != "false",
            Value::Number(n) => n.as_f64() != Some(0.0),
            _ => true,
        };
        Ok(Value::Bool(truthy))
    }

    fn type_name(&self) -> &str {
        "boolean"
    }
}
