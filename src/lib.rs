//! Declarative Schema-to-Object Mapping
//!
//! Converts untyped key/value mappings (JSON/YAML parsed into
//! `serde_json::Value`) into validated, defaulted objects according to a
//! per-type schema registered once up front.
//!
//! ## Features
//!
//! - **Field Descriptors**: per-field source-key alias, cardinality,
//!   required-ness, lazy defaults, and coercion strategy
//! - **Strict or Lenient**: unknown input keys fail by default, or are
//!   silently dropped per schema
//! - **Nested Schemas**: a schema is itself a coercion collaborator, so
//!   mappings nest to any depth with errors propagating unchanged
//! - **Typed Bridge**: parsed objects deserialize into domain structs via
//!   serde
//!
//! ## Example
//!
//! ```
//! use reify::{FieldOptions, Schema};
//! use serde_json::json;
//!
//! # fn main() -> reify::Result<()> {
//! let address = Schema::builder("Address")
//!     .field("street", FieldOptions::new())?
//!     .strict(false)
//!     .build();
//!
//! let person = Schema::builder("Person")
//!     .field("name", FieldOptions::new())?
//!     .many("addresses", FieldOptions::new().required(false).parser(address))?
//!     .build();
//!
//! let bob = person.parse(&json!({
//!     "name": "bob",
//!     "addresses": [{ "street": "1 Main St" }],
//! }))?;
//! assert_eq!(bob.get("addresses").unwrap()[0]["street"], json!("1 Main St"));
//! # Ok(())
//! # }
//! ```
//!
//! Schemas are built during program initialization and are immutable
//! afterwards; every field must be declared before the first `parse` call.

pub mod coerce;
pub mod error;
pub mod field;
pub mod object;
pub mod registry;

pub use coerce::{BooleanParser, BuilderFn, TypeParser};
pub use error::{MappingError, Result};
pub use field::{Cardinality, FieldDefault, FieldDescriptor, FieldOptions};
pub use object::Object;
pub use registry::{Schema, SchemaBuilder};
