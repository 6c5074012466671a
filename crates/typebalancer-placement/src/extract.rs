//! Type accessors
//!
//! The balancer never inspects items beyond their type tag. Callers hand it a
//! [`TypeAccessor`]: any `Fn(&T) -> Result<String>` closure, or a
//! [`FieldAccessor`] for JSON objects. Accessor errors are reported against
//! index 0 and re-indexed by the caller that knows the item's position.

use serde_json::Value;
use std::collections::HashMap;
use typebalancer_common::{Error, Result};

/// Resolves the type tag of an item
pub trait TypeAccessor<T: ?Sized> {
    /// Type tag of `item`
    ///
    /// # Errors
    /// `MissingType` when the tag cannot be resolved.
    fn type_of(&self, item: &T) -> Result<String>;
}

impl<T: ?Sized, F> TypeAccessor<T> for F
where
    F: Fn(&T) -> Result<String>,
{
    fn type_of(&self, item: &T) -> Result<String> {
        self(item)
    }
}

/// Reads the type tag from a named key of a JSON object.
///
/// Strings are used as-is; numbers and booleans are stringified. Missing
/// keys, `null`, nested values and non-object items cannot be resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldAccessor {
    field: String,
}

impl FieldAccessor {
    /// Accessor for the key `field`
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
        }
    }

    /// Key this accessor reads
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl TypeAccessor<Value> for FieldAccessor {
    fn type_of(&self, item: &Value) -> Result<String> {
        let Value::Object(map) = item else {
            return Err(Error::missing_type(
                0,
                format!("item is not an object, cannot read '{}'", self.field),
            ));
        };

        match map.get(&self.field) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            Some(Value::Bool(b)) => Ok(b.to_string()),
            Some(Value::Null) | None => Err(Error::missing_type(
                0,
                format!("field '{}' is missing", self.field),
            )),
            Some(_) => Err(Error::missing_type(
                0,
                format!("field '{}' is not a scalar", self.field),
            )),
        }
    }
}

/// Caller-owned lookup table of field accessors, keyed by field name.
///
/// It stands in for a process-wide accessor registry: a caller builds one per
/// call or request and hands it to
/// [`Balancer::balance_by_field`](crate::Balancer::balance_by_field). A
/// lookup of a known field returns the stored accessor without allocating.
#[derive(Debug, Default)]
pub struct AccessorCache {
    accessors: HashMap<String, FieldAccessor>,
}

impl AccessorCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accessor for `field`, created on first use
    pub fn get(&mut self, field: &str) -> &FieldAccessor {
        if !self.accessors.contains_key(field) {
            self.accessors
                .insert(field.to_string(), FieldAccessor::new(field));
        }
        &self.accessors[field]
    }

    /// Number of stored accessors
    #[must_use]
    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    /// Whether no accessor has been stored yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }

    /// Drop every stored accessor
    pub fn clear(&mut self) {
        self.accessors.clear();
    }
}
