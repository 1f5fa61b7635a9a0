//! Declared parameter and result shapes.

use crate::context::Context;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Expected JSON type of a field or result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Any,
    Bool,
    Number,
    String,
    Array,
    Object,
    Null,
    Optional(Box<FieldType>),
}

impl FieldType {
    pub fn optional(inner: FieldType) -> Self {
        FieldType::Optional(Box::new(inner))
    }

    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::Any => true,
            FieldType::Bool => value.is_boolean(),
            FieldType::Number => value.is_number(),
            FieldType::String => value.is_string(),
            FieldType::Array => value.is_array(),
            FieldType::Object => value.is_object(),
            FieldType::Null => value.is_null(),
            FieldType::Optional(inner) => value.is_null() || inner.accepts(value),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Any => write!(f, "any"),
            FieldType::Bool => write!(f, "boolean"),
            FieldType::Number => write!(f, "number"),
            FieldType::String => write!(f, "string"),
            FieldType::Array => write!(f, "array"),
            FieldType::Object => write!(f, "object"),
            FieldType::Null => write!(f, "null"),
            FieldType::Optional(inner) => write!(f, "{}?", inner),
        }
    }
}

/// Parameter shape: field name to expected type.
///
/// An empty shape accepts any params.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    fields: BTreeMap<String, FieldType>,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.fields.insert(name.into(), ty);
        self
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldType> {
        &self.fields
    }

    /// Check `params` against the shape. On mismatch returns the first offending
    /// field and its expected type. Missing fields are checked as `null`.
    pub fn check(&self, params: &Value) -> Result<(), (String, FieldType)> {
        let object = params.as_object();
        for (name, ty) in &self.fields {
            let value = object.and_then(|o| o.get(name)).unwrap_or(&Value::Null);
            if !ty.accepts(value) {
                return Err((name.clone(), ty.clone()));
            }
        }
        Ok(())
    }
}

/// A shape given up front or computed from the invoking context.
pub enum ShapeSource<T> {
    Fixed(T),
    Lazy(Arc<dyn Fn(&Context) -> T + Send + Sync>),
}

impl<T: Clone> ShapeSource<T> {
    pub fn lazy(f: impl Fn(&Context) -> T + Send + Sync + 'static) -> Self {
        ShapeSource::Lazy(Arc::new(f))
    }

    pub fn resolve(&self, context: &Context) -> T {
        match self {
            ShapeSource::Fixed(shape) => shape.clone(),
            ShapeSource::Lazy(f) => f(context),
        }
    }
}

impl<T: Clone> Clone for ShapeSource<T> {
    fn clone(&self) -> Self {
        match self {
            ShapeSource::Fixed(shape) => ShapeSource::Fixed(shape.clone()),
            ShapeSource::Lazy(f) => ShapeSource::Lazy(Arc::clone(f)),
        }
    }
}

impl From<Shape> for ShapeSource<Shape> {
    fn from(shape: Shape) -> Self {
        ShapeSource::Fixed(shape)
    }
}

impl From<FieldType> for ShapeSource<FieldType> {
    fn from(ty: FieldType) -> Self {
        ShapeSource::Fixed(ty)
    }
}
