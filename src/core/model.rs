//! Registry-driven model decoding.
//!
//! Response models do not derive `Deserialize`. Each model implements
//! [`Model`] and returns a [`ModelDecoder`]: an explicit table mapping JSON
//! field names to closures that decode the value and store it in the target.
//! Nested models are registered with [`ModelDecoder::model`] and
//! [`ModelDecoder::model_list`], which decode recursively with the nested
//! model's own table.
//!
//! Unknown JSON fields are ignored and `null` leaves the target field unset.
//!
//! # Example
//!
//! ```rust
//! use cis_networking::core::{Model, ModelDecoder};
//! use serde_json::json;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Group {
//!     id: Option<String>,
//!     name: Option<String>,
//! }
//!
//! impl Model for Group {
//!     fn decoder() -> ModelDecoder<Self> {
//!         ModelDecoder::new("Group")
//!             .field("id", |g: &mut Self| &mut g.id)
//!             .field("name", |g: &mut Self| &mut g.name)
//!     }
//! }
//!
//! let group = Group::decoder()
//!     .decode(&json!({"id": "g1", "name": "Project Honey Pot", "extra": 1}))
//!     .unwrap();
//! assert_eq!(group.id.as_deref(), Some("g1"));
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::errors::DecodeError;

type FieldDecoder<T> = Box<dyn Fn(&Value, &mut T) -> Result<(), DecodeError> + Send + Sync>;

/// A response model that knows how to decode itself.
pub trait Model: Default + Sized + 'static {
    /// Returns the field registry for this model.
    fn decoder() -> ModelDecoder<Self>;
}

/// An explicit field-name to decode-closure registry for `T`.
pub struct ModelDecoder<T> {
    model: &'static str,
    fields: Vec<(&'static str, FieldDecoder<T>)>,
}

impl<T> std::fmt::Debug for ModelDecoder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelDecoder")
            .field("model", &self.model)
            .field(
                "fields",
                &self.fields.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl<T: Default + 'static> ModelDecoder<T> {
    /// Creates an empty registry for the named model.
    #[must_use]
    pub const fn new(model: &'static str) -> Self {
        Self {
            model,
            fields: Vec::new(),
        }
    }

    /// Returns the model name used in error messages.
    #[must_use]
    pub const fn model_name(&self) -> &'static str {
        self.model
    }

    /// Returns the registered JSON field names.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(name, _)| *name).collect()
    }

    /// Registers a primitive field decoded with serde.
    #[must_use]
    pub fn field<V>(mut self, name: &'static str, slot: fn(&mut T) -> &mut Option<V>) -> Self
    where
        V: DeserializeOwned + 'static,
    {
        let model = self.model;
        self.fields.push((
            name,
            Box::new(move |value, target| {
                let decoded = V::deserialize(value).map_err(|e| DecodeError::Field {
                    model,
                    field: name,
                    reason: e.to_string(),
                })?;
                *slot(target) = Some(decoded);
                Ok(())
            }),
        ));
        self
    }

    /// Registers a timestamp field.
    ///
    /// Accepts RFC 3339 strings and naive `YYYY-MM-DDTHH:MM:SS[.f]` strings,
    /// which are read as UTC.
    #[must_use]
    pub fn timestamp(
        mut self,
        name: &'static str,
        slot: fn(&mut T) -> &mut Option<DateTime<Utc>>,
    ) -> Self {
        let model = self.model;
        self.fields.push((
            name,
            Box::new(move |value, target| {
                let parsed = value
                    .as_str()
                    .and_then(parse_timestamp)
                    .ok_or_else(|| DecodeError::Field {
                        model,
                        field: name,
                        reason: format!("expected a timestamp string, found {value}"),
                    })?;
                *slot(target) = Some(parsed);
                Ok(())
            }),
        ));
        self
    }

    /// Registers a nested model, decoded with its own registry.
    #[must_use]
    pub fn model<M: Model>(mut self, name: &'static str, slot: fn(&mut T) -> &mut Option<M>) -> Self {
        let model = self.model;
        self.fields.push((
            name,
            Box::new(move |value, target| {
                let nested = decode_nested::<M>(value, model, name)?;
                *slot(target) = Some(nested);
                Ok(())
            }),
        ));
        self
    }

    /// Registers a list of nested models.
    #[must_use]
    pub fn model_list<M: Model>(
        mut self,
        name: &'static str,
        slot: fn(&mut T) -> &mut Option<Vec<M>>,
    ) -> Self {
        let model = self.model;
        self.fields.push((
            name,
            Box::new(move |value, target| {
                let items = value.as_array().ok_or_else(|| DecodeError::Field {
                    model,
                    field: name,
                    reason: format!("expected an array, found {}", json_kind(value)),
                })?;
                let decoded = items
                    .iter()
                    .map(|item| decode_nested::<M>(item, model, name))
                    .collect::<Result<Vec<_>, _>>()?;
                *slot(target) = Some(decoded);
                Ok(())
            }),
        ));
        self
    }

    /// Decodes a JSON object into a new `T`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::ShapeMismatch`] if `value` is not an object and
    /// [`DecodeError::Field`] if a registered field has the wrong type.
    pub fn decode(&self, value: &Value) -> Result<T, DecodeError> {
        let mut target = T::default();
        self.decode_into(value, &mut target)?;
        Ok(target)
    }

    /// Decodes a JSON object into caller-owned storage.
    ///
    /// Fields absent from the JSON are left untouched.
    ///
    /// # Errors
    ///
    /// Same as [`decode`](Self::decode).
    pub fn decode_into(&self, value: &Value, target: &mut T) -> Result<(), DecodeError> {
        let object = value.as_object().ok_or_else(|| DecodeError::ShapeMismatch {
            expected: "a JSON object",
            found: json_kind(value).to_string(),
        })?;
        for (name, decode) in &self.fields {
            match object.get(*name) {
                None | Some(Value::Null) => {}
                Some(field) => decode(field, target)?,
            }
        }
        Ok(())
    }
}

fn decode_nested<M: Model>(
    value: &Value,
    parent: &'static str,
    field: &'static str,
) -> Result<M, DecodeError> {
    M::decoder().decode(value).map_err(|e| match e {
        DecodeError::ShapeMismatch { expected, found } => DecodeError::Field {
            model: parent,
            field,
            reason: format!("expected {expected}, found {found}"),
        },
        other => other,
    })
}

/// Parses a service timestamp.
///
/// ```rust
/// use cis_networking::core::parse_timestamp;
///
/// assert!(parse_timestamp("2014-01-01T05:20:00.12345Z").is_some());
/// assert!(parse_timestamp("2019-01-01T12:00:00").is_some());
/// assert!(parse_timestamp("yesterday").is_none());
/// ```
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

pub(crate) const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
