//! Response envelope decoding.
//!
//! Every operation answers with the same JSON wrapper:
//!
//! ```json
//! {
//!   "success": true,
//!   "errors": [],
//!   "messages": [],
//!   "result": { ... },
//!   "result_info": {"page": 1, "per_page": 20, "count": 1, "total_count": 1}
//! }
//! ```
//!
//! `result` is a single object for get-style operations and an array for
//! list-style operations; `result_info` is only meaningful for lists.
//! [`EnvelopeDecoder`] validates the shape and hands `result` to the model's
//! registry.
//!
//! # Example
//!
//! ```rust
//! use cis_networking::core::{EnvelopeDecoder, Model, ModelDecoder};
//!
//! #[derive(Debug, Default)]
//! struct PurgeResult {
//!     id: Option<String>,
//! }
//!
//! impl Model for PurgeResult {
//!     fn decoder() -> ModelDecoder<Self> {
//!         ModelDecoder::new("PurgeResult").field("id", |r: &mut Self| &mut r.id)
//!     }
//! }
//!
//! let body = br#"{"success": true, "errors": [], "messages": [], "result": {"id": "p1"}}"#;
//! let envelope = EnvelopeDecoder::decode_single::<PurgeResult>(body).unwrap();
//! assert!(envelope.success);
//! assert_eq!(envelope.result.id.as_deref(), Some("p1"));
//! ```

use std::marker::PhantomData;

use serde::Serialize;
use serde_json::Value;

use crate::core::errors::DecodeError;
use crate::core::model::{json_kind, Model, ModelDecoder};

/// Pagination information for list results.
///
/// # Example
///
/// ```rust
/// use cis_networking::core::ResultInfo;
///
/// let info = ResultInfo {
///     page: Some(1),
///     per_page: Some(2),
///     count: Some(2),
///     total_count: Some(5),
/// };
/// assert!(info.has_next_page());
/// assert_eq!(info.next_page(), Some(2));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResultInfo {
    /// The current page, starting at 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Items per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
    /// Items on this page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    /// Items across all pages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

impl ResultInfo {
    /// Returns `true` if items remain beyond the current page.
    #[must_use]
    pub fn has_next_page(&self) -> bool {
        match (self.page, self.per_page, self.total_count) {
            (Some(page), Some(per_page), Some(total)) if per_page > 0 => {
                page.saturating_mul(per_page) < total
            }
            _ => false,
        }
    }

    /// Returns the next page number, if there is one.
    #[must_use]
    pub fn next_page(&self) -> Option<i64> {
        if self.has_next_page() {
            self.page.map(|page| page + 1)
        } else {
            None
        }
    }
}

impl Model for ResultInfo {
    fn decoder() -> ModelDecoder<Self> {
        ModelDecoder::new("ResultInfo")
            .field("page", |r: &mut Self| &mut r.page)
            .field("per_page", |r: &mut Self| &mut r.per_page)
            .field("count", |r: &mut Self| &mut r.count)
            .field("total_count", |r: &mut Self| &mut r.total_count)
    }
}

/// The standard response wrapper.
///
/// `R` is the model type for single results and `Vec<Model>` for lists.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Envelope<R> {
    /// Whether the service reports success.
    pub success: bool,
    /// Error rows reported by the service.
    pub errors: Vec<Vec<String>>,
    /// Informational message rows.
    pub messages: Vec<Vec<String>>,
    /// The decoded result.
    pub result: R,
    /// Pagination information, decoded for list results only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_info: Option<ResultInfo>,
}

/// The expected shape of an envelope's `result`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultShape {
    /// `result` is a single object.
    Single,
    /// `result` is an array of objects.
    List,
}

/// How to decode a `result` of a given shape.
///
/// Implemented by the [`Single`] and [`List`] markers.
pub trait ResultKind {
    /// The decoded result type.
    type Output: Default;

    /// The shape this kind expects.
    const SHAPE: ResultShape;

    /// Decodes the raw `result` value.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if the value has the wrong shape or content.
    fn decode_result(value: &Value) -> Result<Self::Output, DecodeError>;
}

/// Marker for a single-object `result`.
#[derive(Debug)]
pub struct Single<T>(PhantomData<T>);

/// Marker for an array `result`.
#[derive(Debug)]
pub struct List<T>(PhantomData<T>);

impl<T: Model> ResultKind for Single<T> {
    type Output = T;
    const SHAPE: ResultShape = ResultShape::Single;

    fn decode_result(value: &Value) -> Result<T, DecodeError> {
        if !value.is_object() {
            return Err(DecodeError::ShapeMismatch {
                expected: "an object result",
                found: json_kind(value).to_string(),
            });
        }
        T::decoder().decode(value)
    }
}

impl<T: Model> ResultKind for List<T> {
    type Output = Vec<T>;
    const SHAPE: ResultShape = ResultShape::List;

    fn decode_result(value: &Value) -> Result<Vec<T>, DecodeError> {
        let items = value.as_array().ok_or_else(|| DecodeError::ShapeMismatch {
            expected: "an array result",
            found: json_kind(value).to_string(),
        })?;
        let decoder = T::decoder();
        items.iter().map(|item| decoder.decode(item)).collect()
    }
}

/// Decodes response bodies into typed envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvelopeDecoder;

impl EnvelopeDecoder {
    /// Decodes an envelope whose `result` is a single `T`.
    ///
    /// # Errors
    ///
    /// See [`decode_into`](Self::decode_into).
    pub fn decode_single<T: Model>(body: &[u8]) -> Result<Envelope<T>, DecodeError> {
        let mut envelope = Envelope::default();
        Self::decode_into::<Single<T>>(body, &mut envelope)?;
        Ok(envelope)
    }

    /// Decodes an envelope whose `result` is a list of `T`.
    ///
    /// # Errors
    ///
    /// See [`decode_into`](Self::decode_into).
    pub fn decode_list<T: Model>(body: &[u8]) -> Result<Envelope<Vec<T>>, DecodeError> {
        let mut envelope = Envelope::default();
        Self::decode_into::<List<T>>(body, &mut envelope)?;
        Ok(envelope)
    }

    /// Decodes an envelope into caller-owned storage.
    ///
    /// The slot is only written when decoding succeeds.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Malformed`] if the body is not JSON.
    /// - [`DecodeError::ShapeMismatch`] if the body is not an object, `result`
    ///   is absent or null, or `result` has the wrong shape for `K`.
    /// - [`DecodeError::Field`] if a model field has the wrong type.
    pub fn decode_into<K: ResultKind>(
        body: &[u8],
        slot: &mut Envelope<K::Output>,
    ) -> Result<(), DecodeError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| DecodeError::Malformed {
            reason: e.to_string(),
        })?;
        let object = value.as_object().ok_or_else(|| DecodeError::ShapeMismatch {
            expected: "an envelope object",
            found: json_kind(&value).to_string(),
        })?;

        let result = match object.get("result") {
            None | Some(Value::Null) => {
                return Err(DecodeError::ShapeMismatch {
                    expected: "a result member",
                    found: "no result".to_string(),
                })
            }
            Some(result) => K::decode_result(result)?,
        };

        let result_info = match (K::SHAPE, object.get("result_info")) {
            (ResultShape::List, Some(info)) if !info.is_null() => {
                Some(ResultInfo::decoder().decode(info).map_err(|e| match e {
                    DecodeError::ShapeMismatch { found, .. } => DecodeError::Field {
                        model: "Envelope",
                        field: "result_info",
                        reason: format!("expected an object, found {found}"),
                    },
                    other => other,
                })?)
            }
            _ => None,
        };

        *slot = Envelope {
            success: object
                .get("success")
                .and_then(Value::as_bool)
                .unwrap_or_default(),
            errors: object.get("errors").map(message_rows).unwrap_or_default(),
            messages: object.get("messages").map(message_rows).unwrap_or_default(),
            result,
            result_info,
        };
        Ok(())
    }
}

/// Reads an `errors` or `messages` member leniently.
///
/// Rows may be arrays of strings, bare strings, or objects carrying a
/// `message`; anything else is skipped.
pub(crate) fn message_rows(value: &Value) -> Vec<Vec<String>> {
    let Some(rows) = value.as_array() else {
        return Vec::new();
    };
    rows.iter()
        .filter_map(|row| match row {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            ),
            Value::String(text) => Some(vec![text.clone()]),
            Value::Object(fields) => fields
                .get("message")
                .and_then(Value::as_str)
                .map(|message| vec![message.to_string()]),
            _ => None,
        })
        .collect()
}
