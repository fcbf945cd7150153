//! The request/response engine shared by every service client.
//!
//! Each operation runs the same pipeline:
//!
//! 1. [`validate_options`] rejects missing options or required fields
//! 2. [`BaseService::service_url`] fails fast when no URL is configured
//! 3. [`PathTemplate::build`] resolves the operation path
//! 4. [`RequestBuilder`] assembles headers, query and body
//! 5. [`BaseService::send`] dispatches the request
//! 6. [`EnvelopeDecoder`] decodes the envelope into typed models
//!
//! # Thread Safety
//!
//! All types here are `Send + Sync`. Request descriptors are immutable once
//! built.

mod envelope;
mod errors;
mod http_client;
mod http_request;
mod http_response;
mod model;
mod path;
pub mod sdk_headers;
mod validation;

pub use envelope::{
    Envelope, EnvelopeDecoder, List, ResultInfo, ResultKind, ResultShape, Single,
};
pub use errors::{DecodeError, InvalidRequestError, OperationError, ValidationError};
pub use http_client::{BaseService, RetryPolicy, DEFAULT_MAX_RETRY_INTERVAL, RETRY_WAIT_TIME};
pub use http_request::{HttpMethod, RequestBuilder, RequestDescriptor};
pub use http_response::DetailedResponse;
pub use model::{parse_timestamp, Model, ModelDecoder};
pub use path::PathTemplate;
pub use validation::{require_field, require_non_empty, validate_options, Validate};
