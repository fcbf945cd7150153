//! Options validation.
//!
//! Every operation takes `Option<&XOptions>`. [`validate_options`] rejects a
//! missing options value first, then asks the options to check their own
//! required fields. Both checks run before any URL is built or any request is
//! sent.
//!
//! # Example
//!
//! ```rust
//! use cis_networking::core::{require_non_empty, validate_options, Validate, ValidationError};
//!
//! #[derive(Debug, Default)]
//! struct GetRuleOptions {
//!     identifier: Option<String>,
//! }
//!
//! impl Validate for GetRuleOptions {
//!     const NAME: &'static str = "GetRuleOptions";
//!
//!     fn validate(&self) -> Result<(), ValidationError> {
//!         require_non_empty(Self::NAME, "identifier", self.identifier.as_deref())
//!     }
//! }
//!
//! let nil = validate_options::<GetRuleOptions>(None);
//! assert_eq!(nil.unwrap_err().to_string(), "GetRuleOptions cannot be nil");
//!
//! let empty = GetRuleOptions::default();
//! assert!(matches!(
//!     validate_options(Some(&empty)),
//!     Err(ValidationError::MissingRequiredField { field: "identifier", .. })
//! ));
//! ```

use crate::core::errors::ValidationError;

/// Options that can check their own required fields.
pub trait Validate {
    /// The options type name used in error messages.
    const NAME: &'static str;

    /// Checks that every required field is set.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingRequiredField`] for the first missing
    /// field.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Validates an operation's options argument.
///
/// # Errors
///
/// Returns [`ValidationError::NilOptions`] if `options` is `None`, otherwise
/// whatever [`Validate::validate`] returns.
pub fn validate_options<T: Validate>(options: Option<&T>) -> Result<&T, ValidationError> {
    let options = options.ok_or(ValidationError::NilOptions { name: T::NAME })?;
    options.validate()?;
    Ok(options)
}

/// Fails if `value` is `None`.
///
/// # Errors
///
/// Returns [`ValidationError::MissingRequiredField`].
pub const fn require_field<V>(
    options: &'static str,
    field: &'static str,
    value: Option<&V>,
) -> Result<(), ValidationError> {
    match value {
        Some(_) => Ok(()),
        None => Err(ValidationError::MissingRequiredField { options, field }),
    }
}

/// Fails if `value` is `None` or the empty string.
///
/// # Errors
///
/// Returns [`ValidationError::MissingRequiredField`].
pub fn require_non_empty(
    options: &'static str,
    field: &'static str,
    value: Option<&str>,
) -> Result<(), ValidationError> {
    match value {
        Some(text) if !text.is_empty() => Ok(()),
        _ => Err(ValidationError::MissingRequiredField { options, field }),
    }
}
