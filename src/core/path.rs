//! Path templates for service operations.
//!
//! Every operation declares a `const` [`PathTemplate`] such as
//! `"v1/{crn}/zones/{zone_identifier}/settings/cache_level"`. The text between
//! slots is literal; each `{name}` slot is filled positionally, in declaration
//! order, with a percent-encoded identifier.
//!
//! # Example
//!
//! ```rust
//! use cis_networking::core::PathTemplate;
//!
//! const CACHE_LEVEL: PathTemplate =
//!     PathTemplate::new("v1/{crn}/zones/{zone_identifier}/settings/cache_level");
//!
//! let url = CACHE_LEVEL
//!     .build("https://api.cis.cloud.ibm.com", &["crn:v1:a/b::", "zone-1"])
//!     .unwrap();
//! assert_eq!(
//!     url.as_str(),
//!     "https://api.cis.cloud.ibm.com/v1/crn%3Av1%3Aa%2Fb%3A%3A/zones/zone-1/settings/cache_level"
//! );
//! ```

use reqwest::Url;

use crate::core::errors::{InvalidRequestError, OperationError};

/// A piece of a parsed template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Part {
    Literal(&'static str),
    Slot(&'static str),
}

/// A URL path template with positional `{name}` slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PathTemplate {
    template: &'static str,
}

impl PathTemplate {
    /// Creates a new template.
    #[must_use]
    pub const fn new(template: &'static str) -> Self {
        Self { template }
    }

    /// Returns the raw template string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.template
    }

    /// Returns the slot names, in the order they must be filled.
    #[must_use]
    pub fn slot_names(&self) -> Vec<&'static str> {
        self.parts()
            .into_iter()
            .filter_map(|part| match part {
                Part::Slot(name) => Some(name),
                Part::Literal(_) => None,
            })
            .collect()
    }

    /// Fills the slots with `params`, returning the relative path.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidRequestError::PathParameterCount`] if the number of
    /// values differs from the number of slots, and
    /// [`InvalidRequestError::EmptyPathParameter`] if a value is empty.
    /// A value of `.` or `..` would leave its slot once the URL is resolved,
    /// so it is rejected with [`InvalidRequestError::DotSegmentPathParameter`].
    pub fn render(&self, params: &[&str]) -> Result<String, InvalidRequestError> {
        let parts = self.parts();
        let expected = parts.iter().filter(|p| matches!(p, Part::Slot(_))).count();
        if expected != params.len() {
            return Err(InvalidRequestError::PathParameterCount {
                template: self.template,
                expected,
                actual: params.len(),
            });
        }

        let capacity = self.template.len() + params.iter().map(|p| p.len()).sum::<usize>();
        let mut path = String::with_capacity(capacity);
        let mut values = params.iter();
        for part in parts {
            match part {
                Part::Literal(text) => path.push_str(text),
                Part::Slot(name) => {
                    let value = values.next().copied().unwrap_or_default();
                    if value.is_empty() {
                        return Err(InvalidRequestError::EmptyPathParameter { name });
                    }
                    // Percent-encoded dots are still dot segments to a URL parser.
                    if value == "." || value == ".." {
                        return Err(InvalidRequestError::DotSegmentPathParameter { name });
                    }
                    path.push_str(&urlencoding::encode(value));
                }
            }
        }
        Ok(path)
    }

    /// Resolves the template against a service base URL.
    ///
    /// The base URL's own path is kept, so `https://host/api` resolves to
    /// `https://host/api/v1/...`.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::ServiceUrlMissing`] for an empty base URL,
    /// [`InvalidRequestError::MalformedUrl`] if the base or the resolved URL
    /// does not parse, and any error from [`render`](Self::render).
    pub fn build(&self, base_url: &str, params: &[&str]) -> Result<Url, OperationError> {
        let base = base_url.trim_end_matches('/');
        if base.is_empty() {
            return Err(OperationError::ServiceUrlMissing);
        }
        Url::parse(base).map_err(|e| InvalidRequestError::MalformedUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let path = self.render(params)?;
        let full = format!("{base}/{}", path.trim_start_matches('/'));
        let url = Url::parse(&full).map_err(|e| InvalidRequestError::MalformedUrl {
            url: full.clone(),
            reason: e.to_string(),
        })?;
        Ok(url)
    }

    fn parts(&self) -> Vec<Part> {
        let mut parts = Vec::new();
        let mut rest = self.template;
        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}') else {
                break;
            };
            if open > 0 {
                parts.push(Part::Literal(&rest[..open]));
            }
            parts.push(Part::Slot(&rest[open + 1..open + close]));
            rest = &rest[open + close + 1..];
        }
        if !rest.is_empty() {
            parts.push(Part::Literal(rest));
        }
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULE: PathTemplate = PathTemplate::new(
        "v1/{crn}/zones/{zone_identifier}/firewall/waf/packages/{package_id}/rules/{identifier}",
    );

    #[test]
    fn test_slot_names_in_declaration_order() {
        assert_eq!(
            RULE.slot_names(),
            vec!["crn", "zone_identifier", "package_id", "identifier"]
        );
    }

    #[test]
    fn test_render_interleaves_literals_and_params() {
        let path = RULE.render(&["c", "z", "p", "r"]).unwrap();
        assert_eq!(path, "v1/c/zones/z/firewall/waf/packages/p/rules/r");
    }

    #[test]
    fn test_render_percent_encodes_each_param() {
        let template = PathTemplate::new("v1/{crn}/firewall/access_rules/rules");
        let path = template.render(&["a/b c"]).unwrap();
        assert_eq!(path, "v1/a%2Fb%20c/firewall/access_rules/rules");
    }

    #[test]
    fn test_render_rejects_wrong_param_count() {
        let result = RULE.render(&["c", "z"]);
        assert!(matches!(
            result,
            Err(InvalidRequestError::PathParameterCount {
                expected: 4,
                actual: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_render_rejects_empty_param() {
        let result = RULE.render(&["c", "", "p", "r"]);
        assert_eq!(
            result,
            Err(InvalidRequestError::EmptyPathParameter {
                name: "zone_identifier"
            })
        );
    }

    #[test]
    fn test_render_rejects_dot_segments() {
        let template =
            PathTemplate::new("v1/{crn}/firewall/access_rules/rules/{accessrule_identifier}");
        for dots in [".", ".."] {
            assert_eq!(
                template.render(&["crn", dots]),
                Err(InvalidRequestError::DotSegmentPathParameter {
                    name: "accessrule_identifier"
                })
            );
        }
        let result = template.build("https://api.example.com", &["crn", ".."]);
        assert!(matches!(
            result,
            Err(OperationError::InvalidRequest(
                InvalidRequestError::DotSegmentPathParameter { .. }
            ))
        ));
    }

    #[test]
    fn test_render_keeps_dots_inside_longer_values() {
        let template = PathTemplate::new("v1/{crn}/rules/{id}");
        let path = template.render(&["crn", "...a.b"]).unwrap();
        assert_eq!(path, "v1/crn/rules/...a.b");
    }

    #[test]
    fn test_template_without_slots() {
        let template = PathTemplate::new("v1/ping");
        assert!(template.slot_names().is_empty());
        assert_eq!(template.render(&[]).unwrap(), "v1/ping");
    }

    #[test]
    fn test_build_keeps_base_path_and_trims_slashes() {
        let template = PathTemplate::new("v1/{crn}/zones/{zone_identifier}/settings/cache_level");
        let url = template
            .build("https://cachingapiv1/api/", &["testString", "testString"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://cachingapiv1/api/v1/testString/zones/testString/settings/cache_level"
        );
    }

    #[test]
    fn test_build_with_empty_base_is_service_url_missing() {
        let template = PathTemplate::new("v1/{crn}");
        let result = template.build("", &["x"]);
        assert!(matches!(result, Err(OperationError::ServiceUrlMissing)));
    }

    #[test]
    fn test_build_with_unparseable_base_is_malformed() {
        let template = PathTemplate::new("v1/{crn}");
        let result = template.build("not a url", &["x"]);
        assert!(matches!(
            result,
            Err(OperationError::InvalidRequest(InvalidRequestError::MalformedUrl { .. }))
        ));
    }
}
