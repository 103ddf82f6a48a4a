//! Admission checks for certificate requests and issuers.
//!
//! Every validator takes the object by reference, plus the path it lives at,
//! and returns an [`ErrorList`]. Nothing here performs I/O or keeps state
//! between calls.

pub mod certificate_request;
pub mod issuer;

use bon::Builder;

use crate::field::{ErrorList, FieldError, Path};
use crate::resources::SecretKeySelector;
use crate::usage::{DEFAULT_KEY_USAGES, KeyUsage};

pub use certificate_request::{
    validate_certificate_request, validate_certificate_request_spec, validate_issuer_ref,
    validate_update_certificate_request,
};
pub use issuer::{validate_cluster_issuer, validate_issuer, validate_issuer_spec};

/// Where the declared usages of a request came from.
///
/// Requests that never chose their usages get [`DEFAULT_KEY_USAGES`] filled
/// in by defaulting, and those must not be held against the CSR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UsageOrigin {
    /// The author listed the usages.
    Explicit,
    /// The usages were filled in by defaulting.
    Defaulted,
    /// The caller cannot tell. A list that is exactly the default pair, in
    /// default order, is treated as defaulted.
    #[default]
    Unknown,
}

impl UsageOrigin {
    /// Reports whether `usages` should be treated as chosen by the author.
    pub fn is_explicit(self, usages: &[KeyUsage]) -> bool {
        match self {
            UsageOrigin::Explicit => true,
            UsageOrigin::Defaulted => false,
            UsageOrigin::Unknown => usages != DEFAULT_KEY_USAGES.as_slice(),
        }
    }
}

/// Knobs for [`validate_certificate_request`].
///
/// # Fields
/// * `validate_csr_content` - Compare the usages inside the CSR with the
///   declared ones. Defaults to `true`.
/// * `usage_origin` - Where the declared usages came from. Defaults to
///   [`UsageOrigin::Unknown`].
///
/// # Example
/// ```
/// use certcheck::validation::{UsageOrigin, ValidationOptions};
///
/// let options = ValidationOptions::builder()
///     .usage_origin(UsageOrigin::Explicit)
///     .build();
/// assert!(options.validate_csr_content);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Builder)]
pub struct ValidationOptions {
    #[builder(default = true)]
    pub validate_csr_content: bool,
    #[builder(default)]
    pub usage_origin: UsageOrigin,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Checks that a secret key selector names both a Secret and a key.
pub fn validate_secret_key_selector(selector: &SecretKeySelector, path: &Path) -> ErrorList {
    let mut errs = ErrorList::new();
    if selector.name.is_empty() {
        errs.push(FieldError::required(
            &path.child("name"),
            "secret name is required",
        ));
    }
    if selector.key.is_empty() {
        errs.push(FieldError::required(
            &path.child("key"),
            "secret key is required",
        ));
    }
    errs
}
