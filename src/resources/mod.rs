//! Plain Rust models of the resources this crate validates.
//!
//! These mirror the fields the validators look at. They carry no
//! serialization logic: decoding the API envelope is the caller's job.

pub mod certificate_request;
pub mod issuer;

use std::collections::BTreeMap;

pub use certificate_request::{CertificateRequest, CertificateRequestSpec};
pub use issuer::{ClusterIssuer, Issuer, IssuerSpec};

/// API group of the core certificate resources.
pub const GROUP_NAME: &str = "cert-manager.io";

/// API group of the ACME resources.
pub const ACME_GROUP_NAME: &str = "acme.cert-manager.io";

/// Object metadata.
///
/// Labels and annotations are ordered maps so that validators report
/// problems in a stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMeta {
    pub name: String,
    pub namespace: String,
    pub generate_name: String,
    pub labels: BTreeMap<String, String>,
    pub annotations: BTreeMap<String, String>,
}

/// A reference to an issuer resource.
///
/// An empty `kind` defaults to `Issuer`, an empty `group` to
/// [`GROUP_NAME`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectReference {
    pub name: String,
    pub kind: String,
    pub group: String,
}

/// Selects one key of a Secret in the resource's namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretKeySelector {
    pub name: String,
    pub key: String,
}

impl SecretKeySelector {
    pub fn new(name: &str, key: &str) -> Self {
        Self {
            name: name.to_string(),
            key: key.to_string(),
        }
    }
}
