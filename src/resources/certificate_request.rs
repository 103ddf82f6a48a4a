use std::collections::BTreeMap;

use bon::Builder;
use time::Duration;

use super::{ObjectMeta, ObjectReference};
use crate::usage::KeyUsage;

/// A request for a signed certificate from an issuer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CertificateRequest {
    pub metadata: ObjectMeta,
    pub spec: CertificateRequestSpec,
}

/// The desired state of a [`CertificateRequest`].
///
/// # Fields
/// * `request` - The PEM encoded PKCS#10 certificate signing request.
/// * `issuer_ref` - The issuer that should sign the request.
/// * `is_ca` - Whether the issued certificate should be a CA.
/// * `usages` - The usages the certificate is requested with, as written by
///   the author. Order and duplicates carry no meaning.
/// * `duration` - The requested lifetime of the certificate.
/// * `uid`, `username`, `groups`, `extra` - The identity of the requester,
///   filled in on creation.
#[derive(Clone, Debug, Default, PartialEq, Builder)]
pub struct CertificateRequestSpec {
    #[builder(default)]
    pub request: Vec<u8>,
    #[builder(default)]
    pub issuer_ref: ObjectReference,
    #[builder(default)]
    pub is_ca: bool,
    #[builder(default)]
    pub usages: Vec<KeyUsage>,
    pub duration: Option<Duration>,
    #[builder(default)]
    pub uid: String,
    #[builder(default)]
    pub username: String,
    #[builder(default)]
    pub groups: Vec<String>,
    #[builder(default)]
    pub extra: BTreeMap<String, Vec<String>>,
}
