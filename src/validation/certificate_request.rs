//! Creation and update checks for certificate requests.
//!
//! The interesting part is usage reconciliation: when a request declares
//! usages and its CSR carries KeyUsage or ExtendedKeyUsage extensions, the two
//! must agree, up to ordering, duplicates and the `signing` alias.

use tracing::debug;

use super::ValidationOptions;
use crate::csr::Csr;
use crate::field::{ErrorList, FieldError, Path};
use crate::resources::{
    ACME_GROUP_NAME, CertificateRequest, CertificateRequestSpec, GROUP_NAME, ObjectReference,
};
use crate::usage::{DEFAULT_KEY_USAGES, KeyUsage, usage_set, usages_equal, with_cert_sign};

/// Validates a newly created certificate request.
///
/// # Example
/// ```
/// use certcheck::resources::CertificateRequest;
/// use certcheck::validation::{ValidationOptions, validate_certificate_request};
///
/// let errs = validate_certificate_request(
///     &CertificateRequest::default(),
///     &ValidationOptions::default(),
/// );
/// let rendered: Vec<String> = errs.iter().map(|e| e.to_string()).collect();
/// assert_eq!(
///     rendered,
///     vec![
///         "spec.issuerRef.name: Required value: must be specified",
///         "spec.request: Required value: must be specified",
///     ]
/// );
/// ```
pub fn validate_certificate_request(
    cr: &CertificateRequest,
    options: &ValidationOptions,
) -> ErrorList {
    validate_certificate_request_spec(&cr.spec, &Path::new("spec"), options)
}

/// Validates a certificate request spec found at `path`.
///
/// Checks the issuer reference, decodes the CSR and then reconciles the
/// usages it asks for with the declared ones.
pub fn validate_certificate_request_spec(
    spec: &CertificateRequestSpec,
    path: &Path,
    options: &ValidationOptions,
) -> ErrorList {
    let mut errs = validate_issuer_ref(&spec.issuer_ref, path);
    let request_path = path.child("request");

    if spec.request.is_empty() {
        errs.push(FieldError::required(&request_path, "must be specified"));
        return errs;
    }

    match Csr::from_pem(&spec.request) {
        Ok(csr) => errs.extend(reconcile_usages(&csr, spec, &request_path, options)),
        Err(e) => {
            debug!(error = %e, "certificate request carries an undecodable csr");
            errs.push(FieldError::invalid(
                &request_path,
                request_value(spec),
                format!("failed to decode csr: {e}"),
            ));
        }
    }
    errs
}

/// Validates a change to an existing certificate request.
///
/// Requests are immutable once created, apart from annotations outside the
/// cert-manager groups.
pub fn validate_update_certificate_request(
    old: &CertificateRequest,
    new: &CertificateRequest,
) -> ErrorList {
    let annotations = Path::new("metadata").child("annotations");
    let mut errs = immutable_annotations(old, new, &annotations);
    errs.extend(immutable_annotations(new, old, &annotations));

    if old.spec != new.spec {
        errs.push(FieldError::forbidden(
            &Path::new("spec"),
            "cannot change spec after creation",
        ));
    }
    errs
}

/// Validates the issuer reference of a spec found at `path`.
pub fn validate_issuer_ref(issuer_ref: &ObjectReference, path: &Path) -> ErrorList {
    let path = path.child("issuerRef");
    let mut errs = ErrorList::new();

    if issuer_ref.name.is_empty() {
        errs.push(FieldError::required(
            &path.child("name"),
            "must be specified",
        ));
    }

    // Out of group issuers choose their own kinds.
    if issuer_ref.group.is_empty() || issuer_ref.group == GROUP_NAME {
        match issuer_ref.kind.as_str() {
            "" | "Issuer" | "ClusterIssuer" => {}
            kind => errs.push(FieldError::invalid(
                &path.child("kind"),
                kind,
                "must be one of Issuer or ClusterIssuer",
            )),
        }
    }
    errs
}

/// Reports every cert-manager annotation of `a` that `b` lacks or changed.
fn immutable_annotations(
    a: &CertificateRequest,
    b: &CertificateRequest,
    path: &Path,
) -> ErrorList {
    a.metadata
        .annotations
        .iter()
        .filter(|(key, _)| key.starts_with(GROUP_NAME) || key.starts_with(ACME_GROUP_NAME))
        .filter(|(key, value)| b.metadata.annotations.get(*key) != Some(*value))
        .map(|(key, _)| {
            FieldError::forbidden(
                &path.child(key),
                "cannot change cert-manager annotation after creation",
            )
        })
        .collect()
}

fn reconcile_usages(
    csr: &Csr,
    spec: &CertificateRequestSpec,
    path: &Path,
    options: &ValidationOptions,
) -> ErrorList {
    if spec.usages.is_empty() {
        return ErrorList::new();
    }
    if !options.validate_csr_content {
        debug!("csr content validation disabled, not comparing usages");
        return ErrorList::new();
    }
    if !csr.has_usage_extensions() {
        debug!("csr requests no key usages, not comparing usages");
        return ErrorList::new();
    }
    if !options.usage_origin.is_explicit(&spec.usages) {
        debug!(
            origin = ?options.usage_origin,
            "declared usages are defaults, not comparing usages"
        );
        return ErrorList::new();
    }

    let declared = if spec.is_ca {
        debug!("request is for a CA, comparing with cert sign added");
        with_cert_sign(&spec.usages)
    } else {
        spec.usages.clone()
    };

    let requested = csr.requested_usages();
    if !requested.errors.is_empty() {
        debug!(
            count = requested.errors.len(),
            "csr usage extensions failed to decode"
        );
        return requested
            .errors
            .iter()
            .map(|e| FieldError::invalid(path, request_value(spec), e.to_string()))
            .collect();
    }
    if requested.usages.is_empty() {
        return ErrorList::new();
    }

    if usages_equal(&requested.usages, &declared)
        || usages_equal(&requested.usages, &DEFAULT_KEY_USAGES)
    {
        return ErrorList::new();
    }

    vec![FieldError::invalid(
        path,
        request_value(spec),
        format!(
            "csr key usages do not match specified usages, these should match if both are set: {}",
            usage_diff(&requested.usages, &declared)
        ),
    )]
}

/// Describes which usages appear on only one side, after normalization.
fn usage_diff(csr: &[KeyUsage], declared: &[KeyUsage]) -> String {
    let csr = usage_set(csr);
    let declared = usage_set(declared);
    let list = |usages: std::collections::btree_set::Difference<'_, KeyUsage>| {
        usages
            .map(|u| format!("{:?}", u.as_str()))
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!(
        "only in csr: [{}], only in request: [{}]",
        list(csr.difference(&declared)),
        list(declared.difference(&csr))
    )
}

fn request_value(spec: &CertificateRequestSpec) -> String {
    String::from_utf8_lossy(&spec.request).into_owned()
}
