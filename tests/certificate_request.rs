mod util;

use std::collections::BTreeMap;

use certcheck::csr::Csr;
use certcheck::csr::extensions::{ExtendedKeyUsageOption, FlagSet, KeyUsages};
use certcheck::field::{ErrorList, FieldError, FieldErrorType, Path};
use certcheck::resources::{CertificateRequest, CertificateRequestSpec};
use certcheck::usage::KeyUsage::{self, *};
use certcheck::validation::{
    UsageOrigin, ValidationOptions, validate_certificate_request, validate_certificate_request_spec,
    validate_update_certificate_request,
};

const MISMATCH: &str =
    "csr key usages do not match specified usages, these should match if both are set";

/// Drops the rejected values so expectations do not have to spell out whole CSRs.
fn without_values(mut errs: ErrorList) -> ErrorList {
    for err in &mut errs {
        err.bad_value = None;
    }
    errs
}

fn validate_spec(spec: &CertificateRequestSpec) -> ErrorList {
    without_values(validate_certificate_request_spec(
        spec,
        &Path::new("test"),
        &ValidationOptions::default(),
    ))
}

fn mismatch(detail: &str) -> FieldError {
    let mut err = FieldError::invalid(
        &Path::new("test").child("request"),
        "",
        format!("{MISMATCH}: {detail}"),
    );
    err.bad_value = None;
    err
}

fn spec(csr: Vec<u8>, usages: Vec<KeyUsage>, is_ca: bool) -> CertificateRequestSpec {
    util::certificate_request(csr, usages, is_ca).spec
}

fn server_client_csr() -> Vec<u8> {
    util::csr_with_usages(
        KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment,
        &[ExtendedKeyUsageOption::ServerAuth, ExtendedKeyUsageOption::ClientAuth],
    )
}

#[test]
fn test_csr_with_no_usages() {
    let csr = util::csr_pem(vec![]);
    assert!(validate_spec(&spec(csr, vec![], false)).is_empty());
}

#[test]
fn test_csr_with_double_signature_usages() {
    let csr = util::csr_with_usages(KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment, &[]);
    assert!(validate_spec(&spec(csr, vec![Signing, KeyEncipherment], false)).is_empty());
}

#[test]
fn test_csr_with_signing_alias_and_extended_usages() {
    let usages = vec![Signing, KeyEncipherment, ServerAuth, ClientAuth];
    assert!(validate_spec(&spec(server_client_csr(), usages, false)).is_empty());
}

#[test]
fn test_csr_with_reordered_usages() {
    let usages = vec![ServerAuth, ClientAuth, KeyEncipherment, DigitalSignature];
    assert!(validate_spec(&spec(server_client_csr(), usages, false)).is_empty());
}

#[test]
fn test_csr_with_duplicated_declared_usages() {
    let usages = vec![
        ServerAuth,
        ServerAuth,
        ClientAuth,
        KeyEncipherment,
        Signing,
        DigitalSignature,
    ];
    assert!(validate_spec(&spec(server_client_csr(), usages, false)).is_empty());
}

#[test]
fn test_ca_csr_with_cert_sign_declared() {
    let csr = util::csr_with_usages(
        KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment | KeyUsages::KeyCertSign,
        &[ExtendedKeyUsageOption::Any],
    );
    let usages = vec![Any, DigitalSignature, KeyEncipherment, CertSign];
    assert!(validate_spec(&spec(csr, usages, true)).is_empty());
}

#[test]
fn test_ca_csr_without_cert_sign_declared() {
    let csr = util::csr_with_usages(
        KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment | KeyUsages::KeyCertSign,
        &[
            ExtendedKeyUsageOption::Any,
            ExtendedKeyUsageOption::ClientAuth,
            ExtendedKeyUsageOption::ServerAuth,
        ],
    );
    let usages = vec![Any, DigitalSignature, KeyEncipherment, ClientAuth, ServerAuth];
    let spec = spec(csr, usages.clone(), true);
    assert!(validate_spec(&spec).is_empty());

    // The declared list is compared with cert sign added, not modified.
    assert_eq!(spec.usages, usages);
}

#[test]
fn test_ca_csr_with_signing_alias() {
    let csr = util::csr_with_usages(
        KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment | KeyUsages::KeyCertSign,
        &[
            ExtendedKeyUsageOption::Any,
            ExtendedKeyUsageOption::ClientAuth,
            ExtendedKeyUsageOption::ServerAuth,
        ],
    );
    let usages = vec![Any, Signing, KeyEncipherment, ClientAuth, ServerAuth];
    assert!(validate_spec(&spec(csr, usages, true)).is_empty());
}

#[test]
fn test_non_ca_request_does_not_get_cert_sign() {
    let csr = util::csr_with_usages(KeyUsages::DigitalSignature | KeyUsages::KeyCertSign, &[]);
    let errs = validate_spec(&spec(csr, vec![DigitalSignature], false));
    assert_eq!(errs, vec![mismatch(r#"only in csr: ["cert sign"], only in request: []"#)]);
}

#[test]
fn test_error_on_csr_missing_usages() {
    let csr = util::csr_with_usages(
        KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment,
        &[ExtendedKeyUsageOption::ServerAuth],
    );
    let usages = vec![Signing, KeyEncipherment, ServerAuth, ClientAuth];
    assert_eq!(
        validate_spec(&spec(csr, usages, false)),
        vec![mismatch(r#"only in csr: [], only in request: ["client auth"]"#)]
    );
}

#[test]
fn test_error_on_request_missing_usages() {
    let errs = validate_spec(&spec(server_client_csr(), vec![Signing, ServerAuth], false));
    assert_eq!(
        errs,
        vec![mismatch(
            r#"only in csr: ["key encipherment", "client auth"], only in request: []"#
        )]
    );

    let errs = validate_spec(&spec(server_client_csr(), vec![Any, Signing], false));
    assert_eq!(
        errs,
        vec![mismatch(concat!(
            r#"only in csr: ["key encipherment", "server auth", "client auth"], "#,
            r#"only in request: ["any"]"#,
        ))]
    );
}

#[test]
fn test_mismatch_reports_request_as_bad_value() {
    let csr = server_client_csr();
    let cr = util::certificate_request(csr.clone(), vec![ClientAuth], false);
    let errs = validate_certificate_request(&cr, &ValidationOptions::default());
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].field, "spec.request");
    assert_eq!(errs[0].error_type, FieldErrorType::Invalid);
    let expected = String::from_utf8_lossy(&csr).into_owned();
    assert_eq!(errs[0].bad_value.as_ref(), Some(&expected));
}

#[test]
fn test_csr_with_default_usages_always_matches() {
    // A CSR asking for exactly the default pair is accepted whatever the
    // request declares.
    let csr = util::csr_with_usages(KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment, &[]);
    assert!(validate_spec(&spec(csr, vec![ServerAuth, ClientAuth], false)).is_empty());
}

#[test]
fn test_declared_default_pair_skips_comparison() {
    let csr = util::csr_with_usages(
        FlagSet::from(KeyUsages::CRLSign),
        &[ExtendedKeyUsageOption::CodeSigning],
    );
    let cr = util::certificate_request(csr.clone(), vec![DigitalSignature, KeyEncipherment], false);

    let unknown = ValidationOptions::default();
    assert!(validate_certificate_request(&cr, &unknown).is_empty());

    let defaulted = ValidationOptions::builder()
        .usage_origin(UsageOrigin::Defaulted)
        .build();
    assert!(validate_certificate_request(&cr, &defaulted).is_empty());

    let explicit = ValidationOptions::builder()
        .usage_origin(UsageOrigin::Explicit)
        .build();
    let errs = without_values(validate_certificate_request(&cr, &explicit));
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].field, "spec.request");
    assert_eq!(
        errs[0].detail,
        format!(
            r#"{MISMATCH}: only in csr: ["crl sign", "code signing"], {}"#,
            r#"only in request: ["digital signature", "key encipherment"]"#,
        )
    );
}

#[test]
fn test_reordered_default_pair_is_compared() {
    let csr = util::csr_with_usages(FlagSet::from(KeyUsages::CRLSign), &[]);
    let errs = validate_spec(&spec(csr, vec![KeyEncipherment, DigitalSignature], false));
    assert_eq!(errs.len(), 1);
}

#[test]
fn test_defaulted_origin_skips_any_list() {
    let csr = util::csr_with_usages(FlagSet::from(KeyUsages::CRLSign), &[]);
    let cr = util::certificate_request(csr, vec![ServerAuth], false);
    let options = ValidationOptions::builder()
        .usage_origin(UsageOrigin::Defaulted)
        .build();
    assert!(validate_certificate_request(&cr, &options).is_empty());
}

#[test]
fn test_csr_content_validation_disabled() {
    let csr = util::csr_with_usages(FlagSet::from(KeyUsages::CRLSign), &[]);
    let cr = util::certificate_request(csr, vec![ServerAuth], false);
    let options = ValidationOptions::builder()
        .validate_csr_content(false)
        .build();
    assert!(validate_certificate_request(&cr, &options).is_empty());
}

#[test]
fn test_csr_without_usage_extensions() {
    let other = util::extension(const_oid::db::rfc5280::ID_CE_SUBJECT_ALT_NAME, vec![0x30, 0x00]);
    let csr = util::csr_pem(vec![other]);
    assert!(!Csr::from_pem(&csr).unwrap().has_usage_extensions());
    assert!(validate_spec(&spec(csr, vec![ServerAuth], false)).is_empty());
}

#[test]
fn test_csr_with_only_unknown_extended_usages() {
    // Unknown purposes are dropped, leaving nothing to compare.
    let unknown = der::oid::ObjectIdentifier::new_unwrap("1.2.3.4.5");
    let value =
        der::Encode::to_der(&x509_cert::ext::pkix::ExtendedKeyUsage(vec![unknown])).unwrap();
    let csr = util::csr_pem(vec![util::extension(
        const_oid::db::rfc5280::ID_CE_EXT_KEY_USAGE,
        value,
    )]);
    assert!(validate_spec(&spec(csr, vec![ServerAuth], false)).is_empty());
}

#[test]
fn test_malformed_key_usage_reports_one_decode_error() {
    let csr = util::csr_pem(vec![
        util::malformed_key_usage_extension(),
        util::extended_key_usage_extension(&[ExtendedKeyUsageOption::ServerAuth]),
    ]);
    let errs = validate_spec(&spec(csr, vec![ClientAuth], false));
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].field, "test.request");
    assert_eq!(errs[0].error_type, FieldErrorType::Invalid);
    assert!(
        errs[0].detail.starts_with("failed to decode csr usages: "),
        "unexpected detail: {}",
        errs[0].detail
    );
}

#[test]
fn test_key_usage_with_set_padding_bits_skips_comparison() {
    let csr = util::csr_pem(vec![
        util::extension(const_oid::db::rfc5280::ID_CE_KEY_USAGE, vec![0x03, 0x02, 0x02, 0x87]),
        util::extended_key_usage_extension(&[ExtendedKeyUsageOption::ServerAuth]),
    ]);
    let errs = validate_spec(&spec(csr, vec![ClientAuth], false));
    assert_eq!(errs.len(), 1);
    assert_eq!(
        errs[0].detail,
        "failed to decode csr usages: invalid padding bits in BIT STRING"
    );
}

#[test]
fn test_key_usage_with_trailing_bytes_is_compared() {
    let csr = util::csr_pem(vec![util::extension(
        const_oid::db::rfc5280::ID_CE_KEY_USAGE,
        vec![0x03, 0x02, 0x02, 0x84, 0x00],
    )]);
    assert!(validate_spec(&spec(csr.clone(), vec![DigitalSignature, CertSign], false)).is_empty());
    assert_eq!(
        validate_spec(&spec(csr, vec![DigitalSignature], false)),
        vec![mismatch(r#"only in csr: ["cert sign"], only in request: []"#)]
    );
}

#[test]
fn test_malformed_extended_key_usage() {
    let csr = util::csr_pem(vec![
        util::key_usage_extension(FlagSet::from(KeyUsages::DigitalSignature)),
        util::extension(const_oid::db::rfc5280::ID_CE_EXT_KEY_USAGE, vec![0x30, 0x05, 0x06]),
    ]);
    let errs = validate_spec(&spec(csr, vec![ServerAuth], false));
    assert_eq!(errs.len(), 1);
    assert!(errs[0].detail.starts_with("failed to decode csr extended usages: "));
}

#[test]
fn test_each_malformed_extension_reported_once() {
    let csr = util::csr_pem(vec![
        util::malformed_key_usage_extension(),
        util::extension(const_oid::db::rfc5280::ID_CE_EXT_KEY_USAGE, vec![0x04, 0x00]),
    ]);
    let errs = validate_spec(&spec(csr, vec![ServerAuth], false));
    assert_eq!(errs.len(), 2);
    assert!(errs[0].detail.starts_with("failed to decode csr usages: "));
    assert!(errs[1].detail.starts_with("failed to decode csr extended usages: "));
}

#[test]
fn test_missing_request_and_issuer_name() {
    let errs = validate_certificate_request(
        &CertificateRequest::default(),
        &ValidationOptions::default(),
    );
    assert_eq!(
        errs,
        vec![
            FieldError::required(
                &Path::new("spec").child("issuerRef").child("name"),
                "must be specified",
            ),
            FieldError::required(&Path::new("spec").child("request"), "must be specified"),
        ]
    );
}

#[test]
fn test_undecodable_request() {
    let cr = util::certificate_request(b"not a csr".to_vec(), vec![ServerAuth], false);
    let errs = validate_certificate_request(&cr, &ValidationOptions::default());
    assert_eq!(errs.len(), 1);
    assert_eq!(errs[0].field, "spec.request");
    assert_eq!(errs[0].bad_value.as_deref(), Some("not a csr"));
    assert!(errs[0].detail.starts_with("failed to decode csr: "));

    let garbage = pem::encode(&pem::Pem::new(
        "CERTIFICATE REQUEST",
        vec![0x30, 0x03, 0x02, 0x01, 0x00],
    ));
    let cr = util::certificate_request(garbage.into_bytes(), vec![], false);
    let errs = validate_certificate_request(&cr, &ValidationOptions::default());
    assert_eq!(errs.len(), 1);
    assert!(errs[0].detail.starts_with("failed to decode csr: "));
}

#[test]
fn test_csr_round_trip_keeps_requested_usages() {
    let pem_bytes = server_client_csr();
    let csr = Csr::from_pem(&pem_bytes).unwrap();
    let again = Csr::from_pem(csr.to_pem().unwrap().as_bytes()).unwrap();
    assert_eq!(again.extensions(), csr.extensions());
    let from_der = Csr::from_der(&csr.to_der().unwrap()).unwrap();
    assert_eq!(from_der.extensions(), csr.extensions());
    let wrapped = Csr::from_cert_req(csr.inner.clone()).unwrap();
    assert_eq!(wrapped.extensions(), csr.extensions());
    let requested = again.requested_usages();
    assert!(requested.errors.is_empty());
    assert_eq!(requested.usages, vec![DigitalSignature, KeyEncipherment, ServerAuth, ClientAuth]);
}

#[test]
fn test_last_duplicated_extension_wins() {
    let csr = util::csr_pem(vec![
        util::key_usage_extension(FlagSet::from(KeyUsages::CRLSign)),
        util::key_usage_extension(FlagSet::from(KeyUsages::DigitalSignature)),
    ]);
    let requested = Csr::from_pem(&csr).unwrap().requested_usages();
    assert_eq!(requested.usages, vec![DigitalSignature]);
}

fn base_request() -> CertificateRequest {
    let mut cr = util::certificate_request(util::csr_pem(vec![]), vec![], false);
    cr.metadata.annotations = BTreeMap::from([
        ("abc".to_string(), "123".to_string()),
        ("cert-manager.io/foo".to_string(), "abc".to_string()),
        ("acme.cert-manager.io/bar".to_string(), "123".to_string()),
    ]);
    cr.spec.uid = "abc".to_string();
    cr.spec.username = "user-1".to_string();
    cr.spec.groups = vec!["group-1".to_string(), "group-2".to_string()];
    cr.spec.extra = BTreeMap::from([
        ("1".to_string(), vec!["abc".to_string(), "efg".to_string()]),
        ("2".to_string(), vec!["efg".to_string(), "abc".to_string()]),
    ]);
    cr
}

fn changed_request(annotations: &[(&str, &str)]) -> CertificateRequest {
    let mut cr = CertificateRequest::default();
    cr.metadata.annotations = annotations
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    cr.spec.request = util::csr_pem(vec![]);
    cr
}

fn annotation_error(key: &str) -> FieldError {
    FieldError::forbidden(
        &Path::new("metadata").child("annotations").child(key),
        "cannot change cert-manager annotation after creation",
    )
}

fn spec_error() -> FieldError {
    FieldError::forbidden(&Path::new("spec"), "cannot change spec after creation")
}

#[test]
fn test_update_changing_spec_and_cert_manager_annotation() {
    let new = changed_request(&[("acme.cert-manager.io/bar", "123"), ("123", "abc")]);
    assert_eq!(
        validate_update_certificate_request(&base_request(), &new),
        vec![annotation_error("cert-manager.io/foo"), spec_error()]
    );
}

#[test]
fn test_update_changing_spec_and_acme_annotation() {
    let new = changed_request(&[("cert-manager.io/foo", "abc"), ("123", "abc")]);
    assert_eq!(
        validate_update_certificate_request(&base_request(), &new),
        vec![annotation_error("acme.cert-manager.io/bar"), spec_error()]
    );
}

#[test]
fn test_update_without_changes() {
    assert!(validate_update_certificate_request(&base_request(), &base_request()).is_empty());
}

#[test]
fn test_update_may_change_other_annotations() {
    let mut new = base_request();
    new.metadata.annotations.insert("abc".to_string(), "456".to_string());
    new.metadata.annotations.insert("example.com/new".to_string(), "x".to_string());
    assert!(validate_update_certificate_request(&base_request(), &new).is_empty());
}

#[test]
fn test_update_adding_and_changing_cert_manager_annotations() {
    let mut new = base_request();
    new.metadata.annotations.insert("cert-manager.io/foo".to_string(), "changed".to_string());
    new.metadata.annotations.insert("cert-manager.io/added".to_string(), "x".to_string());
    assert_eq!(
        validate_update_certificate_request(&base_request(), &new),
        vec![
            annotation_error("cert-manager.io/foo"),
            annotation_error("cert-manager.io/added"),
            annotation_error("cert-manager.io/foo"),
        ]
    );
}
