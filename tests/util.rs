#![allow(dead_code)]

use std::str::FromStr;

use certcheck::csr::EXTENSION_REQUEST;
use certcheck::csr::extensions::{
    ExtendedKeyUsageExt, ExtendedKeyUsageOption, FlagSet, KeyUsageExt, KeyUsages,
    ToAndFromX509Extension,
};
use certcheck::resources::{
    CertificateRequest, CertificateRequestSpec, ObjectReference, SecretKeySelector,
};
use certcheck::usage::KeyUsage;
use const_oid::db::rfc5912::ECDSA_WITH_SHA_256;
use der::asn1::{Any, BitString, OctetString, SetOfVec};
use der::{Decode, Encode};
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use p256::pkcs8::EncodePublicKey;
use x509_cert::attr::Attribute;
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::request::{CertReq, CertReqInfo, Version};
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

/// A fixed key so that fixtures are reproducible.
pub fn signing_key() -> SigningKey {
    SigningKey::from_slice(&[0x11; 32]).unwrap()
}

pub fn extension(oid: der::oid::ObjectIdentifier, value: Vec<u8>) -> Extension {
    Extension {
        extn_id: oid,
        critical: false,
        extn_value: OctetString::new(value).unwrap(),
    }
}

pub fn key_usage_extension(flags: FlagSet<KeyUsages>) -> Extension {
    extension(
        KeyUsageExt::OID,
        KeyUsageExt(flags).to_x509_extension_value().unwrap(),
    )
}

pub fn extended_key_usage_extension(usage: &[ExtendedKeyUsageOption]) -> Extension {
    let ext = ExtendedKeyUsageExt {
        usage: usage.to_vec(),
    };
    extension(ExtendedKeyUsageExt::OID, ext.to_x509_extension_value().unwrap())
}

/// A KeyUsage extension whose payload is an OCTET STRING instead of a BIT STRING.
pub fn malformed_key_usage_extension() -> Extension {
    extension(KeyUsageExt::OID, vec![0x04, 0x01, 0x00])
}

/// A signed CSR carrying `extensions` in its extensionRequest attribute,
/// encoded as PEM. No attribute is added when `extensions` is empty.
pub fn csr_pem(extensions: Vec<Extension>) -> Vec<u8> {
    let key = signing_key();
    let public_key_der = key.verifying_key().to_public_key_der().unwrap();

    let attributes = if extensions.is_empty() {
        SetOfVec::new()
    } else {
        let value = Any::encode_from(&extensions).unwrap();
        let attribute = Attribute {
            oid: EXTENSION_REQUEST,
            values: SetOfVec::try_from(vec![value]).unwrap(),
        };
        SetOfVec::try_from(vec![attribute]).unwrap()
    };

    let info = CertReqInfo {
        version: Version::V1,
        subject: Name::from_str("CN=test").unwrap(),
        public_key: SubjectPublicKeyInfoOwned::from_der(public_key_der.as_bytes()).unwrap(),
        attributes,
    };

    let signature: Signature = key.sign(&info.to_der().unwrap());
    let req = CertReq {
        info,
        algorithm: AlgorithmIdentifierOwned {
            oid: ECDSA_WITH_SHA_256,
            parameters: None,
        },
        signature: BitString::from_bytes(signature.to_der().as_bytes()).unwrap(),
    };

    let block = pem::Pem::new("CERTIFICATE REQUEST", req.to_der().unwrap());
    pem::encode(&block).into_bytes()
}

/// A CSR asking for the given key usage bits and extended usages. Either
/// extension is left out when it would be empty.
pub fn csr_with_usages(flags: FlagSet<KeyUsages>, extended: &[ExtendedKeyUsageOption]) -> Vec<u8> {
    let mut extensions = Vec::new();
    if !flags.is_empty() {
        extensions.push(key_usage_extension(flags));
    }
    if !extended.is_empty() {
        extensions.push(extended_key_usage_extension(extended));
    }
    csr_pem(extensions)
}

/// A request against a valid issuer reference, carrying `csr` and `usages`.
pub fn certificate_request(csr: Vec<u8>, usages: Vec<KeyUsage>, is_ca: bool) -> CertificateRequest {
    let spec = CertificateRequestSpec::builder()
        .request(csr)
        .issuer_ref(ObjectReference {
            name: "ca-issuer".to_string(),
            ..Default::default()
        })
        .usages(usages)
        .is_ca(is_ca)
        .build();
    CertificateRequest {
        spec,
        ..Default::default()
    }
}

pub fn valid_secret_key_ref() -> SecretKeySelector {
    SecretKeySelector::new("valid", "validkey")
}
