pub mod extensions;

use der::{Decode, Encode, oid::ObjectIdentifier};
use extensions::{ExtendedKeyUsageExt, FlagSet, KeyUsageExt, ToAndFromX509Extension};
use x509_cert::ext::Extension;
use x509_cert::request::CertReq;

use crate::error::CertCheckError;
use crate::usage::KeyUsage;

pub type Result<T> = std::result::Result<T, CertCheckError>;

/// PKCS#9 extensionRequest attribute, carrying the extensions a CSR asks for.
pub const EXTENSION_REQUEST: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.14");

/// Represents a decoded PKCS#10 certificate signing request.
///
/// The requested extensions are pulled out of the extensionRequest attribute
/// while decoding, so a request with a malformed attribute never gets this
/// far. Signatures are not verified.
#[derive(Debug, Clone)]
pub struct Csr {
    /// The inner representation of the request.
    pub inner: CertReq,
    extensions: Vec<Extension>,
}

impl Csr {
    /// Decodes a request from PEM.
    ///
    /// The first PEM block is used regardless of its label.
    ///
    /// # Arguments
    /// * `pem_bytes` - The PEM encoded request.
    ///
    /// # Returns
    /// The decoded request, or a `DecodingError` naming what went wrong.
    pub fn from_pem(pem_bytes: &[u8]) -> Result<Self> {
        let block = pem::parse(pem_bytes)?;
        Self::from_der(block.contents())
    }

    /// Decodes a request from DER.
    pub fn from_der(der_bytes: &[u8]) -> Result<Self> {
        let inner = CertReq::from_der(der_bytes)?;
        let extensions = requested_extensions(&inner)?;
        Ok(Self { inner, extensions })
    }

    /// Wraps an already parsed request.
    pub fn from_cert_req(inner: CertReq) -> Result<Self> {
        let extensions = requested_extensions(&inner)?;
        Ok(Self { inner, extensions })
    }

    /// Encodes the request into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CertCheckError::EncodingError(e.to_string()))
    }

    /// Encodes the request into PEM format with the `CERTIFICATE REQUEST` label.
    pub fn to_pem(&self) -> Result<String> {
        let block = pem::Pem::new("CERTIFICATE REQUEST", self.to_der()?);
        Ok(pem::encode_config(&block, pem::EncodeConfig::new()))
    }

    /// All extensions requested through the extensionRequest attribute, in
    /// attribute order.
    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    /// Reports whether the request carries a KeyUsage or ExtendedKeyUsage
    /// extension.
    pub fn has_usage_extensions(&self) -> bool {
        self.extensions
            .iter()
            .any(|ext| ext.extn_id == KeyUsageExt::OID || ext.extn_id == ExtendedKeyUsageExt::OID)
    }

    /// Derives the usages this request asks for from its KeyUsage and
    /// ExtendedKeyUsage extensions.
    ///
    /// A malformed extension is recorded in [`RequestedUsages::errors`] and
    /// skipped, the other extensions are still decoded. When an extension
    /// appears more than once the last occurrence wins.
    pub fn requested_usages(&self) -> RequestedUsages {
        let mut key_usage = KeyUsageExt(FlagSet::empty());
        let mut extended = ExtendedKeyUsageExt::default();
        let mut errors = Vec::new();

        for ext in &self.extensions {
            let value = ext.extn_value.as_bytes();
            if ext.extn_id == ExtendedKeyUsageExt::OID {
                match ExtendedKeyUsageExt::from_x509_extension_value(value) {
                    Ok(decoded) => extended = decoded,
                    Err(e) => errors.push(e),
                }
            }
            if ext.extn_id == KeyUsageExt::OID {
                match KeyUsageExt::from_x509_extension_value(value) {
                    Ok(decoded) => key_usage = decoded,
                    Err(e) => errors.push(e),
                }
            }
        }

        RequestedUsages {
            usages: KeyUsage::from_x509(key_usage.0, &extended.usage),
            errors,
        }
    }
}

/// The outcome of [`Csr::requested_usages`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestedUsages {
    /// Usages decoded from the extensions that could be read.
    pub usages: Vec<KeyUsage>,
    /// One entry per extension whose payload could not be decoded.
    pub errors: Vec<CertCheckError>,
}

fn requested_extensions(req: &CertReq) -> Result<Vec<Extension>> {
    let mut extensions = Vec::new();
    for attr in req.info.attributes.iter() {
        if attr.oid != EXTENSION_REQUEST {
            continue;
        }
        for value in attr.values.iter() {
            let requested = Vec::<Extension>::from_der(&value.to_der()?).map_err(|e| {
                CertCheckError::DecodingError(format!("invalid extension request attribute: {e}"))
            })?;
            extensions.extend(requested);
        }
    }
    Ok(extensions)
}
