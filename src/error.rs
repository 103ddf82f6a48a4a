//! use certcheck::error::CertCheckError;

use thiserror::Error;

/// Represents errors that can occur while decoding certificate requests and
/// their extensions.
///
/// Validators never return these directly. They are folded into
/// [`FieldError`](crate::field::FieldError)s at the validation boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CertCheckError {
    /// Error during data encoding.
    #[error("Failed to encode data: {0}")]
    EncodingError(String),

    /// Error during data decoding.
    #[error("Failed to decode data: {0}")]
    DecodingError(String),

    /// Error due to invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The KeyUsage extension payload is not a valid bit string.
    #[error("failed to decode csr usages: {0}")]
    KeyUsageDecode(String),

    /// The ExtendedKeyUsage extension payload is not a valid OID sequence.
    #[error("failed to decode csr extended usages: {0}")]
    ExtendedKeyUsageDecode(String),
}

impl From<der::Error> for CertCheckError {
    /// Converts a `der::Error` into a `CertCheckError`.
    fn from(err: der::Error) -> Self {
        CertCheckError::DecodingError(err.to_string())
    }
}

impl From<pem::PemError> for CertCheckError {
    fn from(err: pem::PemError) -> Self {
        CertCheckError::DecodingError(err.to_string())
    }
}
