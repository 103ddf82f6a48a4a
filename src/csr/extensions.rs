use const_oid::AssociatedOid;
use der::{Decode, Encode, SliceReader, asn1::BitString, oid::ObjectIdentifier};

pub use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsage as X509KeyUsage;
pub use x509_cert::ext::pkix::KeyUsages;

use crate::error::CertCheckError;

/// Trait for converting to and from X.509 extensions.
///
/// This trait provides methods to encode and decode X.509 extension values.
///
/// # Example
/// ```
/// use certcheck::csr::extensions::{KeyUsageExt, KeyUsages, ToAndFromX509Extension};
///
/// let ku = KeyUsageExt(KeyUsages::DigitalSignature | KeyUsages::KeyEncipherment);
/// let encoded = ku.to_x509_extension_value().unwrap();
/// let decoded = KeyUsageExt::from_x509_extension_value(&encoded).unwrap();
/// assert_eq!(ku, decoded);
/// ```
pub trait ToAndFromX509Extension {
    /// The Object Identifier (OID) for the extension.
    const OID: ObjectIdentifier;

    /// Encodes the extension into a DER-encoded byte vector.
    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CertCheckError>;

    /// Decodes the extension from a DER-encoded byte slice.
    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertCheckError>
    where
        Self: Sized;
}

/// Number of named bits in the RFC 5280 KeyUsage bit string.
const KEY_USAGE_BITS: usize = 9;

/// Represents the Key Usage extension.
///
/// Decoding reads the first nine bits of the bit string, one per RFC 5280
/// usage, and ignores anything past them. Set padding bits are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyUsageExt(pub FlagSet<KeyUsages>);

impl ToAndFromX509Extension for KeyUsageExt {
    const OID: ObjectIdentifier = <X509KeyUsage as AssociatedOid>::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CertCheckError> {
        let ku = X509KeyUsage(self.0);
        ku.to_der()
            .map_err(|e| CertCheckError::EncodingError(e.to_string()))
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertCheckError> {
        // Bytes after the bit string are ignored.
        let bits = SliceReader::new(extension)
            .and_then(|mut reader| BitString::decode(&mut reader))
            .map_err(|e| CertCheckError::KeyUsageDecode(e.to_string()))?;

        let padding = (1u8 << bits.unused_bits()) - 1;
        if bits.raw_bytes().last().is_some_and(|last| last & padding != 0) {
            return Err(CertCheckError::KeyUsageDecode(
                "invalid padding bits in BIT STRING".to_string(),
            ));
        }

        // RFC 5280, 4.2.1.3: bit 0 is the most significant bit of the first byte.
        let mask = bits
            .bits()
            .take(KEY_USAGE_BITS)
            .enumerate()
            .filter(|(_, set)| *set)
            .fold(0u16, |mask, (i, _)| mask | (1 << i));

        Ok(Self(FlagSet::new_truncated(mask)))
    }
}

/// Represents the Extended Key Usage extension.
///
/// Purposes without a matching [`ExtendedKeyUsageOption`] are dropped while
/// decoding rather than reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendedKeyUsageExt {
    pub usage: Vec<ExtendedKeyUsageOption>,
}

impl ToAndFromX509Extension for ExtendedKeyUsageExt {
    const OID: ObjectIdentifier = x509_cert::ext::pkix::ExtendedKeyUsage::OID;

    fn to_x509_extension_value(&self) -> Result<Vec<u8>, CertCheckError> {
        let oids: Vec<ObjectIdentifier> = self.usage.iter().map(|v| (*v).into()).collect();
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage(oids);
        eku.to_der()
            .map_err(|e| CertCheckError::EncodingError(e.to_string()))
    }

    fn from_x509_extension_value(extension: &[u8]) -> Result<Self, CertCheckError> {
        let eku = x509_cert::ext::pkix::ExtendedKeyUsage::from_der(extension)
            .map_err(|e| CertCheckError::ExtendedKeyUsageDecode(e.to_string()))?;
        let usage = eku
            .0
            .iter()
            .filter_map(ExtendedKeyUsageOption::from_oid)
            .collect();
        Ok(Self { usage })
    }
}

const ANY_EXTENDED_KEY_USAGE: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.5.29.37.0");
const ID_KP_IPSEC_END_SYSTEM: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.5");
const ID_KP_IPSEC_TUNNEL: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.6");
const ID_KP_IPSEC_USER: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.6.1.5.5.7.3.7");
const MICROSOFT_SERVER_GATED_CRYPTO: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.311.10.3.3");
const NETSCAPE_SERVER_GATED_CRYPTO: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("2.16.840.1.113730.4.1");

/// Represents an option for the Extended Key Usage extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExtendedKeyUsageOption {
    Any,
    ServerAuth,
    ClientAuth,
    CodeSigning,
    EmailProtection,
    IpsecEndSystem,
    IpsecTunnel,
    IpsecUser,
    TimeStamping,
    OcspSigning,
    MicrosoftServerGatedCrypto,
    NetscapeServerGatedCrypto,
}

impl ExtendedKeyUsageOption {
    const ALL: [ExtendedKeyUsageOption; 12] = [
        ExtendedKeyUsageOption::Any,
        ExtendedKeyUsageOption::ServerAuth,
        ExtendedKeyUsageOption::ClientAuth,
        ExtendedKeyUsageOption::CodeSigning,
        ExtendedKeyUsageOption::EmailProtection,
        ExtendedKeyUsageOption::IpsecEndSystem,
        ExtendedKeyUsageOption::IpsecTunnel,
        ExtendedKeyUsageOption::IpsecUser,
        ExtendedKeyUsageOption::TimeStamping,
        ExtendedKeyUsageOption::OcspSigning,
        ExtendedKeyUsageOption::MicrosoftServerGatedCrypto,
        ExtendedKeyUsageOption::NetscapeServerGatedCrypto,
    ];

    /// Looks up the purpose identified by `oid`, if it is a known one.
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|option| ObjectIdentifier::from(*option) == *oid)
    }
}

impl From<ExtendedKeyUsageOption> for ObjectIdentifier {
    fn from(value: ExtendedKeyUsageOption) -> Self {
        match value {
            ExtendedKeyUsageOption::Any => ANY_EXTENDED_KEY_USAGE,
            ExtendedKeyUsageOption::ServerAuth => const_oid::db::rfc5912::ID_KP_SERVER_AUTH,
            ExtendedKeyUsageOption::ClientAuth => const_oid::db::rfc5912::ID_KP_CLIENT_AUTH,
            ExtendedKeyUsageOption::CodeSigning => const_oid::db::rfc5912::ID_KP_CODE_SIGNING,
            ExtendedKeyUsageOption::EmailProtection => {
                const_oid::db::rfc5912::ID_KP_EMAIL_PROTECTION
            }
            ExtendedKeyUsageOption::IpsecEndSystem => ID_KP_IPSEC_END_SYSTEM,
            ExtendedKeyUsageOption::IpsecTunnel => ID_KP_IPSEC_TUNNEL,
            ExtendedKeyUsageOption::IpsecUser => ID_KP_IPSEC_USER,
            ExtendedKeyUsageOption::TimeStamping => const_oid::db::rfc5912::ID_KP_TIME_STAMPING,
            ExtendedKeyUsageOption::OcspSigning => const_oid::db::rfc5912::ID_KP_OCSP_SIGNING,
            ExtendedKeyUsageOption::MicrosoftServerGatedCrypto => MICROSOFT_SERVER_GATED_CRYPTO,
            ExtendedKeyUsageOption::NetscapeServerGatedCrypto => NETSCAPE_SERVER_GATED_CRYPTO,
        }
    }
}
