//! Key usages as declared on certificate requests, and the rules for
//! comparing them.
//!
//! X.509 has a single `digitalSignature` bit, but the API accepts two names
//! for it: the legacy `signing` and `digital signature`. Both are kept as
//! distinct [`KeyUsage`] variants so that values round trip unchanged, and
//! [`KeyUsage::canonical`] maps them onto one value for every comparison.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsages;

use crate::csr::extensions::ExtendedKeyUsageOption;
use crate::error::CertCheckError;

/// A key usage or extended key usage a certificate may be requested with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyUsage {
    /// Legacy alias of [`KeyUsage::DigitalSignature`].
    Signing,
    DigitalSignature,
    ContentCommitment,
    KeyEncipherment,
    KeyAgreement,
    DataEncipherment,
    CertSign,
    CrlSign,
    EncipherOnly,
    DecipherOnly,
    Any,
    ServerAuth,
    ClientAuth,
    CodeSigning,
    EmailProtection,
    SMime,
    IpsecEndSystem,
    IpsecTunnel,
    IpsecUser,
    Timestamping,
    OcspSigning,
    MicrosoftSgc,
    NetscapeSgc,
}

/// The usages filled in when a request does not choose any.
pub const DEFAULT_KEY_USAGES: [KeyUsage; 2] =
    [KeyUsage::DigitalSignature, KeyUsage::KeyEncipherment];

impl KeyUsage {
    /// Every usage, in declaration order.
    pub const ALL: [KeyUsage; 23] = [
        KeyUsage::Signing,
        KeyUsage::DigitalSignature,
        KeyUsage::ContentCommitment,
        KeyUsage::KeyEncipherment,
        KeyUsage::KeyAgreement,
        KeyUsage::DataEncipherment,
        KeyUsage::CertSign,
        KeyUsage::CrlSign,
        KeyUsage::EncipherOnly,
        KeyUsage::DecipherOnly,
        KeyUsage::Any,
        KeyUsage::ServerAuth,
        KeyUsage::ClientAuth,
        KeyUsage::CodeSigning,
        KeyUsage::EmailProtection,
        KeyUsage::SMime,
        KeyUsage::IpsecEndSystem,
        KeyUsage::IpsecTunnel,
        KeyUsage::IpsecUser,
        KeyUsage::Timestamping,
        KeyUsage::OcspSigning,
        KeyUsage::MicrosoftSgc,
        KeyUsage::NetscapeSgc,
    ];

    /// The API string for this usage.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyUsage::Signing => "signing",
            KeyUsage::DigitalSignature => "digital signature",
            KeyUsage::ContentCommitment => "content commitment",
            KeyUsage::KeyEncipherment => "key encipherment",
            KeyUsage::KeyAgreement => "key agreement",
            KeyUsage::DataEncipherment => "data encipherment",
            KeyUsage::CertSign => "cert sign",
            KeyUsage::CrlSign => "crl sign",
            KeyUsage::EncipherOnly => "encipher only",
            KeyUsage::DecipherOnly => "decipher only",
            KeyUsage::Any => "any",
            KeyUsage::ServerAuth => "server auth",
            KeyUsage::ClientAuth => "client auth",
            KeyUsage::CodeSigning => "code signing",
            KeyUsage::EmailProtection => "email protection",
            KeyUsage::SMime => "s/mime",
            KeyUsage::IpsecEndSystem => "ipsec end system",
            KeyUsage::IpsecTunnel => "ipsec tunnel",
            KeyUsage::IpsecUser => "ipsec user",
            KeyUsage::Timestamping => "timestamping",
            KeyUsage::OcspSigning => "ocsp signing",
            KeyUsage::MicrosoftSgc => "microsoft sgc",
            KeyUsage::NetscapeSgc => "netscape sgc",
        }
    }

    /// Maps aliases onto the single value they stand for.
    ///
    /// Only [`KeyUsage::Signing`] is an alias today; it maps to
    /// [`KeyUsage::DigitalSignature`]. Every other usage is its own canonical
    /// value.
    pub fn canonical(self) -> Self {
        match self {
            KeyUsage::Signing => KeyUsage::DigitalSignature,
            other => other,
        }
    }

    /// Converts the RFC 5280 key usage bits of a certificate or request into
    /// usages, followed by the given extended usages.
    ///
    /// # Arguments
    /// * `flags` - The decoded KeyUsage extension bits.
    /// * `extended` - The recognised ExtendedKeyUsage purposes, in extension order.
    ///
    /// # Returns
    /// The key usages, with key agreement listed ahead of data encipherment,
    /// then the extended usages.
    pub fn from_x509(
        flags: FlagSet<KeyUsages>,
        extended: &[ExtendedKeyUsageOption],
    ) -> Vec<Self> {
        const BITS: [(KeyUsages, KeyUsage); 9] = [
            (KeyUsages::DigitalSignature, KeyUsage::DigitalSignature),
            (KeyUsages::NonRepudiation, KeyUsage::ContentCommitment),
            (KeyUsages::KeyEncipherment, KeyUsage::KeyEncipherment),
            (KeyUsages::KeyAgreement, KeyUsage::KeyAgreement),
            (KeyUsages::DataEncipherment, KeyUsage::DataEncipherment),
            (KeyUsages::KeyCertSign, KeyUsage::CertSign),
            (KeyUsages::CRLSign, KeyUsage::CrlSign),
            (KeyUsages::EncipherOnly, KeyUsage::EncipherOnly),
            (KeyUsages::DecipherOnly, KeyUsage::DecipherOnly),
        ];

        BITS.iter()
            .filter(|(bit, _)| flags.contains(*bit))
            .map(|(_, usage)| *usage)
            .chain(extended.iter().map(|option| KeyUsage::from(*option)))
            .collect()
    }
}

impl From<ExtendedKeyUsageOption> for KeyUsage {
    fn from(value: ExtendedKeyUsageOption) -> Self {
        match value {
            ExtendedKeyUsageOption::Any => KeyUsage::Any,
            ExtendedKeyUsageOption::ServerAuth => KeyUsage::ServerAuth,
            ExtendedKeyUsageOption::ClientAuth => KeyUsage::ClientAuth,
            ExtendedKeyUsageOption::CodeSigning => KeyUsage::CodeSigning,
            ExtendedKeyUsageOption::EmailProtection => KeyUsage::EmailProtection,
            ExtendedKeyUsageOption::IpsecEndSystem => KeyUsage::IpsecEndSystem,
            ExtendedKeyUsageOption::IpsecTunnel => KeyUsage::IpsecTunnel,
            ExtendedKeyUsageOption::IpsecUser => KeyUsage::IpsecUser,
            ExtendedKeyUsageOption::TimeStamping => KeyUsage::Timestamping,
            ExtendedKeyUsageOption::OcspSigning => KeyUsage::OcspSigning,
            ExtendedKeyUsageOption::MicrosoftServerGatedCrypto => KeyUsage::MicrosoftSgc,
            ExtendedKeyUsageOption::NetscapeServerGatedCrypto => KeyUsage::NetscapeSgc,
        }
    }
}

impl fmt::Display for KeyUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyUsage {
    type Err = CertCheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyUsage::ALL
            .iter()
            .find(|usage| usage.as_str() == s)
            .copied()
            .ok_or_else(|| CertCheckError::InvalidInput(format!("unknown key usage {s:?}")))
    }
}

/// Collapses `signing` and `digital signature` into a single
/// `digital signature` entry.
///
/// The first alias seen is replaced by [`KeyUsage::DigitalSignature`] and
/// every later alias is dropped. All other usages pass through unchanged and
/// in order, duplicates included. Normalizing twice gives the same result as
/// normalizing once.
pub fn normalize(usages: &[KeyUsage]) -> Vec<KeyUsage> {
    let mut seen_signature = false;
    usages
        .iter()
        .filter_map(|usage| match usage.canonical() {
            KeyUsage::DigitalSignature if seen_signature => None,
            KeyUsage::DigitalSignature => {
                seen_signature = true;
                Some(KeyUsage::DigitalSignature)
            }
            other => Some(other),
        })
        .collect()
}

/// Reports whether two usage lists request the same set of usages, ignoring
/// order, duplicates and the `signing` alias.
///
/// # Example
/// ```
/// use certcheck::usage::{KeyUsage, usages_equal};
///
/// assert!(usages_equal(
///     &[KeyUsage::Signing, KeyUsage::ServerAuth],
///     &[KeyUsage::ServerAuth, KeyUsage::DigitalSignature, KeyUsage::ServerAuth],
/// ));
/// assert!(!usages_equal(&[KeyUsage::ServerAuth], &[KeyUsage::ClientAuth]));
/// ```
pub fn usages_equal(a: &[KeyUsage], b: &[KeyUsage]) -> bool {
    usage_set(a) == usage_set(b)
}

/// The normalized, unordered set of usages in `usages`.
pub fn usage_set(usages: &[KeyUsage]) -> BTreeSet<KeyUsage> {
    normalize(usages).into_iter().collect()
}

/// Returns a copy of `usages` that is guaranteed to contain
/// [`KeyUsage::CertSign`], appending it when missing.
pub fn with_cert_sign(usages: &[KeyUsage]) -> Vec<KeyUsage> {
    let mut out = usages.to_vec();
    if !out.contains(&KeyUsage::CertSign) {
        out.push(KeyUsage::CertSign);
    }
    out
}
