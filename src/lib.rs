//! # CertCheck - Admission Validation for Certificate Resources
//!
//! CertCheck validates the resources of a Kubernetes certificate manager
//! before they are admitted: certificate requests, issuers and their ACME
//! solvers. It is built on the rustcrypto X.509 stack and performs no I/O.
//!
//! ## Key Features
//!
//! - **CSR usage reconciliation**: the KeyUsage and ExtendedKeyUsage
//!   extensions inside a PKCS#10 request are compared with the usages the
//!   request declares, ignoring order, duplicates and the `signing` alias.
//! - **Field errors**: every problem is reported against a field path, and
//!   all problems are reported at once.
//! - **Issuer checks**: ACME, CA, self-signed and Vault issuers, including
//!   HTTP01 and DNS01 solver configuration.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use certcheck::{
//!     resources::{CertificateRequest, CertificateRequestSpec, ObjectReference},
//!     usage::KeyUsage,
//!     validation::{UsageOrigin, ValidationOptions, validate_certificate_request},
//! };
//!
//! # fn main() {
//! let csr_pem = std::fs::read("request.csr").unwrap();
//!
//! let spec = CertificateRequestSpec::builder()
//!     .request(csr_pem)
//!     .issuer_ref(ObjectReference { name: "ca-issuer".to_string(), ..Default::default() })
//!     .usages(vec![KeyUsage::Signing, KeyUsage::KeyEncipherment, KeyUsage::ServerAuth])
//!     .build();
//! let cr = CertificateRequest { spec, ..Default::default() };
//!
//! let options = ValidationOptions::builder()
//!     .usage_origin(UsageOrigin::Explicit)
//!     .build();
//! for err in validate_certificate_request(&cr, &options) {
//!     println!("{err}");
//! }
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Validators return an [`field::ErrorList`]. Decoding helpers return
//! [`error::CertCheckError`]:
//!
//! ```rust
//! use certcheck::{csr::Csr, error::CertCheckError};
//!
//! match Csr::from_pem(b"invalid pem data") {
//!     Ok(_) => println!("request decoded"),
//!     Err(CertCheckError::DecodingError(msg)) => println!("Failed to decode request: {}", msg),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`csr`]: PKCS#10 decoding and usage extension codecs
//! - [`usage`]: Key usages, alias normalization and set comparison
//! - [`field`]: Field paths and field errors
//! - [`resources`]: The validated resource models
//! - [`validation`]: Certificate request and issuer validators
//! - [`error`]: Decoding error types

pub mod csr;
pub mod error;
pub mod field;
pub mod resources;
pub mod usage;
pub mod validation;
