//! Issuer resources and their ACME solver configuration.
//!
//! Optional sub-configurations are `Option`s: `None` means the block is
//! absent, which is different from a present block with every field empty.

use std::collections::BTreeMap;

use super::{ObjectMeta, SecretKeySelector};

/// A namespaced issuer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Issuer {
    pub metadata: ObjectMeta,
    pub spec: IssuerSpec,
}

/// A cluster scoped issuer. Same configuration as [`Issuer`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterIssuer {
    pub metadata: ObjectMeta,
    pub spec: IssuerSpec,
}

/// Exactly one of the issuer types must be configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuerSpec {
    pub acme: Option<AcmeIssuer>,
    pub ca: Option<CaIssuer>,
    pub self_signed: Option<SelfSignedIssuer>,
    pub vault: Option<VaultIssuer>,
}

/// Signs with a CA key pair stored in a Secret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaIssuer {
    pub secret_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelfSignedIssuer {}

/// Signs through a HashiCorp Vault PKI backend.
///
/// # Fields
/// * `server` - The Vault server URL.
/// * `path` - The path of the signing endpoint.
/// * `ca_bundle` - PEM encoded CA certificates used to verify the server.
///   Empty means the system roots.
/// * `auth` - How to authenticate against Vault.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultIssuer {
    pub server: String,
    pub path: String,
    pub ca_bundle: Vec<u8>,
    pub auth: VaultAuth,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultAuth {
    pub token_secret_ref: Option<SecretKeySelector>,
}

/// Obtains certificates from an ACME server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcmeIssuer {
    pub email: String,
    pub server: String,
    /// The Secret holding the ACME account key.
    pub private_key: SecretKeySelector,
    pub external_account_binding: Option<ExternalAccountBinding>,
    pub solvers: Vec<AcmeChallengeSolver>,
}

/// Binds the ACME account to an account with an external CA.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalAccountBinding {
    pub key_id: String,
    pub key: SecretKeySelector,
    pub key_algorithm: String,
}

/// One way of solving ACME challenges. Exactly one of `http01` and `dns01`
/// must be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcmeChallengeSolver {
    pub http01: Option<Http01Solver>,
    pub dns01: Option<Dns01Solver>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Http01Solver {
    pub ingress: Option<Http01Ingress>,
}

/// Solves HTTP01 challenges through an Ingress.
///
/// # Fields
/// * `name` - An existing Ingress to edit.
/// * `class` - The ingress class of Ingresses to create. Mutually exclusive
///   with `name`.
/// * `service_type` - The Service type of the solver, empty, `ClusterIP` or
///   `NodePort`.
/// * `pod_template` - Overrides for the solver pod.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Http01Ingress {
    pub name: String,
    pub class: Option<String>,
    pub service_type: String,
    pub pod_template: Option<PodTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodTemplate {
    pub metadata: ObjectMeta,
    pub spec: PodSpec,
}

/// The subset of a pod spec the solver pod may be customised with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PodSpec {
    pub node_selector: BTreeMap<String, String>,
    pub tolerations: Vec<Toleration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toleration {
    pub key: String,
    pub operator: String,
    pub value: String,
    pub effect: String,
}

/// Solves DNS01 challenges through one DNS provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dns01Solver {
    /// `None` or `Follow`. Empty behaves like `None`.
    pub cname_strategy: String,
    pub akamai: Option<AkamaiProvider>,
    pub azure_dns: Option<AzureDnsProvider>,
    pub cloud_dns: Option<CloudDnsProvider>,
    pub cloudflare: Option<CloudflareProvider>,
    pub route53: Option<Route53Provider>,
    pub acme_dns: Option<AcmeDnsProvider>,
    pub digital_ocean: Option<DigitalOceanProvider>,
    pub rfc2136: Option<Rfc2136Provider>,
    pub webhook: Option<WebhookProvider>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AkamaiProvider {
    pub service_consumer_domain: String,
    pub client_token: SecretKeySelector,
    pub client_secret: SecretKeySelector,
    pub access_token: SecretKeySelector,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AzureDnsProvider {
    pub client_id: String,
    pub client_secret: SecretKeySelector,
    pub subscription_id: String,
    pub tenant_id: String,
    pub resource_group_name: String,
    pub hosted_zone_name: String,
    /// Empty, or one of the Azure cloud names.
    pub environment: String,
}

/// Google Cloud DNS. Without a service account the ambient credentials are
/// used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudDnsProvider {
    pub service_account: Option<SecretKeySelector>,
    pub project: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloudflareProvider {
    pub email: String,
    pub api_key: SecretKeySelector,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route53Provider {
    pub access_key_id: String,
    pub secret_access_key: SecretKeySelector,
    pub role: String,
    pub hosted_zone_id: String,
    pub region: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcmeDnsProvider {
    pub host: String,
    pub account_secret: SecretKeySelector,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DigitalOceanProvider {
    pub token: SecretKeySelector,
}

/// An RFC 2136 dynamic update capable name server.
///
/// # Fields
/// * `nameserver` - `host` or `host:port` where host is an IP address.
/// * `tsig_key_name` - The TSIG key name. Required when a TSIG secret is set.
/// * `tsig_algorithm` - One of the HMAC algorithms, case-insensitive.
/// * `tsig_secret` - The Secret holding the TSIG key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rfc2136Provider {
    pub nameserver: String,
    pub tsig_key_name: String,
    pub tsig_algorithm: String,
    pub tsig_secret: SecretKeySelector,
}

/// Delegates DNS01 to an out of tree webhook solver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookProvider {
    pub group_name: String,
    pub solver_name: String,
}
