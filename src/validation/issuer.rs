//! Configuration checks for issuers and ACME challenge solvers.

use std::net::{IpAddr, SocketAddr};

use der::Decode;
use x509_cert::Certificate;

use super::validate_secret_key_selector;
use crate::field::{ErrorList, FieldError, Path};
use crate::resources::issuer::{
    AcmeChallengeSolver, AcmeIssuer, CaIssuer, ClusterIssuer, Dns01Solver, Http01Ingress,
    Http01Solver, Issuer, IssuerSpec, PodTemplate, Rfc2136Provider, VaultIssuer,
};

/// TSIG algorithms accepted for RFC 2136 updates, compared case-insensitively.
pub const SUPPORTED_TSIG_ALGORITHMS: [&str; 4] =
    ["HMACMD5", "HMACSHA1", "HMACSHA256", "HMACSHA512"];

const AZURE_ENVIRONMENTS: [&str; 4] = [
    "AzurePublicCloud",
    "AzureChinaCloud",
    "AzureGermanCloud",
    "AzureUSGovernmentCloud",
];

const AZURE_ENVIRONMENT_DETAIL: &str = "must be either empty or one of AzurePublicCloud, \
    AzureChinaCloud, AzureGermanCloud or AzureUSGovernmentCloud";

const DEFAULT_DNS_PORT: u16 = 53;

pub fn validate_issuer(issuer: &Issuer) -> ErrorList {
    validate_issuer_spec(&issuer.spec, &Path::new("spec"))
}

pub fn validate_cluster_issuer(issuer: &ClusterIssuer) -> ErrorList {
    validate_issuer_spec(&issuer.spec, &Path::new("spec"))
}

/// Validates an issuer spec found at `path`.
///
/// Exactly one issuer type may be configured. Types are considered in the
/// order acme, ca, selfSigned, vault; every type after the first is rejected
/// without being looked at.
pub fn validate_issuer_spec(spec: &IssuerSpec, path: &Path) -> ErrorList {
    let mut errs = ErrorList::new();
    let mut configured = false;
    let mut claim = |name: &str, errs: &mut ErrorList| {
        if configured {
            errs.push(FieldError::forbidden(
                &path.child(name),
                "may not specify more than one issuer type",
            ));
            return false;
        }
        configured = true;
        true
    };

    if let Some(acme) = &spec.acme {
        if claim("acme", &mut errs) {
            errs.extend(validate_acme_issuer_config(acme, &path.child("acme")));
        }
    }
    if let Some(ca) = &spec.ca {
        if claim("ca", &mut errs) {
            errs.extend(validate_ca_issuer_config(ca, &path.child("ca")));
        }
    }
    if spec.self_signed.is_some() {
        claim("selfSigned", &mut errs);
    }
    if let Some(vault) = &spec.vault {
        if claim("vault", &mut errs) {
            errs.extend(validate_vault_issuer_config(vault, &path.child("vault")));
        }
    }

    if !configured {
        errs.push(FieldError::required(path, "at least one issuer must be configured"));
    }
    errs
}

pub fn validate_ca_issuer_config(ca: &CaIssuer, path: &Path) -> ErrorList {
    let mut errs = ErrorList::new();
    if ca.secret_name.is_empty() {
        errs.push(FieldError::required(&path.child("secretName"), ""));
    }
    errs
}

/// Validates a Vault issuer found at `path`.
///
/// A CA bundle, when given, must hold at least one PEM encoded certificate.
pub fn validate_vault_issuer_config(vault: &VaultIssuer, path: &Path) -> ErrorList {
    let mut errs = ErrorList::new();
    if vault.server.is_empty() {
        errs.push(FieldError::required(&path.child("server"), ""));
    }
    if vault.path.is_empty() {
        errs.push(FieldError::required(&path.child("path"), ""));
    }
    if !vault.ca_bundle.is_empty() && !contains_certificate(&vault.ca_bundle) {
        errs.push(FieldError::invalid(
            &path.child("caBundle"),
            "",
            "Specified CA bundle is invalid",
        ));
    }
    errs
}

fn contains_certificate(bundle: &[u8]) -> bool {
    pem::parse_many(bundle)
        .map(|blocks| {
            blocks
                .iter()
                .filter(|block| block.tag() == "CERTIFICATE")
                .any(|block| Certificate::from_der(block.contents()).is_ok())
        })
        .unwrap_or(false)
}

/// Validates an ACME issuer found at `path`, including each of its solvers.
pub fn validate_acme_issuer_config(acme: &AcmeIssuer, path: &Path) -> ErrorList {
    let mut errs = ErrorList::new();

    if acme.private_key.name.is_empty() {
        errs.push(FieldError::required(
            &path.child("privateKeySecretRef").child("name"),
            "private key secret name is a required field",
        ));
    }
    if acme.server.is_empty() {
        errs.push(FieldError::required(
            &path.child("server"),
            "acme server URL is a required field",
        ));
    }

    if let Some(eab) = &acme.external_account_binding {
        let eab_path = path.child("externalAccountBinding");
        if eab.key_id.is_empty() {
            errs.push(FieldError::required(
                &eab_path.child("keyID"),
                "the keyID field is required when using externalAccountBinding",
            ));
        }
        errs.extend(validate_secret_key_selector(&eab.key, &eab_path.child("keySecretRef")));
        if eab.key_algorithm.is_empty() {
            errs.push(FieldError::required(
                &eab_path.child("keyAlgorithm"),
                "the keyAlgorithm field is required when using externalAccountBinding",
            ));
        }
    }

    let solvers = path.child("solvers");
    for (i, solver) in acme.solvers.iter().enumerate() {
        errs.extend(validate_acme_challenge_solver(solver, &solvers.index(i)));
    }
    errs
}

/// Validates one solver. Exactly one of http01 and dns01 must be set.
pub fn validate_acme_challenge_solver(solver: &AcmeChallengeSolver, path: &Path) -> ErrorList {
    let mut errs = ErrorList::new();

    if let Some(http01) = &solver.http01 {
        errs.extend(validate_http01_solver(http01, &path.child("http01")));
    }
    if let Some(dns01) = &solver.dns01 {
        if solver.http01.is_some() {
            errs.push(FieldError::forbidden(
                &path.child("dns01"),
                "may not specify more than one solver type in a single solver",
            ));
        } else {
            errs.extend(validate_dns01_solver(dns01, &path.child("dns01")));
        }
    }
    if solver.http01.is_none() && solver.dns01.is_none() {
        errs.push(FieldError::required(path, "no solver type configured"));
    }
    errs
}

pub fn validate_http01_solver(http01: &Http01Solver, path: &Path) -> ErrorList {
    match &http01.ingress {
        Some(ingress) => validate_http01_ingress(ingress, &path.child("ingress")),
        None => vec![FieldError::required(path, "no HTTP01 solver type configured")],
    }
}

fn validate_http01_ingress(ingress: &Http01Ingress, path: &Path) -> ErrorList {
    let mut errs = ErrorList::new();

    if !ingress.name.is_empty() && ingress.class.is_some() {
        errs.push(FieldError::forbidden(path, "only one of 'name' or 'class' should be specified"));
    }

    match ingress.service_type.as_str() {
        "" | "ClusterIP" | "NodePort" => {}
        other => errs.push(FieldError::invalid(
            &path.child("serviceType"),
            other,
            r#"must be empty, "ClusterIP" or "NodePort""#,
        )),
    }

    if let Some(template) = &ingress.pod_template {
        errs.extend(validate_pod_template(template, &path.child("podTemplate")));
    }
    errs
}

/// Only labels and annotations of the solver pod metadata may be overridden.
fn validate_pod_template(template: &PodTemplate, path: &Path) -> ErrorList {
    let meta = &template.metadata;
    if meta.name.is_empty() && meta.namespace.is_empty() && meta.generate_name.is_empty() {
        return ErrorList::new();
    }
    vec![FieldError::invalid(
        &path.child("metadata"),
        "",
        "only labels and annotations may be set on podTemplate metadata",
    )]
}

/// Validates a DNS01 solver found at `path`.
///
/// Exactly one provider may be configured. Providers are considered in a
/// fixed order and every provider after the first is rejected without being
/// looked at.
pub fn validate_dns01_solver(dns01: &Dns01Solver, path: &Path) -> ErrorList {
    let mut errs = ErrorList::new();

    match dns01.cname_strategy.as_str() {
        "" | "None" | "Follow" => {}
        other => errs.push(FieldError::invalid(
            &path.child("cnameStrategy"),
            other,
            r#"must be one of "None" or "Follow""#,
        )),
    }

    let mut configured = false;
    let mut claim = |name: &str, errs: &mut ErrorList| {
        if configured {
            errs.push(FieldError::forbidden(
                &path.child(name),
                "may not specify more than one provider type",
            ));
            return false;
        }
        configured = true;
        true
    };

    if let Some(akamai) = &dns01.akamai {
        if claim("akamai", &mut errs) {
            let p = path.child("akamai");
            for (selector, name) in [
                (&akamai.access_token, "accessToken"),
                (&akamai.client_secret, "clientSecret"),
                (&akamai.client_token, "clientToken"),
            ] {
                errs.extend(validate_secret_key_selector(selector, &p.child(name)));
            }
            require(
                &mut errs,
                &akamai.service_consumer_domain,
                &p.child("serviceConsumerDomain"),
            );
        }
    }
    if let Some(azure) = &dns01.azure_dns {
        if claim("azuredns", &mut errs) {
            let p = path.child("azuredns");
            errs.extend(validate_secret_key_selector(
                &azure.client_secret,
                &p.child("clientSecretSecretRef"),
            ));
            require(&mut errs, &azure.client_id, &p.child("clientID"));
            require(&mut errs, &azure.subscription_id, &p.child("subscriptionID"));
            require(&mut errs, &azure.tenant_id, &p.child("tenantID"));
            require(&mut errs, &azure.resource_group_name, &p.child("resourceGroupName"));
            let env = azure.environment.as_str();
            if !env.is_empty() && !AZURE_ENVIRONMENTS.contains(&env) {
                errs.push(FieldError::invalid(
                    &p.child("environment"),
                    env,
                    AZURE_ENVIRONMENT_DETAIL,
                ));
            }
        }
    }
    if let Some(cloud_dns) = &dns01.cloud_dns {
        if claim("clouddns", &mut errs) {
            let p = path.child("clouddns");
            // Without a service account the ambient credentials are used.
            if let Some(account) = &cloud_dns.service_account {
                errs.extend(validate_secret_key_selector(
                    account,
                    &p.child("serviceAccountSecretRef"),
                ));
            }
            require(&mut errs, &cloud_dns.project, &p.child("project"));
        }
    }
    if let Some(cloudflare) = &dns01.cloudflare {
        if claim("cloudflare", &mut errs) {
            let p = path.child("cloudflare");
            errs.extend(validate_secret_key_selector(
                &cloudflare.api_key,
                &p.child("apiKeySecretRef"),
            ));
            require(&mut errs, &cloudflare.email, &p.child("email"));
        }
    }
    if let Some(route53) = &dns01.route53 {
        if claim("route53", &mut errs) {
            require(&mut errs, &route53.region, &path.child("route53").child("region"));
        }
    }
    if let Some(acme_dns) = &dns01.acme_dns {
        if claim("acmedns", &mut errs) {
            let p = path.child("acmedns");
            errs.extend(validate_secret_key_selector(
                &acme_dns.account_secret,
                &p.child("accountSecretRef"),
            ));
            require(&mut errs, &acme_dns.host, &p.child("host"));
        }
    }
    if let Some(digital_ocean) = &dns01.digital_ocean {
        if claim("digitalocean", &mut errs) {
            errs.extend(validate_secret_key_selector(
                &digital_ocean.token,
                &path.child("digitalocean").child("tokenSecretRef"),
            ));
        }
    }
    if let Some(rfc2136) = &dns01.rfc2136 {
        if claim("rfc2136", &mut errs) {
            errs.extend(validate_rfc2136(rfc2136, &path.child("rfc2136")));
        }
    }
    if let Some(webhook) = &dns01.webhook {
        if claim("webhook", &mut errs) {
            let p = path.child("webhook");
            require(&mut errs, &webhook.group_name, &p.child("groupName"));
            require(&mut errs, &webhook.solver_name, &p.child("solverName"));
        }
    }

    if !configured {
        errs.push(FieldError::required(path, "no DNS01 provider configured"));
    }
    errs
}

fn validate_rfc2136(rfc2136: &Rfc2136Provider, path: &Path) -> ErrorList {
    let mut errs = ErrorList::new();

    let nameserver = path.child("nameserver");
    if rfc2136.nameserver.is_empty() {
        errs.push(FieldError::required(&nameserver, ""));
    } else if parse_nameserver(&rfc2136.nameserver).is_none() {
        errs.push(FieldError::invalid(
            &nameserver,
            "",
            "Nameserver invalid. Check the documentation for details.",
        ));
    }

    let algorithm = &rfc2136.tsig_algorithm;
    if !algorithm.is_empty()
        && !SUPPORTED_TSIG_ALGORITHMS
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(algorithm))
    {
        errs.push(FieldError::not_supported(
            &path.child("tsigAlgorithm"),
            "",
            &SUPPORTED_TSIG_ALGORITHMS,
        ));
    }

    let secret = &rfc2136.tsig_secret;
    if !rfc2136.tsig_key_name.is_empty() {
        errs.extend(validate_secret_key_selector(secret, &path.child("tsigSecretSecretRef")));
    } else if !secret.name.is_empty() && !secret.key.is_empty() {
        errs.push(FieldError::required(&path.child("tsigKeyName"), ""));
    }
    errs
}

/// Parses `ip` or `ip:port` (`[ipv6]:port` for IPv6) into a socket address,
/// defaulting to port 53.
pub fn parse_nameserver(nameserver: &str) -> Option<SocketAddr> {
    if let Ok(ip) = nameserver.parse::<IpAddr>() {
        return Some(SocketAddr::new(ip, DEFAULT_DNS_PORT));
    }
    nameserver.parse::<SocketAddr>().ok()
}

fn require(errs: &mut ErrorList, value: &str, path: &Path) {
    if value.is_empty() {
        errs.push(FieldError::required(path, ""));
    }
}
