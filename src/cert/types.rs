// cert/types.rs
use chrono::{DateTime, Utc};
use std::net::IpAddr;

pub const APISERVER_COMMON_NAME: &str = "kube-apiserver";
pub const LEAF_VALIDITY_YEARS: u32 = 20;
pub const LEAF_KEY_SIZE: u32 = 2048;

/// Subject Alternative Names split by kind. Both lists keep insertion
/// order and never hold duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanSet {
    pub dns: Vec<String>,
    pub ips: Vec<IpAddr>,
}

impl SanSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_dns(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.dns.contains(&name) {
            return false;
        }
        self.dns.push(name);
        true
    }

    pub fn insert_ip(&mut self, ip: IpAddr) -> bool {
        if self.ips.contains(&ip) {
            return false;
        }
        self.ips.push(ip);
        true
    }

    /// Adds every entry of `other` that is not already present.
    pub fn extend(&mut self, other: &SanSet) {
        for name in &other.dns {
            self.insert_dns(name.clone());
        }
        for ip in &other.ips {
            self.insert_ip(*ip);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dns.is_empty() && self.ips.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dns.len() + self.ips.len()
    }

    /// DNS names verbatim followed by IPs in canonical text form.
    pub fn to_strings(&self) -> Vec<String> {
        self.dns
            .iter()
            .cloned()
            .chain(self.ips.iter().map(IpAddr::to_string))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct ParsedCertificate {
    pub common_name: String,
    pub sans: SanSet,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub is_ca: bool,
    pub serial: String,
}

/// Policy applied to every regenerated leaf certificate.
#[derive(Debug, Clone)]
pub struct CertificateConfig {
    pub common_name: String,
    pub validity_years: u32,
    pub key_size: u32,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            common_name: APISERVER_COMMON_NAME.to_string(),
            validity_years: LEAF_VALIDITY_YEARS,
            key_size: LEAF_KEY_SIZE,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct CertKeyPair {
    pub cert_pem: String,
    pub key_pem: String,
}

impl std::fmt::Debug for CertKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CertKeyPair")
            .field("cert_pem", &self.cert_pem)
            .field("key_pem", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Unchanged,
    Regenerated(CertKeyPair),
}

impl ReconcileOutcome {
    pub fn regenerated(self) -> Option<CertKeyPair> {
        match self {
            ReconcileOutcome::Regenerated(pair) => Some(pair),
            ReconcileOutcome::Unchanged => None,
        }
    }
}
