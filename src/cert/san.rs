// src/cert/san.rs
use super::types::SanSet;
use std::net::IpAddr;

/// Splits candidate SAN strings into IP and DNS entries. Anything that is
/// not an IP literal is kept as a DNS name without further validation;
/// empty strings are dropped.
pub fn classify_sans<S: AsRef<str>>(candidates: &[S]) -> SanSet {
    let mut sans = SanSet::new();

    for candidate in candidates {
        let candidate = candidate.as_ref();
        if candidate.is_empty() {
            continue;
        }

        match candidate.parse::<IpAddr>() {
            Ok(ip) => {
                sans.insert_ip(ip);
            }
            Err(_) => {
                sans.insert_dns(candidate);
            }
        }
    }

    sans
}

/// True when at least one desired entry is missing from `existing`.
/// Comparison is exact string equality.
pub fn contains_any_non_match<S, T>(desired: &[S], existing: &[T]) -> bool
where
    S: AsRef<str>,
    T: AsRef<str>,
{
    desired
        .iter()
        .any(|d| !existing.iter().any(|e| e.as_ref() == d.as_ref()))
}

/// Entries of `desired` absent from `existing`. DNS names compare as exact
/// strings, IPs by address, so `FE80::1` and `fe80::1` are the same SAN.
pub fn missing_sans(desired: &SanSet, existing: &SanSet) -> SanSet {
    let mut missing = SanSet::new();
    for name in desired.dns.iter().filter(|name| !existing.dns.contains(name)) {
        missing.insert_dns(name.clone());
    }
    for ip in desired.ips.iter().filter(|ip| !existing.ips.contains(ip)) {
        missing.insert_ip(*ip);
    }
    missing
}
