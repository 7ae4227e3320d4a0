// src/cert/parser.rs
use super::types::{ParsedCertificate, SanSet};
use crate::error::{NodeConfigError, Result};
use crate::storage::Storage;
use chrono::{DateTime, TimeZone, Utc};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::X509Certificate;

const CERTIFICATE_LABEL: &str = "CERTIFICATE";

pub fn parse_certificate_pem(pem_bytes: &[u8]) -> Result<ParsedCertificate> {
    let (_rest, pem) = parse_x509_pem(pem_bytes)
        .map_err(|e| NodeConfigError::Decode(format!("no PEM block found: {}", e)))?;

    if pem.label != CERTIFICATE_LABEL {
        return Err(NodeConfigError::Decode(format!(
            "unexpected PEM block type {:?}",
            pem.label
        )));
    }

    let cert = pem
        .parse_x509()
        .map_err(|e| NodeConfigError::Parse(e.to_string()))?;

    Ok(ParsedCertificate {
        common_name: common_name(&cert),
        sans: extract_sans(&cert)?,
        not_before: to_utc(cert.validity().not_before.timestamp())?,
        not_after: to_utc(cert.validity().not_after.timestamp())?,
        is_ca: is_ca(&cert),
        serial: hex::encode(cert.raw_serial()),
    })
}

/// Reads the certificate at `path` and returns its DNS and IP SANs.
pub fn read_existing_sans(storage: &dyn Storage, path: &Path) -> Result<SanSet> {
    let content = storage
        .read_to_string(path)
        .map_err(|source| NodeConfigError::Storage {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(parse_certificate_pem(content.as_bytes())?.sans)
}

fn extract_sans(cert: &X509Certificate<'_>) -> Result<SanSet> {
    let mut sans = SanSet::new();

    let extension = cert
        .subject_alternative_name()
        .map_err(|e| NodeConfigError::Parse(format!("invalid subjectAltName: {}", e)))?;

    if let Some(extension) = extension {
        for name in &extension.value.general_names {
            match name {
                GeneralName::DNSName(dns) => {
                    sans.insert_dns(*dns);
                }
                GeneralName::IPAddress(bytes) => {
                    let ip = ip_from_bytes(bytes).ok_or_else(|| {
                        NodeConfigError::Parse(format!(
                            "invalid IP address SAN of {} bytes",
                            bytes.len()
                        ))
                    })?;
                    sans.insert_ip(ip);
                }
                _ => {}
            }
        }
    }

    Ok(sans)
}

fn ip_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => {
            let octets: [u8; 4] = bytes.try_into().ok()?;
            Some(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        16 => {
            let octets: [u8; 16] = bytes.try_into().ok()?;
            Some(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        _ => None,
    }
}

fn common_name(cert: &X509Certificate<'_>) -> String {
    cert.subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .unwrap_or("")
        .to_string()
}

fn is_ca(cert: &X509Certificate<'_>) -> bool {
    cert.extensions()
        .iter()
        .find_map(|ext| match ext.parsed_extension() {
            ParsedExtension::BasicConstraints(bc) => Some(bc.ca),
            _ => None,
        })
        .unwrap_or(false)
}

fn to_utc(timestamp: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .ok_or_else(|| NodeConfigError::Parse(format!("invalid timestamp {}", timestamp)))
}
