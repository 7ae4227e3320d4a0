use crate::error::{NodeConfigError, Result};
use crate::storage::Storage;
use openssl::pkey::{PKey, Private};
use openssl::x509::X509;
use std::path::PathBuf;

/// Where the signing CA comes from. File sources are only read once a
/// regeneration is actually needed.
#[derive(Debug, Clone)]
pub enum CaSource {
    Pem { cert_pem: String, key_pem: String },
    Files { cert_path: PathBuf, key_path: PathBuf },
}

impl CaSource {
    pub fn load(&self, storage: &dyn Storage) -> Result<CertificateAuthority> {
        match self {
            CaSource::Pem { cert_pem, key_pem } => CertificateAuthority::from_pem(cert_pem, key_pem),
            CaSource::Files {
                cert_path,
                key_path,
            } => {
                let cert_pem = storage.read_to_string(cert_path).map_err(|e| {
                    NodeConfigError::Ca(format!(
                        "failed to read CA certificate {}: {}",
                        cert_path.display(),
                        e
                    ))
                })?;
                let key_pem = storage.read_to_string(key_path).map_err(|e| {
                    NodeConfigError::Ca(format!(
                        "failed to read CA key {}: {}",
                        key_path.display(),
                        e
                    ))
                })?;
                CertificateAuthority::from_pem(&cert_pem, &key_pem)
            }
        }
    }
}

pub struct CertificateAuthority {
    cert: X509,
    key: PKey<Private>,
}

impl CertificateAuthority {
    /// Loads a CA certificate and its RSA key. The key may be PKCS#1
    /// (`RSA PRIVATE KEY`) or PKCS#8 (`PRIVATE KEY`) and must pair with the
    /// certificate.
    pub fn from_pem(cert_pem: &str, key_pem: &str) -> Result<Self> {
        let cert = X509::from_pem(cert_pem.as_bytes())
            .map_err(|e| NodeConfigError::Ca(format!("failed to parse CA certificate: {}", e)))?;

        let key = PKey::private_key_from_pem(key_pem.as_bytes())
            .map_err(|e| NodeConfigError::Ca(format!("failed to parse CA private key: {}", e)))?;

        if key.rsa().is_err() {
            return Err(NodeConfigError::Ca("CA private key is not an RSA key".to_string()));
        }

        let cert_key = cert
            .public_key()
            .map_err(|e| NodeConfigError::Ca(format!("failed to read CA public key: {}", e)))?;
        if !cert_key.public_eq(&key) {
            return Err(NodeConfigError::Ca(
                "CA private key does not match CA certificate".to_string(),
            ));
        }

        Ok(Self { cert, key })
    }

    pub fn cert(&self) -> &X509 {
        &self.cert
    }

    pub fn key(&self) -> &PKey<Private> {
        &self.key
    }
}
