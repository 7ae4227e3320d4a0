// src/cert/reconciler.rs
use super::ca::CaSource;
use super::openssl::{ensure_key_matches, generate_private_key, sign_certificate};
use super::parser::read_existing_sans;
use super::san::{classify_sans, missing_sans};
use super::types::{CertKeyPair, CertificateConfig, ReconcileOutcome};
use crate::error::Result;
use crate::storage::Storage;
use crate::utils::logging::Logger;
use chrono::Utc;
use openssl::pkey::{PKey, Private};
use std::path::Path;

/// Keeps a leaf certificate's SANs a superset of the desired list.
///
/// Reconciliation only ever adds SANs: the replacement certificate carries
/// every SAN of the existing one plus the missing desired entries, under a
/// freshly generated key. A missing certificate is left for first issuance
/// elsewhere.
pub struct SanReconciler<'a> {
    storage: &'a dyn Storage,
    logger: &'a mut dyn Logger,
    config: CertificateConfig,
}

impl<'a> SanReconciler<'a> {
    pub fn new(storage: &'a dyn Storage, logger: &'a mut dyn Logger) -> Self {
        Self {
            storage,
            logger,
            config: CertificateConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CertificateConfig) -> Self {
        self.config = config;
        self
    }

    pub fn reconcile<S: AsRef<str>>(
        &mut self,
        cert_path: &Path,
        desired_sans: &[S],
        ca_source: &CaSource,
    ) -> Result<ReconcileOutcome> {
        let desired = classify_sans(desired_sans);
        if desired.is_empty() {
            self.logger.debug_log("No SANs requested, skipping certificate reconciliation");
            return Ok(ReconcileOutcome::Unchanged);
        }

        if !self.storage.is_file(cert_path) {
            self.logger.debug_log(&format!(
                "Certificate {} not found, skipping reconciliation",
                cert_path.display()
            ));
            return Ok(ReconcileOutcome::Unchanged);
        }

        let existing = read_existing_sans(self.storage, cert_path)?;
        let missing = missing_sans(&desired, &existing);
        if missing.is_empty() {
            self.logger.debug_log(&format!(
                "Certificate {} already carries all {} requested SANs",
                cert_path.display(),
                desired.len()
            ));
            return Ok(ReconcileOutcome::Unchanged);
        }

        let mut sans = existing.clone();
        sans.extend(&missing);
        self.logger.log(&format!(
            "Regenerating {} with {} SANs (previously {})",
            cert_path.display(),
            sans.len(),
            existing.len()
        ));

        let ca = ca_source.load(self.storage)?;
        let leaf_key = generate_private_key(self.config.key_size, self.logger)?;
        let pair = sign_certificate(&self.config, &sans, &leaf_key, &ca, Utc::now(), self.logger)?;

        self.accept_if_key_matches(cert_path, pair, &leaf_key)
    }

    fn accept_if_key_matches(
        &mut self,
        cert_path: &Path,
        pair: CertKeyPair,
        leaf_key: &PKey<Private>,
    ) -> Result<ReconcileOutcome> {
        if let Err(e) = ensure_key_matches(&pair.cert_pem, leaf_key) {
            self.logger
                .log(&format!("Discarding regenerated certificate: {}", e));
            return Err(e);
        }

        self.logger
            .log(&format!("Regenerated certificate for {}", cert_path.display()));
        Ok(ReconcileOutcome::Regenerated(pair))
    }
}

/// One-shot form of [`SanReconciler::reconcile`] for an in-memory CA.
pub fn reconcile_certificate<S: AsRef<str>>(
    storage: &dyn Storage,
    logger: &mut dyn Logger,
    existing_cert_path: &Path,
    desired_sans: &[S],
    ca_cert_pem: &str,
    ca_key_pem: &str,
) -> Result<ReconcileOutcome> {
    let ca_source = CaSource::Pem {
        cert_pem: ca_cert_pem.to_string(),
        key_pem: ca_key_pem.to_string(),
    };
    SanReconciler::new(storage, logger).reconcile(existing_cert_path, desired_sans, &ca_source)
}
