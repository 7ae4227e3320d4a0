// src/cert/mod.rs
mod ca;
mod openssl;
pub mod parser;
pub mod reconciler;
pub mod san;
mod types;

pub use ca::{CaSource, CertificateAuthority};
pub use openssl::ensure_key_matches;
pub use parser::{parse_certificate_pem, read_existing_sans};
pub use reconciler::{reconcile_certificate, SanReconciler};
pub use san::{classify_sans, contains_any_non_match, missing_sans};
pub use types::{
    CertKeyPair, CertificateConfig, ParsedCertificate, ReconcileOutcome, SanSet,
    APISERVER_COMMON_NAME,
};
