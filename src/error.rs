// src/error.rs
use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeConfigError {
    #[error("failed to decode certificate: {0}")]
    Decode(String),

    #[error("failed to parse certificate: {0}")]
    Parse(String),

    #[error("certificate authority error: {0}")]
    Ca(String),

    #[error("failed to generate serial number: {0}")]
    Entropy(String),

    #[error("failed to generate RSA private key: {0}")]
    KeyGeneration(String),

    #[error("failed to sign certificate: {0}")]
    Signing(String),

    #[error("certificate public key does not match generated private key")]
    KeyMismatch,

    #[error("failed to read args file {}: {source}", path.display())]
    ArgFileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to run {}: {source}", path.display())]
    Command {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl From<NodeConfigError> for io::Error {
    fn from(error: NodeConfigError) -> Self {
        let kind = match &error {
            NodeConfigError::ArgFileRead { source, .. }
            | NodeConfigError::Storage { source, .. }
            | NodeConfigError::Command { source, .. } => source.kind(),
            NodeConfigError::Config(_) => io::ErrorKind::InvalidInput,
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NodeConfigError>;
