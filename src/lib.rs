//! Node configuration for Canonical Kubernetes cluster nodes: renders the
//! boot stages for a node role, merges component arguments and keeps the
//! apiserver certificate's SANs up to date. Also runs the node reset
//! script.

pub mod args;
pub mod cert;
pub mod config;
pub mod error;
pub mod reset;
pub mod stages;
pub mod storage;
pub mod utils;

pub use error::{NodeConfigError, Result};
