// config/paths.rs
use std::path::{Path, PathBuf};

pub const KUBE_COMPONENTS_ARGS_PATH: &str = "/var/snap/k8s/common/args";
pub const KUBE_CERTIFICATE_DIR_PATH: &str = "/etc/kubernetes/pki";
pub const CANONICAL_DIR: &str = "/opt/canonical";
pub const CANONICAL_SCRIPT_DIR: &str = "/opt/canonical/scripts";
pub const DEFAULT_LOCAL_IMAGES_DIR: &str = "/opt/canonical/images";

/// Well-known locations on the node. Tests point these somewhere else.
#[derive(Debug, Clone)]
pub struct ProviderPaths {
    pub args_dir: PathBuf,
    pub pki_dir: PathBuf,
    pub canonical_dir: PathBuf,
    pub script_dir: PathBuf,
    pub images_dir: PathBuf,
}

impl Default for ProviderPaths {
    fn default() -> Self {
        Self {
            args_dir: PathBuf::from(KUBE_COMPONENTS_ARGS_PATH),
            pki_dir: PathBuf::from(KUBE_CERTIFICATE_DIR_PATH),
            canonical_dir: PathBuf::from(CANONICAL_DIR),
            script_dir: PathBuf::from(CANONICAL_SCRIPT_DIR),
            images_dir: PathBuf::from(DEFAULT_LOCAL_IMAGES_DIR),
        }
    }
}

impl ProviderPaths {
    pub fn apiserver_cert(&self) -> PathBuf {
        self.pki_dir.join("apiserver.crt")
    }

    pub fn apiserver_key(&self) -> PathBuf {
        self.pki_dir.join("apiserver.key")
    }

    pub fn ca_cert(&self) -> PathBuf {
        self.pki_dir.join("ca.crt")
    }

    pub fn ca_key(&self) -> PathBuf {
        self.pki_dir.join("ca.key")
    }

    pub fn bootstrap_config(&self) -> PathBuf {
        self.canonical_dir.join("bootstrap-config.yaml")
    }

    pub fn join_config(&self) -> PathBuf {
        self.canonical_dir.join("join-config.yaml")
    }

    pub fn bootstrap_marker(&self) -> PathBuf {
        self.canonical_dir.join("canonical.bootstrap")
    }

    pub fn join_marker(&self) -> PathBuf {
        self.canonical_dir.join("canonical.join")
    }

    pub fn script(&self, name: &str) -> PathBuf {
        self.script_dir.join(name)
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }
}
