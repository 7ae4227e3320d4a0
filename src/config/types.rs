// config/types.rs
use crate::args::{ArgumentSet, KubeComponent};
use crate::error::{NodeConfigError, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_ADVERTISE_ADDRESS: &str = "''";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    #[serde(rename = "init")]
    Init,
    #[serde(rename = "controlplane", alias = "control-plane")]
    ControlPlane,
    #[serde(rename = "worker")]
    Worker,
}

impl NodeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeRole::Init => "init",
            NodeRole::ControlPlane => "controlplane",
            NodeRole::Worker => "worker",
        }
    }
}

/// Everything the provider knows about the node it is configuring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterContext {
    pub node_role: NodeRole,
    #[serde(default)]
    pub cluster_cidr: String,
    #[serde(default)]
    pub service_cidr: String,
    #[serde(default)]
    pub control_plane_host: String,
    #[serde(default)]
    pub cluster_token: String,
    /// Raw user options YAML, see [`NodeOptions`].
    #[serde(default)]
    pub user_options: String,
    #[serde(default)]
    pub local_images_path: String,
    #[serde(default)]
    pub custom_advertise_address: String,
    #[serde(default)]
    pub env_config: BTreeMap<String, String>,
}

impl ClusterContext {
    /// Loads a context from JSON, or YAML when the file ends in
    /// `.yaml`/`.yml`.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| NodeConfigError::Storage {
            path: path.to_path_buf(),
            source,
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| NodeConfigError::Config(e.to_string()))
        } else {
            serde_json::from_str(&content).map_err(|e| NodeConfigError::Config(e.to_string()))
        }
    }

    /// Fills in defaults and copies the subnets out of the user options.
    pub fn prepare(&mut self, options: &NodeOptions, default_images_dir: &Path) {
        if self.custom_advertise_address.is_empty() {
            self.custom_advertise_address = DEFAULT_ADVERTISE_ADDRESS.to_string();
        }
        if self.local_images_path.is_empty() {
            self.local_images_path = default_images_dir.display().to_string();
        }
        if let Some(service_cidr) = &options.service_cidr {
            self.service_cidr = service_cidr.clone();
        }
        if let Some(pod_cidr) = &options.pod_cidr {
            self.cluster_cidr = pod_cidr.clone();
        }
    }

    pub fn node_options(&self) -> Result<NodeOptions> {
        NodeOptions::from_yaml(&self.user_options)
    }

    pub fn local_images_dir(&self) -> PathBuf {
        PathBuf::from(&self.local_images_path)
    }
}

/// User supplied node configuration. Keys this crate does not interpret are
/// carried through untouched so the rendered config file is lossless.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeOptions {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_sans: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_cidr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_cidr: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_node_kube_apiserver_args: BTreeMap<String, Option<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_node_kube_controller_manager_args: BTreeMap<String, Option<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_node_kube_scheduler_args: BTreeMap<String, Option<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_node_kube_proxy_args: BTreeMap<String, Option<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_node_kubelet_args: BTreeMap<String, Option<String>>,
    #[serde(flatten)]
    pub rest: BTreeMap<String, Value>,
}

impl NodeOptions {
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| NodeConfigError::Config(e.to_string()))
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| NodeConfigError::Config(e.to_string()))
    }

    pub fn add_extra_san(&mut self, san: &str) {
        if !self.extra_sans.iter().any(|existing| existing == san) {
            self.extra_sans.push(san.to_string());
        }
    }

    /// Sets `cluster-config.dns.enabled`, creating the parents as needed.
    pub fn enable_dns(&mut self) {
        let cluster_config = self
            .rest
            .entry("cluster-config".to_string())
            .or_insert(Value::Null);
        if !cluster_config.is_mapping() {
            *cluster_config = Value::Mapping(Mapping::new());
        }

        if let Value::Mapping(cluster_config) = cluster_config {
            if !matches!(cluster_config.get("dns"), Some(Value::Mapping(_))) {
                cluster_config.insert(Value::from("dns"), Value::Mapping(Mapping::new()));
            }
            if let Some(Value::Mapping(dns)) = cluster_config.get_mut("dns") {
                dns.insert(Value::from("enabled"), Value::Bool(true));
            }
        }
    }

    pub fn component_args(&self, component: KubeComponent) -> &BTreeMap<String, Option<String>> {
        match component {
            KubeComponent::ApiServer => &self.extra_node_kube_apiserver_args,
            KubeComponent::ControllerManager => &self.extra_node_kube_controller_manager_args,
            KubeComponent::Scheduler => &self.extra_node_kube_scheduler_args,
            KubeComponent::Proxy => &self.extra_node_kube_proxy_args,
            KubeComponent::Kubelet => &self.extra_node_kubelet_args,
        }
    }

    pub fn component_args_mut(
        &mut self,
        component: KubeComponent,
    ) -> &mut BTreeMap<String, Option<String>> {
        match component {
            KubeComponent::ApiServer => &mut self.extra_node_kube_apiserver_args,
            KubeComponent::ControllerManager => &mut self.extra_node_kube_controller_manager_args,
            KubeComponent::Scheduler => &mut self.extra_node_kube_scheduler_args,
            KubeComponent::Proxy => &mut self.extra_node_kube_proxy_args,
            KubeComponent::Kubelet => &mut self.extra_node_kubelet_args,
        }
    }

    /// Overrides for one component. Entries with a null value leave the
    /// existing flag untouched and are dropped here.
    pub fn overrides_for(&self, component: KubeComponent) -> ArgumentSet {
        self.component_args(component)
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key.clone(), v.clone())))
            .collect()
    }
}
