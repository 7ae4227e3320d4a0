// src/args/mod.rs
pub mod merger;
pub mod parser;

use std::collections::BTreeMap;

pub use merger::{merge_arguments, ArgumentMerger};
pub use parser::{parse_arguments, serialize_arguments};

/// Flag name (with its leading `--`) to value.
pub type ArgumentSet = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KubeComponent {
    ApiServer,
    ControllerManager,
    Scheduler,
    Proxy,
    Kubelet,
}

impl KubeComponent {
    pub const CONTROL_PLANE: [KubeComponent; 5] = [
        KubeComponent::ApiServer,
        KubeComponent::ControllerManager,
        KubeComponent::Scheduler,
        KubeComponent::Proxy,
        KubeComponent::Kubelet,
    ];

    pub const WORKER: [KubeComponent; 2] = [KubeComponent::Proxy, KubeComponent::Kubelet];

    /// File name under the args directory.
    pub fn name(self) -> &'static str {
        match self {
            KubeComponent::ApiServer => "kube-apiserver",
            KubeComponent::ControllerManager => "kube-controller-manager",
            KubeComponent::Scheduler => "kube-scheduler",
            KubeComponent::Proxy => "kube-proxy",
            KubeComponent::Kubelet => "kubelet",
        }
    }

    pub fn service_name(self) -> String {
        format!("snap.k8s.{}.service", self.name())
    }
}
