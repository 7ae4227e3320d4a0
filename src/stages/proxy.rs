use super::{restart_stage, Stage, StageBuilder, StageFile};
use crate::config::ClusterContext;
use std::collections::BTreeMap;
use std::path::Path;

pub const K8S_NO_PROXY: &str = ".svc,.svc.cluster,.svc.cluster.local,localhost,127.0.0.1";
const ENV_FILE_PATH: &str = "/run/provider-canonical/env";
const KUBELET_ENV_FILE: &str = "/etc/default/kubelet";

const K8S_SNAP_SERVICES: [&str; 10] = [
    "snap.k8s.containerd.service",
    "snap.k8s.k8s-apiserver-proxy.service",
    "snap.k8s.k8s-dqlite.service",
    "snap.k8s.k8sd.service",
    "snap.k8s.kube-apiserver.service",
    "snap.k8s.kube-controller-manager.service",
    "snap.k8s.kube-proxy.service",
    "snap.k8s.kube-scheduler.service",
    "snap.k8s.kubelet.service",
    "snap.k8s.etcd.service",
];

pub fn is_proxy_configured(env: &BTreeMap<String, String>) -> bool {
    ["HTTP_PROXY", "HTTPS_PROXY"]
        .iter()
        .any(|key| env.get(*key).is_some_and(|v| !v.is_empty()))
}

/// Pod and service CIDRs followed by the cluster-local names.
pub fn default_no_proxy(ctx: &ClusterContext) -> String {
    [ctx.cluster_cidr.as_str(), ctx.service_cidr.as_str(), K8S_NO_PROXY]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(",")
}

pub fn no_proxy_config(ctx: &ClusterContext) -> String {
    let defaults = default_no_proxy(ctx);
    match ctx.env_config.get("NO_PROXY") {
        Some(user) if !user.is_empty() => format!("{},{}", defaults, user),
        _ => defaults,
    }
}

fn proxy_environment(ctx: &ClusterContext) -> BTreeMap<String, String> {
    let env = &ctx.env_config;
    let http = env.get("HTTP_PROXY").cloned().unwrap_or_default();
    let https = env.get("HTTPS_PROXY").cloned().unwrap_or_default();
    let no_proxy = no_proxy_config(ctx);

    BTreeMap::from([
        ("HTTP_PROXY".to_string(), http.clone()),
        ("HTTPS_PROXY".to_string(), https.clone()),
        ("http_proxy".to_string(), http),
        ("https_proxy".to_string(), https),
        ("NO_PROXY".to_string(), no_proxy.clone()),
        ("no_proxy".to_string(), no_proxy),
    ])
}

fn kubelet_proxy_env(ctx: &ClusterContext) -> String {
    let mut lines = Vec::new();
    for key in ["HTTP_PROXY", "HTTPS_PROXY"] {
        if let Some(value) = ctx.env_config.get(key).filter(|v| !v.is_empty()) {
            lines.push(format!("{}={}", key, value));
        }
    }
    lines.push(format!("NO_PROXY={}", no_proxy_config(ctx)));
    lines.join("\n")
}

fn drop_in_files() -> Vec<StageFile> {
    let content = format!("[Service]\nEnvironmentFile=-{}", ENV_FILE_PATH);
    K8S_SNAP_SERVICES
        .iter()
        .map(|service| {
            let path = Path::new("/etc/systemd/system")
                .join(format!("{}.d", service))
                .join("http-proxy.conf");
            StageFile::new(&path, 0o644, content.clone())
        })
        .collect()
}

impl StageBuilder<'_> {
    pub(crate) fn proxy_stages(&mut self, ctx: &ClusterContext) -> Vec<Stage> {
        if !is_proxy_configured(&ctx.env_config) {
            return Vec::new();
        }
        self.logger.log("Proxy configured, adding proxy stages");

        let environment = proxy_environment(ctx);
        let mut files = vec![StageFile::new(
            Path::new(KUBELET_ENV_FILE),
            0o644,
            kubelet_proxy_env(ctx),
        )];
        files.extend(drop_in_files());

        vec![
            Stage {
                name: "Set provider environment".to_string(),
                environment: environment.clone(),
                environment_file: ENV_FILE_PATH.to_string(),
                ..Stage::default()
            },
            Stage {
                name: "Set proxy config files and envs".to_string(),
                environment,
                files,
                ..Stage::default()
            },
            restart_stage(
                "Reload systemd and restart k8s services after proxy config",
                K8S_SNAP_SERVICES,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::utils::logging::MemoryLogger;

    fn context(env: &[(&str, &str)]) -> ClusterContext {
        let mut ctx: ClusterContext =
            serde_json::from_value(serde_json::json!({ "nodeRole": "init" })).unwrap();
        ctx.cluster_cidr = "10.1.0.0/16".to_string();
        ctx.service_cidr = "10.152.183.0/24".to_string();
        ctx.env_config = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ctx
    }

    #[test]
    fn detects_proxy_configuration() {
        assert!(is_proxy_configured(&context(&[("HTTP_PROXY", "http://p:3128")]).env_config));
        assert!(is_proxy_configured(&context(&[("HTTPS_PROXY", "http://p:3128")]).env_config));
        assert!(!is_proxy_configured(&context(&[("HTTP_PROXY", "")]).env_config));
        assert!(!is_proxy_configured(&context(&[("NO_PROXY", "x")]).env_config));
    }

    #[test]
    fn no_proxy_includes_subnets_and_user_entries() {
        let ctx = context(&[("NO_PROXY", "internal.example.com")]);
        assert_eq!(
            no_proxy_config(&ctx),
            format!("10.1.0.0/16,10.152.183.0/24,{},internal.example.com", K8S_NO_PROXY)
        );
    }

    #[test]
    fn no_proxy_skips_missing_subnets() {
        let mut ctx = context(&[]);
        ctx.cluster_cidr.clear();
        assert_eq!(default_no_proxy(&ctx), format!("10.152.183.0/24,{}", K8S_NO_PROXY));
    }

    #[test]
    fn kubelet_env_lists_configured_proxies() {
        let ctx = context(&[("HTTPS_PROXY", "https://p:3129")]);
        assert_eq!(
            kubelet_proxy_env(&ctx),
            format!(
                "HTTPS_PROXY=https://p:3129\nNO_PROXY=10.1.0.0/16,10.152.183.0/24,{}",
                K8S_NO_PROXY
            )
        );
    }

    #[test]
    fn proxy_stages_write_drop_ins_and_restart_services() {
        let storage = MemoryStorage::new();
        let mut logger = MemoryLogger::new();
        let ctx = context(&[("HTTP_PROXY", "http://p:3128")]);
        let stages = StageBuilder::new(&storage, &mut logger).proxy_stages(&ctx);

        assert_eq!(stages.len(), 3);
        assert_eq!(stages[0].environment_file, ENV_FILE_PATH);
        assert_eq!(stages[0].environment["http_proxy"], "http://p:3128");

        let files = &stages[1].files;
        assert_eq!(files.len(), 1 + K8S_SNAP_SERVICES.len());
        assert_eq!(files[0].path, KUBELET_ENV_FILE);
        assert_eq!(
            files[1].path,
            "/etc/systemd/system/snap.k8s.containerd.service.d/http-proxy.conf"
        );
        assert_eq!(
            files[1].content,
            "[Service]\nEnvironmentFile=-/run/provider-canonical/env"
        );

        assert_eq!(stages[2].commands.len(), 1 + K8S_SNAP_SERVICES.len());
        assert!(logger.contains("Proxy configured"));
    }

    #[test]
    fn no_stages_without_proxy() {
        let storage = MemoryStorage::new();
        let mut logger = MemoryLogger::new();
        let stages = StageBuilder::new(&storage, &mut logger).proxy_stages(&context(&[]));
        assert!(stages.is_empty());
    }
}
