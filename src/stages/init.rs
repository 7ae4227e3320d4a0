use super::{file_stage, Stage, StageBuilder};
use crate::args::KubeComponent;
use crate::config::{ClusterContext, NodeOptions};
use crate::error::Result;

pub(crate) const CONFIG_FILE_PERMISSIONS: u32 = 0o640;

/// Controller-manager defaults every control-plane node gets: node CIDR
/// allocation from the cluster pod CIDR.
pub(crate) fn apply_control_plane_defaults(options: &mut NodeOptions, ctx: &ClusterContext) {
    if !ctx.control_plane_host.is_empty() {
        options.add_extra_san(&ctx.control_plane_host);
    }

    let pod_cidr = options.pod_cidr.clone();
    let controller_args = options.component_args_mut(KubeComponent::ControllerManager);
    controller_args.insert("--allocate-node-cidrs".to_string(), Some("true".to_string()));
    controller_args.insert("--cluster-cidr".to_string(), pod_cidr);
}

impl StageBuilder<'_> {
    pub(crate) fn init_stages(
        &mut self,
        ctx: &ClusterContext,
        mut options: NodeOptions,
    ) -> Result<Vec<Stage>> {
        apply_control_plane_defaults(&mut options, ctx);
        options.enable_dns();

        let mut stages = vec![
            file_stage(
                "Generate Bootstrap Config",
                &self.paths.bootstrap_config(),
                options.to_yaml()?,
                CONFIG_FILE_PERMISSIONS,
            ),
            self.bootstrap_stage(&ctx.custom_advertise_address),
        ];

        if self.storage.is_dir(&self.paths.args_dir) {
            stages.extend(self.reconfigure_stages(&options, &KubeComponent::CONTROL_PLANE)?);
        }
        stages.extend(self.apiserver_cert_stages(&options.extra_sans)?);

        Ok(stages)
    }

    fn bootstrap_stage(&self, advertise_address: &str) -> Stage {
        Stage {
            name: "Run Canonical Bootstrap".to_string(),
            condition: format!("[ ! -f {} ]", self.paths.bootstrap_marker().display()),
            commands: vec![format!(
                "bash {} {}",
                self.paths.script("bootstrap.sh").display(),
                advertise_address
            )],
            ..Stage::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ArgumentSet;
    use crate::storage::MemoryStorage;
    use crate::utils::logging::MemoryLogger;

    fn context(user_options: &str) -> ClusterContext {
        let mut ctx: ClusterContext = serde_json::from_value(serde_json::json!({
            "nodeRole": "init",
            "controlPlaneHost": "cp.example.com",
            "userOptions": user_options,
        }))
        .unwrap();
        ctx.custom_advertise_address = "10.0.0.5".to_string();
        ctx
    }

    #[test]
    fn bootstrap_config_gets_cluster_defaults() {
        let storage = MemoryStorage::new();
        let mut logger = MemoryLogger::new();
        let ctx = context("pod-cidr: 10.1.0.0/16\nextra-sans: [10.0.0.5]\n");
        let options = ctx.node_options().unwrap();

        let stages = StageBuilder::new(&storage, &mut logger)
            .init_stages(&ctx, options)
            .unwrap();
        assert_eq!(stages.len(), 2);

        let file = &stages[0].files[0];
        assert_eq!(file.path, "/opt/canonical/bootstrap-config.yaml");
        assert_eq!(file.permissions, 0o640);

        let rendered = NodeOptions::from_yaml(&file.content).unwrap();
        assert_eq!(rendered.extra_sans, vec!["10.0.0.5", "cp.example.com"]);
        assert_eq!(
            rendered.overrides_for(KubeComponent::ControllerManager),
            ArgumentSet::from([
                ("--allocate-node-cidrs".to_string(), "true".to_string()),
                ("--cluster-cidr".to_string(), "10.1.0.0/16".to_string()),
            ])
        );
        assert_eq!(
            rendered.rest["cluster-config"]["dns"]["enabled"],
            serde_yaml::Value::Bool(true)
        );
    }

    #[test]
    fn bootstrap_runs_once_with_advertise_address() {
        let storage = MemoryStorage::new();
        let mut logger = MemoryLogger::new();
        let ctx = context("");

        let stages = StageBuilder::new(&storage, &mut logger)
            .init_stages(&ctx, NodeOptions::default())
            .unwrap();

        assert_eq!(stages[1].condition, "[ ! -f /opt/canonical/canonical.bootstrap ]");
        assert_eq!(
            stages[1].commands,
            vec!["bash /opt/canonical/scripts/bootstrap.sh 10.0.0.5"]
        );
    }

    #[test]
    fn control_plane_host_is_not_duplicated() {
        let mut options = NodeOptions::default();
        let ctx = context("");
        options.add_extra_san("cp.example.com");
        apply_control_plane_defaults(&mut options, &ctx);
        assert_eq!(options.extra_sans, vec!["cp.example.com"]);
    }
}
