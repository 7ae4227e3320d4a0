use super::init::{apply_control_plane_defaults, CONFIG_FILE_PERMISSIONS};
use super::{file_stage, Stage, StageBuilder};
use crate::args::KubeComponent;
use crate::config::{ClusterContext, NodeOptions};
use crate::error::Result;

impl StageBuilder<'_> {
    pub(crate) fn control_plane_join_stages(
        &mut self,
        ctx: &ClusterContext,
        mut options: NodeOptions,
    ) -> Result<Vec<Stage>> {
        apply_control_plane_defaults(&mut options, ctx);

        let mut stages = vec![self.join_config_stage(&options)?, self.join_stage(ctx)];

        if self.storage.is_dir(&self.paths.args_dir) {
            stages.extend(self.reconfigure_stages(&options, &KubeComponent::CONTROL_PLANE)?);
        }
        stages.extend(self.apiserver_cert_stages(&options.extra_sans)?);

        Ok(stages)
    }

    pub(crate) fn worker_join_stages(
        &mut self,
        ctx: &ClusterContext,
        options: NodeOptions,
    ) -> Result<Vec<Stage>> {
        let mut stages = vec![self.join_config_stage(&options)?, self.join_stage(ctx)];

        if self.storage.is_dir(&self.paths.args_dir) {
            stages.extend(self.reconfigure_stages(&options, &KubeComponent::WORKER)?);
        }

        Ok(stages)
    }

    fn join_config_stage(&self, options: &NodeOptions) -> Result<Stage> {
        Ok(file_stage(
            "Generate Join Config",
            &self.paths.join_config(),
            options.to_yaml()?,
            CONFIG_FILE_PERMISSIONS,
        ))
    }

    fn join_stage(&self, ctx: &ClusterContext) -> Stage {
        Stage {
            name: "Run Canonical Join".to_string(),
            condition: format!("[ ! -f {} ]", self.paths.join_marker().display()),
            commands: vec![format!(
                "bash {} {} {} {}",
                self.paths.script("join.sh").display(),
                ctx.cluster_token,
                ctx.custom_advertise_address,
                ctx.node_role.as_str()
            )],
            ..Stage::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::utils::logging::MemoryLogger;

    fn context(role: &str) -> ClusterContext {
        serde_json::from_value(serde_json::json!({
            "nodeRole": role,
            "controlPlaneHost": "cp.example.com",
            "clusterToken": "token123",
            "customAdvertiseAddress": "10.0.0.7",
        }))
        .unwrap()
    }

    #[test]
    fn control_plane_join_adds_defaults() {
        let storage = MemoryStorage::new();
        let mut logger = MemoryLogger::new();
        let ctx = context("controlplane");
        let options = NodeOptions::from_yaml("pod-cidr: 10.1.0.0/16\n").unwrap();

        let stages = StageBuilder::new(&storage, &mut logger)
            .control_plane_join_stages(&ctx, options)
            .unwrap();
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0].files[0].path, "/opt/canonical/join-config.yaml");

        let rendered = NodeOptions::from_yaml(&stages[0].files[0].content).unwrap();
        assert_eq!(rendered.extra_sans, vec!["cp.example.com"]);
        assert_eq!(
            rendered.overrides_for(KubeComponent::ControllerManager)["--cluster-cidr"],
            "10.1.0.0/16"
        );
        assert!(!rendered.rest.contains_key("cluster-config"));

        assert_eq!(
            stages[1].commands,
            vec!["bash /opt/canonical/scripts/join.sh token123 10.0.0.7 controlplane"]
        );
        assert_eq!(stages[1].condition, "[ ! -f /opt/canonical/canonical.join ]");
    }

    #[test]
    fn worker_join_keeps_options_as_given() {
        let storage = MemoryStorage::new();
        let mut logger = MemoryLogger::new();
        let ctx = context("worker");
        let options =
            NodeOptions::from_yaml("extra-node-kubelet-args:\n  --max-pods: \"200\"\n").unwrap();

        let stages = StageBuilder::new(&storage, &mut logger)
            .worker_join_stages(&ctx, options.clone())
            .unwrap();

        let rendered = NodeOptions::from_yaml(&stages[0].files[0].content).unwrap();
        assert_eq!(rendered, options);
        assert!(stages[1].commands[0].ends_with("token123 10.0.0.7 worker"));
    }
}
