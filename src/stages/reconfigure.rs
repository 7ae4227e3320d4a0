use super::{restart_stage, Stage, StageBuilder, StageFile};
use crate::args::{ArgumentMerger, KubeComponent};
use crate::config::NodeOptions;
use crate::error::Result;

const ARGS_FILE_PERMISSIONS: u32 = 0o600;

impl StageBuilder<'_> {
    /// Rewrites the args file of every listed component with the user
    /// overrides merged in, then restarts those services.
    pub(crate) fn reconfigure_stages(
        &mut self,
        options: &NodeOptions,
        components: &[KubeComponent],
    ) -> Result<Vec<Stage>> {
        let mut merger = ArgumentMerger::new(self.storage, &mut *self.logger, &self.paths.args_dir);

        let mut files = Vec::with_capacity(components.len());
        for component in components {
            let content = merger.merge_component_args(*component, &options.overrides_for(*component))?;
            files.push(StageFile::new(
                &merger.args_path(*component),
                ARGS_FILE_PERMISSIONS,
                content,
            ));
        }

        Ok(vec![
            Stage {
                name: "Regenerate Kube Components Args Files".to_string(),
                files,
                ..Stage::default()
            },
            restart_stage(
                "Restart Kube Components Services",
                components.iter().map(|c| c.service_name()),
            ),
        ])
    }
}
