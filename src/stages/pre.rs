use super::{Stage, StageBuilder};
use crate::config::ClusterContext;

impl StageBuilder<'_> {
    pub(crate) fn pre_setup_stages(&mut self, ctx: &ClusterContext) -> Vec<Stage> {
        let mut stages = self.proxy_stages(ctx);
        stages.push(self.pre_command_stage());

        let images_dir = ctx.local_images_dir();
        if self.storage.is_dir(&images_dir) {
            self.logger.debug_log(&format!(
                "Importing local images from {}",
                images_dir.display()
            ));
            stages.push(self.import_local_images_stage(&ctx.local_images_path));
        }
        stages
    }

    fn pre_command_stage(&self) -> Stage {
        Stage {
            name: "Run Pre Setup Commands".to_string(),
            commands: vec![format!(
                "/bin/bash {}",
                self.paths.script("pre-setup.sh").display()
            )],
            ..Stage::default()
        }
    }

    fn import_local_images_stage(&self, images_path: &str) -> Stage {
        Stage {
            name: "Run Import Local Images".to_string(),
            commands: vec![format!(
                "/bin/sh {} {}",
                self.paths.script("import-images.sh").display(),
                images_path
            )],
            ..Stage::default()
        }
    }
}
