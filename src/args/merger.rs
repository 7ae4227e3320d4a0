use super::parser::{parse_arguments, serialize_arguments};
use super::{ArgumentSet, KubeComponent};
use crate::error::{NodeConfigError, Result};
use crate::storage::Storage;
use crate::utils::logging::Logger;
use std::path::{Path, PathBuf};

/// Overlays `overrides` onto the arguments in `existing_content`, replacing
/// matching keys and inserting new ones. Keys not named in `overrides` are
/// kept as they are.
pub fn merge_arguments(existing_content: &str, overrides: &ArgumentSet) -> String {
    let mut args = parse_arguments(existing_content);
    args.extend(
        overrides
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    serialize_arguments(&args)
}

pub struct ArgumentMerger<'a> {
    storage: &'a dyn Storage,
    logger: &'a mut dyn Logger,
    args_dir: PathBuf,
}

impl<'a> ArgumentMerger<'a> {
    pub fn new(
        storage: &'a dyn Storage,
        logger: &'a mut dyn Logger,
        args_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            storage,
            logger,
            args_dir: args_dir.into(),
        }
    }

    pub fn args_path(&self, component: KubeComponent) -> PathBuf {
        self.args_dir.join(component.name())
    }

    /// Reads the component's current args file and merges `overrides` into
    /// it. A read failure is returned, never treated as an empty file.
    pub fn merge_component_args(
        &mut self,
        component: KubeComponent,
        overrides: &ArgumentSet,
    ) -> Result<String> {
        let path = self.args_path(component);
        let existing = self.read_args_file(&path)?;

        self.logger.debug_log(&format!(
            "Merging {} override(s) into {}",
            overrides.len(),
            path.display()
        ));

        Ok(merge_arguments(&existing, overrides))
    }

    fn read_args_file(&mut self, path: &Path) -> Result<String> {
        self.storage.read_to_string(path).map_err(|source| {
            self.logger
                .log(&format!("Failed to read args file {}: {}", path.display(), source));
            NodeConfigError::ArgFileRead {
                path: path.to_path_buf(),
                source,
            }
        })
    }
}
