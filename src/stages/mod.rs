// src/stages/mod.rs
mod certs;
mod init;
mod join;
mod pre;
mod proxy;
mod reconfigure;

use crate::config::{ClusterContext, NodeRole, ProviderPaths};
use crate::error::Result;
use crate::storage::Storage;
use crate::utils::logging::Logger;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub use proxy::{default_no_proxy, is_proxy_configured, no_proxy_config};

pub const PROVIDER_NAME: &str = "Canonical K8s Cluster Provider";
pub const BOOT_BEFORE: &str = "boot.before";

/// One step of the declarative provisioning plan executed by the stage
/// runner on boot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub name: String,
    #[serde(rename = "if", default, skip_serializing_if = "String::is_empty")]
    pub condition: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<StageFile>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub environment_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageFile {
    pub path: String,
    pub permissions: u32,
    pub content: String,
}

impl StageFile {
    pub fn new(path: &Path, permissions: u32, content: impl Into<String>) -> Self {
        Self {
            path: path.display().to_string(),
            permissions,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub stages: BTreeMap<String, Vec<Stage>>,
}

impl ProviderConfig {
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| crate::error::NodeConfigError::Config(e.to_string()))
    }
}

pub(crate) fn file_stage(name: &str, path: &Path, content: impl Into<String>, permissions: u32) -> Stage {
    Stage {
        name: name.to_string(),
        files: vec![StageFile::new(path, permissions, content)],
        ..Stage::default()
    }
}

pub(crate) fn restart_stage<I, S>(name: &str, services: I) -> Stage
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut commands = vec!["systemctl daemon-reload".to_string()];
    commands.extend(
        services
            .into_iter()
            .map(|service| format!("systemctl restart {}", service.as_ref())),
    );
    Stage {
        name: name.to_string(),
        commands,
        ..Stage::default()
    }
}

/// Turns a cluster context into the stages for its node role, calling the
/// certificate and argument engines along the way.
pub struct StageBuilder<'a> {
    storage: &'a dyn Storage,
    logger: &'a mut dyn Logger,
    paths: ProviderPaths,
}

impl<'a> StageBuilder<'a> {
    pub fn new(storage: &'a dyn Storage, logger: &'a mut dyn Logger) -> Self {
        Self {
            storage,
            logger,
            paths: ProviderPaths::default(),
        }
    }

    pub fn with_paths(mut self, paths: ProviderPaths) -> Self {
        self.paths = paths;
        self
    }

    pub fn provider_config(&mut self, ctx: &ClusterContext) -> Result<ProviderConfig> {
        let stages = self.final_stages(ctx)?;
        Ok(ProviderConfig {
            name: PROVIDER_NAME.to_string(),
            stages: BTreeMap::from([(BOOT_BEFORE.to_string(), stages)]),
        })
    }

    pub fn final_stages(&mut self, ctx: &ClusterContext) -> Result<Vec<Stage>> {
        let options = ctx.node_options()?;
        let mut ctx = ctx.clone();
        ctx.prepare(&options, self.paths.images_dir());

        self.logger.log(&format!(
            "Building stages for {} node",
            ctx.node_role.as_str()
        ));

        let mut stages = self.pre_setup_stages(&ctx);
        match ctx.node_role {
            NodeRole::Init => stages.extend(self.init_stages(&ctx, options)?),
            NodeRole::ControlPlane => stages.extend(self.control_plane_join_stages(&ctx, options)?),
            NodeRole::Worker => stages.extend(self.worker_join_stages(&ctx, options)?),
        }

        self.logger
            .debug_log(&format!("Generated {} stage(s)", stages.len()));
        Ok(stages)
    }
}
