// src/reset.rs
use crate::config::{ClusterContext, ProviderPaths};
use crate::error::{NodeConfigError, Result};
use crate::utils::logging::Logger;
use std::process::Command;

/// Runs the node reset script for the context's role and logs whatever it
/// printed. A non-zero exit is logged, not returned; only a script that
/// cannot be started is an error.
pub fn reset_node(ctx: &ClusterContext, paths: &ProviderPaths, logger: &mut dyn Logger) -> Result<()> {
    let script = paths.script("reset.sh");
    logger.log(&format!(
        "Resetting {} node with {}",
        ctx.node_role.as_str(),
        script.display()
    ));

    let output = Command::new(&script)
        .arg(ctx.node_role.as_str())
        .output()
        .map_err(|source| {
            logger.log(&format!("Failed to start {}: {}", script.display(), source));
            NodeConfigError::Command {
                path: script.clone(),
                source,
            }
        })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    logger.log(&format!("reset node script output: {}", combined.trim_end()));

    if !output.status.success() {
        logger.log(&format!("Reset script exited with {}", output.status));
    }
    Ok(())
}
