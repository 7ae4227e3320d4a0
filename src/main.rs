// src/main.rs
use clap::{Parser, Subcommand};
use k8s_node_reconcile::config::{ClusterContext, ProviderPaths};
use k8s_node_reconcile::reset::reset_node;
use k8s_node_reconcile::stages::StageBuilder;
use k8s_node_reconcile::storage::OsStorage;
use k8s_node_reconcile::utils::logging::{
    FileLogger, Logger, MultiLogger, StderrLogger, DEFAULT_LOG_FILE,
};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Render boot stages for a Canonical Kubernetes node")]
pub struct Args {
    /// Cluster context, JSON or YAML.
    #[arg(short, long, default_value = "cluster_config.json")]
    pub config: String,
    #[arg(short, long)]
    pub debug: bool,
    #[arg(short, long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: String,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the boot stages for this node (default)
    Stages,
    /// Run the reset script for the node's role
    Reset,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let log_file = shellexpand::tilde(&args.log_file).to_string();
    let mut logger = MultiLogger::new(vec![
        Box::new(FileLogger::new(&log_file, args.debug)?),
        Box::new(StderrLogger::new(args.debug)),
    ]);

    if let Err(e) = run(&args, &mut logger) {
        logger.log(&format!("Failed: {}", e));
        return Err(e);
    }
    Ok(())
}

fn run(args: &Args, logger: &mut dyn Logger) -> io::Result<()> {
    let config_path = PathBuf::from(shellexpand::tilde(&args.config).to_string());
    logger.debug_log(&format!("Loading cluster context from {}", config_path.display()));

    let ctx = ClusterContext::load_from_file(&config_path)?;

    match args.command.as_ref().unwrap_or(&Commands::Stages) {
        Commands::Stages => {
            let storage = OsStorage;
            let provider_config = StageBuilder::new(&storage, logger).provider_config(&ctx)?;
            print!("{}", provider_config.to_yaml()?);
        }
        Commands::Reset => reset_node(&ctx, &ProviderPaths::default(), logger)?,
    }
    Ok(())
}
