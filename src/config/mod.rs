mod paths;
mod types;

pub use paths::ProviderPaths;
pub use types::{ClusterContext, NodeOptions, NodeRole, DEFAULT_ADVERTISE_ADDRESS};
