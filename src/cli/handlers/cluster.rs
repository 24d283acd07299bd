//! Cluster command handler
//!
//! Queries the cluster directly through the Slurm command-line tools
//! and prints partition and resource availability. Does not require a
//! running pool.

use crate::backend::ClusterInfo;
use crate::config::settings::Settings;
use crate::error::{AppError, AppResult};

/// Handler for the cluster command
pub struct ClusterCommandHandler {
    settings: Settings,
}

impl ClusterCommandHandler {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Print availability for one partition or the whole cluster
    pub async fn execute(&self, partition: Option<&str>) -> AppResult<()> {
        let mut info = ClusterInfo::new(self.settings.slurm.clone());
        info.update().await?;

        match partition {
            Some(name) => {
                let part = info.partition(name).ok_or_else(|| AppError::NotFound {
                    entity: "partition".to_string(),
                    field: "name".to_string(),
                    value: name.to_string(),
                })?;
                print_partition(name, part);
            }
            None => {
                for (name, part) in info.partitions() {
                    print_partition(name, part);
                }
                let summary = info.resource_summary();
                println!(
                    "total: {} partition(s), {}/{} nodes available, {} cpus, {}/{} gpus free",
                    summary.partitions,
                    summary.available_nodes,
                    summary.total_nodes,
                    summary.total_cpus,
                    summary.available_gpus,
                    summary.total_gpus,
                );
            }
        }

        Ok(())
    }
}

fn print_partition(name: &str, part: &crate::backend::cluster::PartitionInfo) {
    println!(
        "{:<16} nodes {}/{}  cpus {}  gpus {}/{}  mem {}M",
        name,
        part.available_nodes,
        part.total_nodes,
        part.total_cpus,
        part.available_gpus,
        part.total_gpus,
        part.memory_mb,
    );
}
