//! Cluster topology inspection
//!
//! Queries `sinfo` and `scontrol` for partition and node resources so an
//! operator can see what the cluster offers before queueing work. Results
//! are cached briefly since topology changes far slower than job state.

use std::collections::BTreeMap;
use std::time::Duration;

use jiff::Timestamp;
use regex::Regex;
use serde::Serialize;
use tokio::process::Command;
use tracing::warn;

use crate::config::SlurmConfig;
use crate::error::{AppError, AppResult};

/// Seconds a fetched topology stays fresh
const CACHE_SECS: i64 = 60;

/// One node as reported by sinfo/scontrol
#[derive(Debug, Clone, Serialize)]
pub struct NodeInfo {
    pub name: String,
    pub state: String,
    pub cpus: u32,
    pub memory_mb: u64,
    pub gpus: u32,
}

/// Aggregate resources of one partition
#[derive(Debug, Clone, Default, Serialize)]
pub struct PartitionInfo {
    pub total_nodes: u32,
    pub available_nodes: u32,
    pub total_cpus: u32,
    pub total_gpus: u32,
    pub available_gpus: u32,
    /// Largest single-node memory in the partition
    pub memory_mb: u64,
    pub nodes: Vec<NodeInfo>,
}

/// Cluster-wide resource totals
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceSummary {
    pub total_nodes: u32,
    pub available_nodes: u32,
    pub total_cpus: u32,
    pub total_gpus: u32,
    pub available_gpus: u32,
    pub partitions: usize,
}

/// Cached view of the cluster's partitions and nodes
pub struct ClusterInfo {
    config: SlurmConfig,
    partitions: BTreeMap<String, PartitionInfo>,
    last_update: Option<Timestamp>,
}

impl ClusterInfo {
    pub fn new(config: SlurmConfig) -> Self {
        Self {
            config,
            partitions: BTreeMap::new(),
            last_update: None,
        }
    }

    /// Refresh the cached topology if it has gone stale
    pub async fn update(&mut self) -> AppResult<()> {
        if let Some(last) = self.last_update {
            if (Timestamp::now() - last).get_seconds() < CACHE_SECS {
                return Ok(());
            }
        }

        let sinfo_out = self
            .run(
                &self.config.sinfo.clone(),
                &["-o", "%P %a %l %D %T %N %C %m"],
            )
            .await?;
        let mut partitions = parse_sinfo_output(&sinfo_out);

        match self.run(&self.config.scontrol.clone(), &["show", "node"]).await {
            Ok(scontrol_out) => {
                let gpu_info = parse_node_gpus(&scontrol_out);
                apply_gpu_info(&mut partitions, &gpu_info);
            }
            Err(e) => warn!(error = %e, "Could not fetch GPU topology, counts stay zero"),
        }

        self.partitions = partitions;
        self.last_update = Some(Timestamp::now());
        Ok(())
    }

    async fn run(&self, program: &str, args: &[&str]) -> AppResult<String> {
        let timeout = Duration::from_secs(self.config.command_timeout_secs);
        let output = tokio::time::timeout(timeout, Command::new(program).args(args).output())
            .await
            .map_err(|_| AppError::BadRequest {
                message: format!("{} timed out", program),
            })?
            .map_err(|e| AppError::Internal { source: e.into() })?;

        if !output.status.success() {
            return Err(AppError::BadRequest {
                message: format!(
                    "{} failed: {}",
                    program,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub fn partition(&self, name: &str) -> Option<&PartitionInfo> {
        self.partitions.get(name)
    }

    pub fn partitions(&self) -> &BTreeMap<String, PartitionInfo> {
        &self.partitions
    }

    /// Cluster-wide totals over all partitions
    pub fn resource_summary(&self) -> ResourceSummary {
        let mut summary = ResourceSummary {
            partitions: self.partitions.len(),
            ..Default::default()
        };
        for p in self.partitions.values() {
            summary.total_nodes += p.total_nodes;
            summary.available_nodes += p.available_nodes;
            summary.total_cpus += p.total_cpus;
            summary.total_gpus += p.total_gpus;
            summary.available_gpus += p.available_gpus;
        }
        summary
    }

    /// Check whether a partition can in principle satisfy a request.
    /// Returns the reason when it cannot.
    pub fn check_availability(
        &self,
        partition: &str,
        cpus: u32,
        gpus: u32,
        memory: &str,
    ) -> Result<(), String> {
        let info = self
            .partitions
            .get(partition)
            .ok_or_else(|| format!("partition {} does not exist", partition))?;

        if info.available_nodes == 0 {
            return Err(format!("partition {} has no available nodes", partition));
        }

        let max_cpus = info.nodes.iter().map(|n| n.cpus).max().unwrap_or(0);
        if cpus > max_cpus {
            return Err(format!("no node has {} CPU cores", cpus));
        }

        if gpus > 0 {
            let max_gpus = info.nodes.iter().map(|n| n.gpus).max().unwrap_or(0);
            if gpus > max_gpus {
                return Err(format!("no node has {} GPUs", gpus));
            }
            if info.available_gpus < gpus {
                return Err(format!(
                    "not enough free GPUs (need {}, available {})",
                    gpus, info.available_gpus
                ));
            }
        }

        let memory_mb = parse_memory_mb(memory);
        if memory_mb > info.memory_mb {
            return Err(format!("no node has {} of memory", memory));
        }

        Ok(())
    }
}

/// Parse a memory string like "32G" into megabytes
pub fn parse_memory_mb(mem: &str) -> u64 {
    let re = Regex::new(r"^(\d+)([MGT])").unwrap();
    let Some(caps) = re.captures(mem) else {
        // sinfo reports plain numbers in MB
        return mem.trim().parse().unwrap_or(0);
    };
    let value: u64 = caps[1].parse().unwrap_or(0);
    match &caps[2] {
        "T" => value * 1024 * 1024,
        "G" => value * 1024,
        _ => value,
    }
}

/// Parse the total component of a `%C` "allocated/idle/other/total" CPU field
fn parse_cpu_total(cpus: &str) -> u32 {
    cpus.rsplit('/')
        .next()
        .and_then(|total| total.parse().ok())
        .unwrap_or(0)
}

/// Parse `sinfo -o "%P %a %l %D %T %N %C %m"` output into partitions.
/// sinfo groups nodes with the same partition and state onto one line,
/// so `%D` carries the node count and `%C` the CPU totals of the group.
fn parse_sinfo_output(output: &str) -> BTreeMap<String, PartitionInfo> {
    let mut partitions: BTreeMap<String, PartitionInfo> = BTreeMap::new();

    for line in output.lines().skip(1) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 8 {
            continue;
        }

        let name = parts[0].trim_end_matches('*').to_string();
        let node_count: u32 = parts[3].parse().unwrap_or(0);
        if node_count == 0 {
            continue;
        }
        let group_cpus = parse_cpu_total(parts[6]);
        let node = NodeInfo {
            name: parts[5].to_string(),
            state: parts[4].to_string(),
            cpus: group_cpus / node_count,
            memory_mb: parse_memory_mb(parts[7]),
            gpus: 0,
        };

        let entry = partitions.entry(name).or_default();
        entry.total_nodes += node_count;
        if !node.state.to_lowercase().contains("alloc") {
            entry.available_nodes += node_count;
        }
        entry.total_cpus += group_cpus;
        entry.memory_mb = entry.memory_mb.max(node.memory_mb);
        entry.nodes.push(node);
    }

    partitions
}

/// Parse `scontrol show node` output into a node -> GPU count map
fn parse_node_gpus(output: &str) -> BTreeMap<String, u32> {
    let gpu_re = Regex::new(r"gpu:(?:[^:,\s]+:)?(\d+)").unwrap();
    let mut nodes = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in output.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("NodeName=") {
            current = rest.split_whitespace().next().map(str::to_string);
        } else if let Some(name) = &current {
            if let Some(gres) = trimmed.strip_prefix("Gres=") {
                if let Some(caps) = gpu_re.captures(&gres.to_lowercase()) {
                    if let Ok(count) = caps[1].parse::<u32>() {
                        nodes.insert(name.clone(), count);
                    }
                }
            }
        }
    }

    nodes
}

fn apply_gpu_info(partitions: &mut BTreeMap<String, PartitionInfo>, gpus: &BTreeMap<String, u32>) {
    for partition in partitions.values_mut() {
        for node in &mut partition.nodes {
            if let Some(&count) = gpus.get(&node.name) {
                node.gpus = count;
                partition.total_gpus += count;
                if !node.state.to_lowercase().contains("alloc") {
                    partition.available_gpus += count;
                }
            }
        }
    }
}
