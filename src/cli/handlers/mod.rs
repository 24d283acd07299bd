//! Command handlers for CLI operations

pub mod cluster;
pub mod control;
pub mod run;

pub use cluster::ClusterCommandHandler;
pub use control::ControlCommandHandler;
pub use run::RunCommandHandler;
