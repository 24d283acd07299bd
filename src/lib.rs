//! Gridpool Library
//!
//! Core library modules for the gridpool job pool manager.

use shadow_rs::shadow;
shadow!(build);

pub mod api;
pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod logger;
pub mod pool;
pub mod runtime;
pub mod server;
pub mod state;

pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
