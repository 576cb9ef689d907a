//! Layered configuration: built-in defaults, a TOML file, `--set KEY=VALUE`
//! overrides and finally explicit command-line flags.

pub mod builder;
pub mod defaults;
pub mod file;
pub mod models;

pub use builder::{build_contact_map_config, build_pipeline_config, load_file_config};
