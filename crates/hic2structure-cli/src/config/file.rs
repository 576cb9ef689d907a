use crate::cli::DiagonalArg;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileExtractionConfig {
    pub chromosome: Option<String>,
    pub resolution: Option<i32>,
    pub count_threshold: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSimulationConfig {
    pub bond_coeff: Option<f64>,
    pub timesteps: Option<u64>,
    pub dump_interval: Option<u64>,
    pub thermo_interval: Option<u64>,
    pub timestep: Option<f64>,
    pub seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileLatticeConfig {
    pub spacing: Option<f64>,
    pub box_dimensions: Option<[f64; 3]>,
    pub backtrack_depth: Option<usize>,
    pub max_backtracks: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileContactMapConfig {
    pub distance_threshold: Option<f64>,
    pub diagonal: Option<DiagonalArg>,
    pub binary: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileEngineConfig {
    pub executable: Option<PathBuf>,
    pub forward_output: Option<bool>,
    pub keep_run_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    pub extraction: Option<FileExtractionConfig>,
    pub simulation: Option<FileSimulationConfig>,
    pub lattice: Option<FileLatticeConfig>,
    pub contact_map: Option<FileContactMapConfig>,
    pub engine: Option<FileEngineConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
