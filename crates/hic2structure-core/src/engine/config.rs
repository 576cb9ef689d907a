pub use crate::core::io::deck::SimulationSettings;
pub use crate::core::io::output::DiagonalPolicy;
use crate::core::models::lattice::WalkParams;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    pub chromosome: String,
    /// Bin size in base pairs.
    pub resolution: i32,
    /// Records with a value at or below this are dropped.
    pub count_threshold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LatticeConfig {
    pub spacing: f64,
    pub box_dimensions: [f64; 3],
    pub walk: WalkParams,
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            spacing: 3.0,
            box_dimensions: [400.0; 3],
            walk: WalkParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactMapConfig {
    pub distance_threshold: f64,
    pub diagonal: DiagonalPolicy,
    /// Write pairs only, without distances or diagonal cells.
    pub binary: bool,
}

impl Default for ContactMapConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 3.3,
            diagonal: DiagonalPolicy::Zero,
            binary: false,
        }
    }
}

impl ContactMapConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.distance_threshold > 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "distance_threshold",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Program name or path of the LAMMPS binary.
    pub executable: PathBuf,
    /// Pass the engine's stdout/stderr through instead of discarding it.
    pub forward_output: bool,
    /// Copy the whole run directory here after the run.
    pub keep_run_dir: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            executable: PathBuf::from("lmp"),
            forward_output: false,
            keep_run_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub hic_path: PathBuf,
    pub output_dir: PathBuf,
    pub extraction: ExtractionConfig,
    pub simulation: SimulationSettings,
    pub lattice: LatticeConfig,
    pub contact_map: ContactMapConfig,
    pub engine: EngineConfig,
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    hic_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    chromosome: Option<String>,
    resolution: Option<i32>,
    count_threshold: Option<f64>,
    simulation: Option<SimulationSettings>,
    lattice: Option<LatticeConfig>,
    contact_map: Option<ContactMapConfig>,
    engine: Option<EngineConfig>,
}

impl PipelineConfigBuilder {
    pub const DEFAULT_COUNT_THRESHOLD: f64 = 2.0;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn hic_path(mut self, path: PathBuf) -> Self {
        self.hic_path = Some(path);
        self
    }
    pub fn output_dir(mut self, path: PathBuf) -> Self {
        self.output_dir = Some(path);
        self
    }
    pub fn chromosome(mut self, name: impl Into<String>) -> Self {
        self.chromosome = Some(name.into());
        self
    }
    pub fn resolution(mut self, resolution: i32) -> Self {
        self.resolution = Some(resolution);
        self
    }
    pub fn count_threshold(mut self, threshold: f64) -> Self {
        self.count_threshold = Some(threshold);
        self
    }
    pub fn simulation(mut self, settings: SimulationSettings) -> Self {
        self.simulation = Some(settings);
        self
    }
    pub fn lattice(mut self, lattice: LatticeConfig) -> Self {
        self.lattice = Some(lattice);
        self
    }
    pub fn contact_map(mut self, contact_map: ContactMapConfig) -> Self {
        self.contact_map = Some(contact_map);
        self
    }
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let extraction = ExtractionConfig {
            chromosome: self
                .chromosome
                .ok_or(ConfigError::MissingParameter("chromosome"))?,
            resolution: self
                .resolution
                .ok_or(ConfigError::MissingParameter("resolution"))?,
            count_threshold: self
                .count_threshold
                .unwrap_or(Self::DEFAULT_COUNT_THRESHOLD),
        };
        let config = PipelineConfig {
            hic_path: self
                .hic_path
                .ok_or(ConfigError::MissingParameter("hic_path"))?,
            output_dir: self
                .output_dir
                .ok_or(ConfigError::MissingParameter("output_dir"))?,
            extraction,
            simulation: self.simulation.unwrap_or_default(),
            lattice: self.lattice.unwrap_or_default(),
            contact_map: self.contact_map.unwrap_or_default(),
            engine: self.engine.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

impl PipelineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name: &'static str, reason: &str| -> Result<(), ConfigError> {
            Err(ConfigError::InvalidParameter {
                name,
                reason: reason.to_string(),
            })
        };

        if self.extraction.resolution <= 0 {
            return invalid("resolution", "must be a positive number of base pairs");
        }
        if self.extraction.count_threshold.is_nan() {
            return invalid("count_threshold", "must be a number");
        }
        self.contact_map.validate()?;
        if !(self.lattice.spacing > 0.0) {
            return invalid("spacing", "must be positive");
        }
        if self.lattice.box_dimensions.iter().any(|d| !(*d > 0.0)) {
            return invalid("box_dimensions", "every edge must be positive");
        }
        if self.lattice.walk.backtrack_depth == 0 {
            return invalid("backtrack_depth", "must be at least 1");
        }
        if self.simulation.dump_interval == 0 {
            return invalid("dump_interval", "must be at least 1");
        }
        if self.simulation.thermo_interval == 0 {
            return invalid("thermo_interval", "must be at least 1");
        }
        if !(self.simulation.timestep > 0.0) {
            return invalid("timestep", "must be positive");
        }
        Ok(())
    }
}
