use crate::error::{CliError, Result};
use hic2structure::engine::config as core_config;
use hic2structure::engine::extract::DumpedBlockSource;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use tracing::info;

/// Fully merged settings for the subcommands that start from a Hi-C file.
#[derive(Debug)]
pub struct AppConfig {
    pub pipeline: core_config::PipelineConfig,
    /// Dumped contact block read by [`DumpedBlockSource`].
    pub contacts_path: PathBuf,
    pub seed: Option<u64>,
}

impl AppConfig {
    /// A seeded RNG when `seed` is set, an entropy-seeded one otherwise.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => {
                info!("Using fixed seed {}", seed);
                StdRng::seed_from_u64(seed)
            }
            None => StdRng::from_entropy(),
        }
    }

    pub fn contact_source(&self) -> Result<DumpedBlockSource> {
        if !self.contacts_path.is_file() {
            return Err(CliError::Argument(format!(
                "Contact block '{}' does not exist or is not a file",
                self.contacts_path.display()
            )));
        }
        Ok(DumpedBlockSource::new(&self.contacts_path))
    }
}
