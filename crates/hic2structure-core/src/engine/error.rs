use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::deck::DeckError;
use crate::core::io::dump::DumpError;
use crate::core::io::hic::HicError;
use crate::core::io::output::OutputError;
use crate::core::models::lattice::WalkError;
use crate::core::models::topology::TopologyError;

/// A request that is well-formed but does not match the input data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Chromosome '{requested}' not found. Available chromosomes: {}", .available.join(", "))]
    UnknownChromosome {
        requested: String,
        available: Vec<String>,
    },
    #[error("Resolution {requested} not found. Available resolutions: {}", join_numbers(.available))]
    UnknownResolution { requested: i32, available: Vec<i32> },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn join_numbers(values: &[i32]) -> String {
    values
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Hi-C format error: {0}")]
    HicFormat(#[from] HicError),

    #[error("LAMMPS dump format error: {0}")]
    DumpFormat(#[from] DumpError),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Contact extraction failed: {0}")]
    Extraction(String),

    #[error("Initial structure generation failed: {0}")]
    Generation(#[from] WalkError),

    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("Input deck error: {0}")]
    Deck(DeckError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("LAMMPS exited with {status}{}", .log.as_ref().map(|p| format!(" (see log: {})", p.display())).unwrap_or_default())]
    EngineExecution {
        status: ExitStatus,
        log: Option<PathBuf>,
    },

    #[error("LAMMPS executable '{executable}' not found: {source}")]
    EngineNotFound {
        executable: PathBuf,
        #[source]
        source: which::Error,
    },

    #[error("Simulation produced no timesteps in {path}")]
    MissingTimestep { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DeckError> for PipelineError {
    fn from(err: DeckError) -> Self {
        match err {
            DeckError::Walk(walk) => Self::Generation(walk),
            DeckError::Topology(topology) => Self::Topology(topology),
            other => Self::Deck(other),
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(err: ConfigError) -> Self {
        Self::Validation(ValidationError::Config(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_list_the_allowed_set() {
        let err = ValidationError::UnknownChromosome {
            requested: "Y".to_string(),
            available: vec!["2L".to_string(), "X".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Chromosome 'Y' not found. Available chromosomes: 2L, X"
        );

        let err = ValidationError::UnknownResolution {
            requested: 100,
            available: vec![250_000, 500_000],
        };
        assert_eq!(
            err.to_string(),
            "Resolution 100 not found. Available resolutions: 250000, 500000"
        );
    }

    #[test]
    fn deck_errors_are_routed_to_their_stage() {
        let walk = DeckError::Walk(WalkError::ZeroBacktrackDepth);
        assert!(matches!(
            PipelineError::from(walk),
            PipelineError::Generation(WalkError::ZeroBacktrackDepth)
        ));

        let topology = DeckError::Topology(TopologyError::EmptyChain { index: 0 });
        assert!(matches!(
            PipelineError::from(topology),
            PipelineError::Topology(_)
        ));

        assert!(matches!(
            PipelineError::from(DeckError::NoContacts),
            PipelineError::Deck(DeckError::NoContacts)
        ));
    }
}
