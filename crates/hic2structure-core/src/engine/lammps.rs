use super::config::EngineConfig;
use super::error::PipelineError;
use crate::core::io::deck::{InputDeck, LOG_FILE_NAME};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

/// Files left behind by a finished engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRun {
    pub dump_path: PathBuf,
    /// Copy of `sim.log` in the output directory, if the engine wrote one.
    pub log_path: Option<PathBuf>,
}

/// Launches the LAMMPS binary on a written input deck.
pub struct LammpsRunner {
    executable: PathBuf,
    forward_output: bool,
}

impl LammpsRunner {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            forward_output: config.forward_output,
        }
    }

    /// Resolves the configured executable against `PATH`.
    pub fn locate(&self) -> Result<PathBuf, PipelineError> {
        which::which(&self.executable).map_err(|source| PipelineError::EngineNotFound {
            executable: self.executable.clone(),
            source,
        })
    }

    /// Runs `<exe> -in <deck>/in.input` with the deck directory as the child's
    /// working directory and waits for it to exit.
    ///
    /// `sim.log` is copied into `log_dir` whether or not the run succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EngineNotFound`] before spawning if the executable
    /// cannot be resolved, and [`PipelineError::EngineExecution`] on a non-zero exit.
    pub fn run(&self, deck: &InputDeck, log_dir: &Path) -> Result<EngineRun, PipelineError> {
        let executable = self.locate()?;
        let command_file = std::path::absolute(deck.command_path())?;

        info!(executable = %executable.display(), atoms = deck.atom_count, "Launching LAMMPS");
        debug!(run_dir = %deck.dir.display(), input = %command_file.display(), "LAMMPS invocation");

        let stdio = || {
            if self.forward_output {
                Stdio::inherit()
            } else {
                Stdio::null()
            }
        };
        let status = Command::new(&executable)
            .arg("-in")
            .arg(&command_file)
            .current_dir(&deck.dir)
            .stdin(Stdio::null())
            .stdout(stdio())
            .stderr(stdio())
            .status()?;

        let log_path = copy_log(&deck.log_path(), log_dir)?;

        if !status.success() {
            warn!(%status, "LAMMPS exited unsuccessfully");
            return Err(PipelineError::EngineExecution {
                status,
                log: log_path,
            });
        }

        info!("LAMMPS run finished");
        Ok(EngineRun {
            dump_path: deck.dump_path(),
            log_path,
        })
    }
}

fn copy_log(log: &Path, log_dir: &Path) -> Result<Option<PathBuf>, PipelineError> {
    if !log.is_file() {
        warn!(path = %log.display(), "LAMMPS did not write a log file");
        return Ok(None);
    }
    fs::create_dir_all(log_dir)?;
    let dest = log_dir.join(LOG_FILE_NAME);
    fs::copy(log, &dest)?;
    Ok(Some(dest))
}
