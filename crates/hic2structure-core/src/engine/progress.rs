use std::fmt;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    ReadMetadata,
    ExtractContacts,
    WriteDeck,
    RunSimulation,
    ReadTrajectory,
    BuildContactMap,
    WriteOutputs,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::ReadMetadata,
        Stage::ExtractContacts,
        Stage::WriteDeck,
        Stage::RunSimulation,
        Stage::ReadTrajectory,
        Stage::BuildContactMap,
        Stage::WriteOutputs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::ReadMetadata => "Reading Hi-C metadata",
            Stage::ExtractContacts => "Extracting contacts",
            Stage::WriteDeck => "Writing LAMMPS input deck",
            Stage::RunSimulation => "Running LAMMPS",
            Stage::ReadTrajectory => "Reading trajectory",
            Stage::BuildContactMap => "Building contact map",
            Stage::WriteOutputs => "Writing outputs",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub enum Progress {
    StageStart { stage: Stage },
    StageFinish { stage: Stage },

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Reports `stage` as started, runs `f`, and reports it finished if `f` succeeds.
    pub fn stage<T, E>(&self, stage: Stage, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        self.report(Progress::StageStart { stage });
        let result = f()?;
        self.report(Progress::StageFinish { stage });
        Ok(result)
    }
}
