use crate::core::io::deck::{DeckLayout, InputDeck};
use crate::core::io::dump::DumpFile;
use crate::core::io::hic::{HicHeader, HicMetadata};
use crate::core::io::output::{
    CONTACT_MAP_FILE_NAME, ContactMapTsv, ContactSetTsv, STRUCTURE_FILE_NAME, StructureCsv,
};
use crate::core::io::traits::{ReadFormat, WriteFormat};
use crate::core::models::contact::ContactRecordTable;
use crate::core::models::timestep::SimulationTimestep;
use crate::engine::config::{ContactMapConfig, PipelineConfig};
use crate::engine::contact_map::build_contact_map;
use crate::engine::error::PipelineError;
use crate::engine::extract::{ContactExtractor, ContactSource};
use crate::engine::lammps::LammpsRunner;
use crate::engine::progress::{Progress, ProgressReporter, Stage};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Contacts extracted from a Hi-C file, together with its header.
#[derive(Debug, Clone)]
pub struct ExtractedContacts {
    pub metadata: HicMetadata,
    pub contacts: ContactRecordTable,
}

/// The final simulated structure and the files derived from it.
#[derive(Debug, Clone)]
pub struct TrajectoryOutputs {
    pub timestep: u64,
    pub structure: SimulationTimestep,
    pub contact_map: ContactRecordTable,
    pub structure_path: PathBuf,
    pub contact_map_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct StructureResult {
    pub extracted: ExtractedContacts,
    pub atom_count: usize,
    pub seed: u32,
    pub outputs: TrajectoryOutputs,
    pub log_path: Option<PathBuf>,
}

/// Reads the Hi-C header and extracts the filtered contact table.
#[instrument(skip_all, name = "extraction_workflow", fields(hic = %config.hic_path.display()))]
pub fn extract_contacts<S: ContactSource>(
    config: &PipelineConfig,
    source: S,
    reporter: &ProgressReporter,
) -> Result<ExtractedContacts, PipelineError> {
    let metadata = reporter.stage(Stage::ReadMetadata, || {
        HicHeader::read_from_path(&config.hic_path).map_err(PipelineError::from)
    })?;
    debug!(
        version = metadata.version,
        chromosomes = metadata.chromosomes.len(),
        "Read Hi-C header"
    );

    let contacts = reporter.stage(Stage::ExtractContacts, || {
        ContactExtractor::new(&metadata, source).extract(&config.hic_path, &config.extraction)
    })?;

    Ok(ExtractedContacts { metadata, contacts })
}

/// Writes the LAMMPS input deck for `contacts` into `dir`.
pub fn write_deck(
    config: &PipelineConfig,
    contacts: &ContactRecordTable,
    dir: &Path,
    rng: &mut impl Rng,
    reporter: &ProgressReporter,
) -> Result<InputDeck, PipelineError> {
    reporter.stage(Stage::WriteDeck, || {
        let mut layout = DeckLayout::single_chain_for(contacts)?;
        layout.spacing = config.lattice.spacing;
        layout.box_dimensions = config.lattice.box_dimensions;
        layout.walk = config.lattice.walk;
        Ok(InputDeck::write(
            dir,
            &layout,
            &config.simulation,
            contacts,
            rng,
        )?)
    })
}

/// Reads a dump, keeps its final timestep and writes `structure.csv` and `contactmap.tsv`.
#[instrument(skip_all, name = "trajectory_workflow", fields(dump = %dump_path.display()))]
pub fn analyze_trajectory(
    dump_path: &Path,
    output_dir: &Path,
    config: &ContactMapConfig,
    reporter: &ProgressReporter,
) -> Result<TrajectoryOutputs, PipelineError> {
    let (timestep, structure) = reporter.stage(Stage::ReadTrajectory, || {
        let series = DumpFile::read_from_path(dump_path)?;
        debug!(timesteps = series.len(), "Read trajectory");
        series
            .into_final_timestep()
            .ok_or_else(|| PipelineError::MissingTimestep {
                path: dump_path.to_path_buf(),
            })
    })?;
    info!(timestep, atoms = structure.len(), "Using final timestep");

    let contact_map = reporter.stage(Stage::BuildContactMap, || {
        Ok::<_, PipelineError>(build_contact_map(&structure, config.distance_threshold))
    })?;

    let (structure_path, contact_map_path) = reporter.stage(Stage::WriteOutputs, || {
        fs::create_dir_all(output_dir)?;
        let structure_path = output_dir.join(STRUCTURE_FILE_NAME);
        let contact_map_path = output_dir.join(CONTACT_MAP_FILE_NAME);

        StructureCsv::write_to_path(&structure, &(), &structure_path)?;
        if config.binary {
            ContactSetTsv::write_to_path(&contact_map.to_set(), &(), &contact_map_path)?;
        } else {
            ContactMapTsv::write_to_path(&contact_map, &config.diagonal, &contact_map_path)?;
        }
        Ok::<_, PipelineError>((structure_path, contact_map_path))
    })?;

    info!(
        contacts = contact_map.len(),
        output = %output_dir.display(),
        "Wrote structure and contact map"
    );
    Ok(TrajectoryOutputs {
        timestep,
        structure,
        contact_map,
        structure_path,
        contact_map_path,
    })
}

/// Runs the whole pipeline: Hi-C header, contact extraction, input deck, LAMMPS,
/// trajectory, structure and contact map.
///
/// The simulation runs in a temporary directory that is removed on return. It is
/// copied to `engine.keep_run_dir` first when one is configured, whether or not
/// LAMMPS succeeds.
#[instrument(skip_all, name = "structure_workflow")]
pub fn run<S: ContactSource>(
    config: &PipelineConfig,
    source: S,
    rng: &mut impl Rng,
    reporter: &ProgressReporter,
) -> Result<StructureResult, PipelineError> {
    info!(
        chromosome = %config.extraction.chromosome,
        resolution = config.extraction.resolution,
        "Starting Hi-C to structure pipeline"
    );
    let extracted = extract_contacts(config, source, reporter)?;
    reporter.report(Progress::Message(format!(
        "{} contacts above threshold",
        extracted.contacts.len()
    )));

    let run_dir = tempfile::Builder::new()
        .prefix("hic2structure-")
        .tempdir()?;
    let deck = write_deck(config, &extracted.contacts, run_dir.path(), rng, reporter)?;

    let runner = LammpsRunner::new(&config.engine);
    let engine_run = reporter.stage(Stage::RunSimulation, || {
        let result = runner.run(&deck, &config.output_dir);
        if let Some(keep) = &config.engine.keep_run_dir {
            if let Err(copy_err) = copy_run_dir(run_dir.path(), keep) {
                if result.is_ok() {
                    return Err(copy_err);
                }
                warn!(dir = %keep.display(), error = %copy_err, "Could not keep LAMMPS run directory");
            }
        }
        result
    })?;

    let outputs = analyze_trajectory(
        &engine_run.dump_path,
        &config.output_dir,
        &config.contact_map,
        reporter,
    )?;

    Ok(StructureResult {
        extracted,
        atom_count: deck.atom_count,
        seed: deck.seed,
        outputs,
        log_path: engine_run.log_path,
    })
}

fn copy_run_dir(from: &Path, to: &Path) -> Result<(), PipelineError> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            fs::copy(entry.path(), to.join(entry.file_name()))?;
        }
    }
    info!(dir = %to.display(), "Kept LAMMPS run directory");
    Ok(())
}
