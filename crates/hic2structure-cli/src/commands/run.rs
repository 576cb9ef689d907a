use crate::cli::RunArgs;
use crate::config::{build_pipeline_config, load_file_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use hic2structure::engine::progress::ProgressReporter;
use hic2structure::workflows;
use tracing::info;

pub fn run(args: RunArgs) -> Result<()> {
    let file_config = load_file_config(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let app = build_pipeline_config(
        file_config,
        &args.extraction,
        &args.simulation,
        &args.contact_map,
        &args.engine,
        &args.output,
    )?;

    let source = app.contact_source()?;
    let mut rng = app.rng();
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Modelling chromosome {} at {} bp resolution...",
        app.pipeline.extraction.chromosome, app.pipeline.extraction.resolution
    );
    let result = workflows::structure::run(&app.pipeline, source, &mut rng, &reporter)?;

    println!(
        "Simulated {} atoms from {} contacts (LAMMPS seed {}).",
        result.atom_count,
        result.extracted.contacts.len(),
        result.seed
    );
    println!(
        "Structure (timestep {}) written to: {}",
        result.outputs.timestep,
        result.outputs.structure_path.display()
    );
    println!(
        "Contact map ({} contacts) written to: {}",
        result.outputs.contact_map.len(),
        result.outputs.contact_map_path.display()
    );
    if let Some(log) = &result.log_path {
        println!("LAMMPS log written to: {}", log.display());
    }
    Ok(())
}
