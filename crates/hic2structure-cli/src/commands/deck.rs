use crate::cli::{ContactMapArgs, DeckArgs, EngineArgs};
use crate::config::{build_pipeline_config, load_file_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use hic2structure::engine::progress::ProgressReporter;
use hic2structure::workflows::structure::{extract_contacts, write_deck};
use tracing::info;

pub fn run(args: DeckArgs) -> Result<()> {
    let file_config = load_file_config(&args.config)?;
    let app = build_pipeline_config(
        file_config,
        &args.extraction,
        &args.simulation,
        &ContactMapArgs::default(),
        &EngineArgs::default(),
        &args.output,
    )?;

    let source = app.contact_source()?;
    let mut rng = app.rng();

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let extracted = extract_contacts(&app.pipeline, source, &reporter)?;
    info!("Extracted {} contacts", extracted.contacts.len());

    let deck = write_deck(
        &app.pipeline,
        &extracted.contacts,
        &app.pipeline.output_dir,
        &mut rng,
        &reporter,
    )?;

    println!(
        "Input deck for {} atoms (seed {}) written to: {}",
        deck.atom_count,
        deck.seed,
        deck.command_path().display()
    );
    println!("Data file written to: {}", deck.data_path().display());
    Ok(())
}
