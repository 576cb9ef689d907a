use crate::cli::ContactsArgs;
use crate::config::{build_contact_map_config, load_file_config};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use hic2structure::engine::progress::ProgressReporter;
use hic2structure::workflows::structure::analyze_trajectory;
use tracing::info;

pub fn run(args: ContactsArgs) -> Result<()> {
    let file_config = load_file_config(&args.config)?;
    let config = build_contact_map_config(file_config, &args.contact_map)?;
    info!(
        "Building contact map from {:?} with threshold {}",
        &args.dump, config.distance_threshold
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    let outputs = analyze_trajectory(&args.dump, &args.output, &config, &reporter)?;

    println!(
        "Structure (timestep {}, {} atoms) written to: {}",
        outputs.timestep,
        outputs.structure.len(),
        outputs.structure_path.display()
    );
    println!(
        "Contact map ({} contacts) written to: {}",
        outputs.contact_map.len(),
        outputs.contact_map_path.display()
    );
    Ok(())
}
