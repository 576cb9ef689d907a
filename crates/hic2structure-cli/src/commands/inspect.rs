use crate::cli::InspectArgs;
use crate::error::{CliError, Result};
use hic2structure::core::io::hic::{HicHeader, HicMetadata};
use hic2structure::core::io::traits::ReadFormat;
use std::fmt;
use tracing::info;

pub fn run(args: InspectArgs) -> Result<()> {
    info!("Reading Hi-C header from {:?}", &args.hic);
    let metadata = HicHeader::read_from_path(&args.hic).map_err(|e| CliError::FileParsing {
        path: args.hic.clone(),
        source: e.into(),
    })?;
    print!("{}", HeaderSummary(&metadata));
    Ok(())
}

/// Human-readable listing of a parsed header.
struct HeaderSummary<'a>(&'a HicMetadata);

impl fmt::Display for HeaderSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let metadata = self.0;
        writeln!(f, "Version:      {}", metadata.version)?;
        writeln!(f, "Genome:       {}", metadata.genome_id)?;
        writeln!(f, "Master index: {}", metadata.master_index)?;
        for (key, value) in &metadata.attributes {
            writeln!(f, "Attribute:    {} = {}", key, value)?;
        }
        writeln!(f, "Chromosomes:")?;
        for (name, length) in &metadata.chromosomes {
            writeln!(f, "  {:<12} {:>12} bp", name, length)?;
        }
        writeln!(
            f,
            "Base-pair resolutions: {}",
            join(&metadata.basepair_resolutions)
        )?;
        writeln!(
            f,
            "Fragment resolutions:  {}",
            join(&metadata.fragment_resolutions)
        )
    }
}

fn join(values: &[i32]) -> String {
    values
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
