use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::{ConfigArgs, ContactMapArgs, DiagonalArg, EngineArgs, ExtractionArgs, SimulationArgs};
use crate::error::{CliError, Result};
use clap::ValueEnum;
use hic2structure::core::models::lattice::WalkParams;
use hic2structure::engine::config as core_config;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Reads the optional config file and applies `--set` overrides to it.
pub fn load_file_config(args: &ConfigArgs) -> Result<FileConfig> {
    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    apply_set_values(file_config, &args.set_values)
}

pub fn build_pipeline_config(
    mut file_config: FileConfig,
    extraction: &ExtractionArgs,
    simulation: &SimulationArgs,
    contact_map: &ContactMapArgs,
    engine: &EngineArgs,
    output_dir: &Path,
) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let extraction_file = file_config.extraction.take().unwrap_or_default();
    let chromosome = extraction
        .chromosome
        .clone()
        .or(extraction_file.chromosome)
        .unwrap_or(defaults.chromosome.clone());
    let resolution = extraction
        .resolution
        .or(extraction_file.resolution)
        .unwrap_or(defaults.resolution);
    let count_threshold = extraction
        .count_threshold
        .or(extraction_file.count_threshold)
        .unwrap_or(defaults.count_threshold);

    let simulation_file = file_config.simulation.take().unwrap_or_default();
    let settings_defaults = core_config::SimulationSettings::default();
    let settings = core_config::SimulationSettings {
        bond_coeff: simulation
            .bond_coeff
            .or(simulation_file.bond_coeff)
            .unwrap_or(defaults.bond_coeff),
        timesteps: simulation
            .timesteps
            .or(simulation_file.timesteps)
            .unwrap_or(defaults.timesteps),
        dump_interval: simulation_file
            .dump_interval
            .unwrap_or(settings_defaults.dump_interval),
        thermo_interval: simulation_file
            .thermo_interval
            .unwrap_or(settings_defaults.thermo_interval),
        timestep: simulation_file
            .timestep
            .unwrap_or(settings_defaults.timestep),
    };
    let seed = simulation.seed.or(simulation_file.seed);

    let lattice_file = file_config.lattice.take().unwrap_or_default();
    let lattice_defaults = core_config::LatticeConfig::default();
    let walk_defaults = WalkParams::default();
    let lattice = core_config::LatticeConfig {
        spacing: lattice_file.spacing.unwrap_or(lattice_defaults.spacing),
        box_dimensions: lattice_file
            .box_dimensions
            .unwrap_or(lattice_defaults.box_dimensions),
        walk: WalkParams {
            backtrack_depth: lattice_file
                .backtrack_depth
                .unwrap_or(walk_defaults.backtrack_depth),
            max_backtracks: lattice_file
                .max_backtracks
                .unwrap_or(walk_defaults.max_backtracks),
        },
    };

    let contact_map = merge_contact_map(&mut file_config, contact_map, &defaults);

    let engine_file = file_config.engine.take().unwrap_or_default();
    let engine = core_config::EngineConfig {
        executable: engine
            .lammps
            .clone()
            .or(engine_file.executable)
            .unwrap_or_else(|| PathBuf::from(&defaults.lammps)),
        forward_output: engine.show_lammps_output || engine_file.forward_output.unwrap_or(false),
        keep_run_dir: engine.keep_run_dir.clone().or(engine_file.keep_run_dir),
    };

    let pipeline = core_config::PipelineConfigBuilder::new()
        .hic_path(extraction.hic.clone())
        .output_dir(output_dir.to_path_buf())
        .chromosome(chromosome)
        .resolution(resolution)
        .count_threshold(count_threshold)
        .simulation(settings)
        .lattice(lattice)
        .contact_map(contact_map)
        .engine(engine)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        pipeline,
        contacts_path: extraction.contacts.clone(),
        seed,
    })
}

pub fn build_contact_map_config(
    mut file_config: FileConfig,
    args: &ContactMapArgs,
) -> Result<core_config::ContactMapConfig> {
    let config = merge_contact_map(&mut file_config, args, &DefaultsConfig::default());
    config
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;
    Ok(config)
}

fn merge_contact_map(
    file_config: &mut FileConfig,
    args: &ContactMapArgs,
    defaults: &DefaultsConfig,
) -> core_config::ContactMapConfig {
    let file = file_config.contact_map.take().unwrap_or_default();
    let diagonal = match args.diagonal.or(file.diagonal) {
        Some(DiagonalArg::MaxObserved) => core_config::DiagonalPolicy::MaxObserved,
        Some(DiagonalArg::Zero) | None => core_config::DiagonalPolicy::Zero,
    };
    core_config::ContactMapConfig {
        distance_threshold: args
            .distance_threshold
            .or(file.distance_threshold)
            .unwrap_or(defaults.distance_threshold),
        diagonal,
        binary: args.binary || file.binary.unwrap_or(false),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "extraction.chromosome" => {
                config
                    .extraction
                    .get_or_insert_with(Default::default)
                    .chromosome = Some(value.to_string());
            }
            "extraction.resolution" => {
                config
                    .extraction
                    .get_or_insert_with(Default::default)
                    .resolution = Some(parse_value(key, value)?);
            }
            "extraction.count-threshold" => {
                config
                    .extraction
                    .get_or_insert_with(Default::default)
                    .count_threshold = Some(parse_value(key, value)?);
            }
            "simulation.bond-coeff" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .bond_coeff = Some(parse_value(key, value)?);
            }
            "simulation.timesteps" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .timesteps = Some(parse_value(key, value)?);
            }
            "simulation.dump-interval" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .dump_interval = Some(parse_value(key, value)?);
            }
            "simulation.thermo-interval" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .thermo_interval = Some(parse_value(key, value)?);
            }
            "simulation.timestep" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .timestep = Some(parse_value(key, value)?);
            }
            "simulation.seed" => {
                config.simulation.get_or_insert_with(Default::default).seed =
                    Some(parse_value(key, value)?);
            }
            "lattice.spacing" => {
                config.lattice.get_or_insert_with(Default::default).spacing =
                    Some(parse_value(key, value)?);
            }
            "lattice.backtrack-depth" => {
                config
                    .lattice
                    .get_or_insert_with(Default::default)
                    .backtrack_depth = Some(parse_value(key, value)?);
            }
            "lattice.max-backtracks" => {
                config
                    .lattice
                    .get_or_insert_with(Default::default)
                    .max_backtracks = Some(parse_value(key, value)?);
            }
            "contact-map.distance-threshold" => {
                config
                    .contact_map
                    .get_or_insert_with(Default::default)
                    .distance_threshold = Some(parse_value(key, value)?);
            }
            "contact-map.diagonal" => {
                let policy = <DiagonalArg as ValueEnum>::from_str(value, true).map_err(|_| {
                    CliError::Config(format!(
                        "Invalid value for {}: {} (expected 'zero' or 'max-observed')",
                        key, value
                    ))
                })?;
                config
                    .contact_map
                    .get_or_insert_with(Default::default)
                    .diagonal = Some(policy);
            }
            "contact-map.binary" => {
                config.contact_map.get_or_insert_with(Default::default).binary =
                    Some(parse_value(key, value)?);
            }
            "engine.executable" => {
                config
                    .engine
                    .get_or_insert_with(Default::default)
                    .executable = Some(PathBuf::from(value));
            }
            "engine.forward-output" => {
                config
                    .engine
                    .get_or_insert_with(Default::default)
                    .forward_output = Some(parse_value(key, value)?);
            }
            "engine.keep-run-dir" => {
                config
                    .engine
                    .get_or_insert_with(Default::default)
                    .keep_run_dir = Some(PathBuf::from(value));
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;

    fn run_args(extra: &[&str]) -> crate::cli::RunArgs {
        let mut argv = vec![
            "hic2structure",
            "run",
            "--hic",
            "sample.hic",
            "--contacts",
            "block.tsv",
            "-o",
            "out",
        ];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Run(args) => args,
            other => panic!("expected run, got {other:?}"),
        }
    }

    fn build(args: &crate::cli::RunArgs) -> Result<AppConfig> {
        let file = load_file_config(&args.config)?;
        build_pipeline_config(
            file,
            &args.extraction,
            &args.simulation,
            &args.contact_map,
            &args.engine,
            &args.output,
        )
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let app = build(&run_args(&[])).unwrap();
        let config = &app.pipeline;
        assert_eq!(config.extraction.chromosome, "X");
        assert_eq!(config.extraction.resolution, 250_000);
        assert_eq!(config.extraction.count_threshold, 2.0);
        assert_eq!(config.simulation.bond_coeff, 55.0);
        assert_eq!(config.simulation.timesteps, 1_000_000);
        assert_eq!(config.contact_map.distance_threshold, 3.3);
        assert_eq!(config.engine.executable, PathBuf::from("lmp"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(app.contacts_path, PathBuf::from("block.tsv"));
        assert_eq!(app.seed, None);
    }

    #[test]
    fn precedence_is_flag_then_set_then_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [extraction]
            chromosome = "2L"
            resolution = 500000

            [simulation]
            timesteps = 100
            bond-coeff = 30.0
            seed = 9

            [contact-map]
            diagonal = "max-observed"
            "#,
        )
        .unwrap();

        let args = run_args(&[
            "--config",
            path.to_str().unwrap(),
            "-S",
            "simulation.timesteps=200",
            "-S",
            "extraction.resolution=1000000",
            "--bond-coeff",
            "45",
            "-c",
            "3R",
        ]);
        let app = build(&args).unwrap();
        let config = &app.pipeline;

        assert_eq!(config.extraction.chromosome, "3R");
        assert_eq!(config.extraction.resolution, 1_000_000);
        assert_eq!(config.simulation.timesteps, 200);
        assert_eq!(config.simulation.bond_coeff, 45.0);
        assert_eq!(
            config.contact_map.diagonal,
            core_config::DiagonalPolicy::MaxObserved
        );
        assert_eq!(app.seed, Some(9));
    }

    #[test]
    fn set_values_are_validated() {
        let bad_format = apply_set_values(FileConfig::default(), &["timesteps".to_string()]);
        assert!(matches!(bad_format, Err(CliError::Config(_))));

        let bad_key = apply_set_values(FileConfig::default(), &["engine.threads=4".to_string()]);
        assert!(matches!(bad_key, Err(CliError::Config(msg)) if msg.contains("engine.threads")));

        let bad_value =
            apply_set_values(FileConfig::default(), &["lattice.spacing=wide".to_string()]);
        assert!(matches!(bad_value, Err(CliError::Config(_))));

        let bad_policy = apply_set_values(
            FileConfig::default(),
            &["contact-map.diagonal=one".to_string()],
        );
        assert!(matches!(bad_policy, Err(CliError::Config(_))));
    }

    #[test]
    fn set_values_cover_engine_and_lattice() {
        let config = apply_set_values(
            FileConfig::default(),
            &[
                "engine.executable=/usr/bin/lmp_mpi".to_string(),
                "engine.forward-output=true".to_string(),
                "lattice.backtrack-depth=4".to_string(),
                "contact-map.diagonal=MAX-OBSERVED".to_string(),
            ],
        )
        .unwrap();
        let engine = config.engine.unwrap();
        assert_eq!(engine.executable, Some(PathBuf::from("/usr/bin/lmp_mpi")));
        assert_eq!(engine.forward_output, Some(true));
        assert_eq!(config.lattice.unwrap().backtrack_depth, Some(4));
        assert_eq!(
            config.contact_map.unwrap().diagonal,
            Some(DiagonalArg::MaxObserved)
        );
    }

    #[test]
    fn invalid_merged_values_surface_as_config_errors() {
        let args = run_args(&["-r", "0"]);
        assert!(matches!(build(&args), Err(CliError::Config(_))));

        let contact_map = build_contact_map_config(
            FileConfig::default(),
            &ContactMapArgs {
                distance_threshold: Some(-1.0),
                ..ContactMapArgs::default()
            },
        );
        assert!(matches!(contact_map, Err(CliError::Config(_))));
    }
}
