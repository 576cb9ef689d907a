use crate::core::models::contact::ContactRecordTable;
use crate::core::models::lattice::{LatticeWalkGenerator, WalkError, WalkParams};
use crate::core::models::topology::{ChainTopology, TopologyCounts, TopologyError};
use nalgebra::Point3;
use rand::Rng;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const COMMAND_FILE_NAME: &str = "in.input";
pub const DUMP_FILE_NAME: &str = "sim.dump";
pub const LOG_FILE_NAME: &str = "sim.log";

const SEED_RANGE: std::ops::Range<u32> = 1..1_000_000;

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Contact table is empty, cannot size the polymer")]
    NoContacts,
    #[error("Contact ({bin_x}, {bin_y}) refers to a particle outside 1..={atoms}")]
    ContactOutOfRange {
        bin_x: usize,
        bin_y: usize,
        atoms: usize,
    },
    #[error("Invalid chain topology: {0}")]
    Topology(#[from] TopologyError),
    #[error("Failed to generate initial coordinates: {0}")]
    Walk(#[from] WalkError),
}

/// Parameters of the molecular dynamics run written into the command file.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    /// Maximum FENE bond extension.
    pub bond_coeff: f64,
    pub timesteps: u64,
    pub dump_interval: u64,
    pub thermo_interval: u64,
    pub timestep: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            bond_coeff: 55.0,
            timesteps: 1_000_000,
            dump_interval: 1000,
            thermo_interval: 50_000,
            timestep: 0.00001,
        }
    }
}

/// Geometry of the polymer system: chains, lattice spacing and simulation box.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckLayout {
    pub chain_lengths: Vec<usize>,
    pub spacing: f64,
    pub box_dimensions: [f64; 3],
    pub walk: WalkParams,
}

impl DeckLayout {
    pub const DEFAULT_SPACING: f64 = 3.0;
    pub const DEFAULT_BOX: [f64; 3] = [400.0, 400.0, 400.0];

    pub fn new(chain_lengths: Vec<usize>) -> Self {
        Self {
            chain_lengths,
            spacing: Self::DEFAULT_SPACING,
            box_dimensions: Self::DEFAULT_BOX,
            walk: WalkParams::default(),
        }
    }

    /// One chain whose length is the largest particle index in `records`.
    pub fn single_chain_for(records: &ContactRecordTable) -> Result<Self, DeckError> {
        let n = records.max_index().ok_or(DeckError::NoContacts)?;
        Ok(Self::new(vec![n]))
    }

    pub fn atom_count(&self) -> usize {
        self.chain_lengths.iter().sum()
    }

    pub fn data_file_name(&self) -> String {
        format!("random_coil_N{}.dat", self.atom_count())
    }
}

/// Contents of the LAMMPS command script.
pub struct CommandFile<'a> {
    pub data_file_name: &'a str,
    pub atom_count: usize,
    pub seed: u32,
    pub settings: &'a SimulationSettings,
    pub contacts: &'a ContactRecordTable,
}

pub fn write_command_file(writer: &mut impl Write, command: &CommandFile) -> io::Result<()> {
    let n = command.atom_count;
    let s = command.settings;

    writeln!(writer, "log {LOG_FILE_NAME}")?;
    writeln!(writer, "units lj")?;
    writeln!(writer)?;
    writeln!(writer, "atom_style angle")?;
    writeln!(writer, "boundary        p p p")?;
    writeln!(writer)?;
    writeln!(writer, "neighbor 4 bin")?;
    writeln!(writer, "neigh_modify every 1 delay 1 check yes")?;
    writeln!(writer)?;
    writeln!(writer, "atom_modify sort 0 0")?;
    writeln!(writer)?;
    writeln!(writer, "read_data {}", command.data_file_name)?;
    writeln!(writer, "reset_timestep 0")?;
    writeln!(writer)?;
    writeln!(writer, "write_data equilibrated_N{n}.dat")?;
    writeln!(writer)?;
    writeln!(writer, "group all type 1")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "dump   1   all   custom   {}   {DUMP_FILE_NAME}  id  x y z  ix iy iz",
        s.dump_interval
    )?;
    writeln!(
        writer,
        "dump_modify   1   format line \"%d %.5f %.5f %.5f %d %d %d\""
    )?;
    writeln!(writer)?;
    writeln!(writer, "angle_style   cosine")?;
    writeln!(writer, "angle_coeff   1 0.0")?;
    writeln!(writer)?;
    writeln!(writer, "pair_style      lj/cut 1.12246152962189")?;
    writeln!(writer, "pair_modify     shift yes")?;
    writeln!(writer, "pair_coeff      * * 1.0 1.0")?;
    writeln!(writer)?;
    writeln!(writer, "bond_style hybrid harmonic fene")?;
    writeln!(writer, "bond_coeff 1 fene 30.0 {} 1.0 1.0", s.bond_coeff)?;
    writeln!(writer, "bond_coeff 2 harmonic  1.0 2.2")?;
    writeln!(writer, "special_bonds fene")?;
    writeln!(writer)?;
    writeln!(writer, "fix 1 all nve")?;
    writeln!(writer, "fix 2 all langevin   1.0 1.0   1.0   {}", command.seed)?;
    writeln!(writer)?;
    writeln!(writer, "thermo {}", s.thermo_interval)?;
    writeln!(writer)?;

    for record in command.contacts {
        writeln!(
            writer,
            "create_bonds single/bond 2 {} {} special yes",
            record.bin_x, record.bin_y
        )?;
    }

    writeln!(
        writer,
        "thermo_style   custom   step  temp  etotal epair  emol  press pxx pyy pzz lx ly lz pe ke ebond evdwl"
    )?;
    writeln!(writer)?;
    writeln!(writer, "timestep {}", s.timestep)?;
    writeln!(writer, "run {}", s.timesteps)?;
    Ok(())
}

/// Contents of the LAMMPS data file.
pub struct DataFile<'a> {
    pub chain_lengths: &'a [usize],
    pub box_dimensions: [f64; 3],
    pub coordinates: &'a [Point3<f64>],
    pub topology: &'a ChainTopology,
}

pub fn write_data_file(writer: &mut impl Write, data: &DataFile) -> io::Result<()> {
    let counts = TopologyCounts::from_chain_lengths(data.chain_lengths);
    let chain_length = data
        .chain_lengths
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    writeln!(
        writer,
        "LAMMPS data file for random 3D walk on lattice: N = {}, Chain length = {chain_length}",
        counts.atoms
    )?;
    writeln!(writer)?;
    writeln!(writer, "{} atoms", counts.atoms)?;
    writeln!(writer, "1 atom types")?;
    writeln!(writer, "{} bonds", counts.bonds)?;
    writeln!(writer, "2 bond types")?;
    writeln!(writer, "1000 extra bond per atom")?;
    writeln!(writer, "{} angles", counts.angles)?;
    writeln!(writer, "1 angle types")?;
    writeln!(writer)?;
    for (dim, axis) in data.box_dimensions.iter().zip(["x", "y", "z"]) {
        writeln!(writer, "{:?} {:?} {axis}lo {axis}hi", -dim / 2.0, dim / 2.0)?;
    }
    writeln!(writer)?;
    writeln!(writer, "Masses")?;
    writeln!(writer)?;
    writeln!(writer, "1 1")?;
    writeln!(writer)?;
    writeln!(writer, "Atoms")?;
    writeln!(writer)?;

    for (i, (pos, tag)) in data
        .coordinates
        .iter()
        .zip(&data.topology.molecule_tags)
        .enumerate()
    {
        writeln!(
            writer,
            "{}\t{tag}\t1\t{:?}\t{:?}\t{:?}\t0\t0\t0",
            i + 1,
            pos.x,
            pos.y,
            pos.z
        )?;
    }

    if !data.topology.bonds.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Bonds")?;
        writeln!(writer)?;
        for (i, bond) in data.topology.bonds.iter().enumerate() {
            writeln!(writer, "{}\t1\t{}\t{}", i + 1, bond.atom1, bond.atom2)?;
        }
    }

    if !data.topology.angles.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Angles")?;
        writeln!(writer)?;
        for (i, angle) in data.topology.angles.iter().enumerate() {
            writeln!(
                writer,
                "{}\t1\t{}\t{}\t{}",
                i + 1,
                angle.atom1,
                angle.atom2,
                angle.atom3
            )?;
        }
    }
    Ok(())
}

/// A written command/data file pair, ready to be handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDeck {
    pub dir: PathBuf,
    pub atom_count: usize,
    pub seed: u32,
    data_file_name: String,
}

impl InputDeck {
    /// Writes `in.input` and `random_coil_N<n>.dat` into `dir`, creating it if needed.
    ///
    /// The lattice walk and the Langevin seed are both drawn from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::ContactOutOfRange`] if a contact names a particle
    /// outside the polymer, or propagates topology, walk and I/O failures.
    pub fn write(
        dir: &Path,
        layout: &DeckLayout,
        settings: &SimulationSettings,
        contacts: &ContactRecordTable,
        rng: &mut impl Rng,
    ) -> Result<Self, DeckError> {
        let n = layout.atom_count();
        if let Some(bad) = contacts
            .iter()
            .find(|r| !(1..=n).contains(&r.bin_x) || !(1..=n).contains(&r.bin_y))
        {
            return Err(DeckError::ContactOutOfRange {
                bin_x: bad.bin_x,
                bin_y: bad.bin_y,
                atoms: n,
            });
        }

        let topology = ChainTopology::build(n, &layout.chain_lengths)?;
        let walk = LatticeWalkGenerator::new(layout.walk).generate(n, rng)?;
        let coordinates = walk.scaled(layout.spacing);
        let seed = rng.gen_range(SEED_RANGE);

        fs::create_dir_all(dir)?;
        let data_file_name = layout.data_file_name();

        let mut data_writer = BufWriter::new(File::create(dir.join(&data_file_name))?);
        write_data_file(
            &mut data_writer,
            &DataFile {
                chain_lengths: &layout.chain_lengths,
                box_dimensions: layout.box_dimensions,
                coordinates: &coordinates,
                topology: &topology,
            },
        )?;
        data_writer.flush()?;

        let mut command_writer = BufWriter::new(File::create(dir.join(COMMAND_FILE_NAME))?);
        write_command_file(
            &mut command_writer,
            &CommandFile {
                data_file_name: &data_file_name,
                atom_count: n,
                seed,
                settings,
                contacts,
            },
        )?;
        command_writer.flush()?;

        debug!(dir = %dir.display(), seed, "Wrote input deck files");
        info!(
            atoms = n,
            contacts = contacts.len(),
            "Prepared LAMMPS input deck"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            atom_count: n,
            seed,
            data_file_name,
        })
    }

    pub fn command_path(&self) -> PathBuf {
        self.dir.join(COMMAND_FILE_NAME)
    }

    pub fn data_path(&self) -> PathBuf {
        self.dir.join(&self.data_file_name)
    }

    pub fn dump_path(&self) -> PathBuf {
        self.dir.join(DUMP_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE_NAME)
    }
}
