use nalgebra::Point3;
use std::collections::BTreeMap;

/// One atom row of a trajectory snapshot.
///
/// `image` holds the periodic-image flags written by the engine. They are kept
/// for completeness but not used by any downstream computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtomRecord {
    pub id: usize,
    pub position: Point3<f64>,
    pub image: [i32; 3],
}

impl AtomRecord {
    pub fn new(id: usize, position: Point3<f64>, image: [i32; 3]) -> Self {
        Self {
            id,
            position,
            image,
        }
    }
}

/// All atoms of a single simulation timestep, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationTimestep {
    atoms: Vec<AtomRecord>,
}

impl SimulationTimestep {
    pub fn new(atoms: Vec<AtomRecord>) -> Self {
        Self { atoms }
    }

    pub fn atoms(&self) -> &[AtomRecord] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = usize> + '_ {
        self.atoms.iter().map(|a| a.id)
    }
}

/// Timestep number to snapshot, ordered by timestep number.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeseries {
    steps: BTreeMap<u64, SimulationTimestep>,
}

impl Timeseries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a snapshot, replacing any earlier snapshot with the same number.
    pub fn insert(&mut self, timestep: u64, snapshot: SimulationTimestep) -> Option<SimulationTimestep> {
        self.steps.insert(timestep, snapshot)
    }

    pub fn get(&self, timestep: u64) -> Option<&SimulationTimestep> {
        self.steps.get(&timestep)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn timesteps(&self) -> impl Iterator<Item = u64> + '_ {
        self.steps.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &SimulationTimestep)> {
        self.steps.iter().map(|(k, v)| (*k, v))
    }

    /// The snapshot with the numerically largest timestep, i.e. the converged structure.
    pub fn final_timestep(&self) -> Option<(u64, &SimulationTimestep)> {
        self.steps.iter().next_back().map(|(k, v)| (*k, v))
    }

    /// Consumes the series and keeps only the final snapshot.
    pub fn into_final_timestep(mut self) -> Option<(u64, SimulationTimestep)> {
        self.steps.pop_last()
    }
}
