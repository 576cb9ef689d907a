use nalgebra::{Point3, Vector3};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, trace};

pub type LatticeCoordinate = Vector3<i32>;

const UNIT_STEPS: [[i32; 3]; 6] = [
    [1, 0, 0],
    [0, 1, 0],
    [0, 0, 1],
    [-1, 0, 0],
    [0, -1, 0],
    [0, 0, -1],
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalkError {
    #[error(
        "Random walk gave up after {backtracks} backtracks with {placed} of {requested} points placed"
    )]
    BudgetExhausted {
        requested: usize,
        placed: usize,
        backtracks: usize,
    },
    #[error("Backtrack depth must be at least 1")]
    ZeroBacktrackDepth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkParams {
    /// Number of trailing points discarded when the walk gets trapped.
    pub backtrack_depth: usize,
    /// Upper bound on backtracks before the search fails.
    pub max_backtracks: usize,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self {
            backtrack_depth: 10,
            max_backtracks: 10_000,
        }
    }
}

/// A self-avoiding walk on the unit cubic lattice, starting at the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatticeWalk {
    points: Vec<LatticeCoordinate>,
}

impl LatticeWalk {
    pub fn points(&self) -> &[LatticeCoordinate] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Lattice points converted to Cartesian coordinates with the given spacing.
    pub fn scaled(&self, spacing: f64) -> Vec<Point3<f64>> {
        self.points
            .iter()
            .map(|p| Point3::from(p.cast::<f64>() * spacing))
            .collect()
    }

    pub fn is_self_avoiding(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.points.len());
        self.points.iter().all(|p| seen.insert(*p))
    }

    pub fn is_connected(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| (w[1] - w[0]).abs().sum() == 1)
    }
}

pub struct LatticeWalkGenerator {
    params: WalkParams,
}

impl LatticeWalkGenerator {
    pub fn new(params: WalkParams) -> Self {
        Self { params }
    }

    /// Grows a walk of `n` points one unit step at a time.
    ///
    /// Each step is drawn uniformly from the unoccupied neighbours of the current
    /// end point. When every neighbour is occupied the walk is trapped, and the
    /// last `backtrack_depth` points are discarded before growth resumes. The
    /// origin is never discarded.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::BudgetExhausted`] if more than `max_backtracks`
    /// backtracks are needed.
    pub fn generate(&self, n: usize, rng: &mut impl Rng) -> Result<LatticeWalk, WalkError> {
        if self.params.backtrack_depth == 0 {
            return Err(WalkError::ZeroBacktrackDepth);
        }
        if n == 0 {
            return Ok(LatticeWalk { points: Vec::new() });
        }

        let mut points: Vec<LatticeCoordinate> = Vec::with_capacity(n);
        let mut occupied: HashSet<LatticeCoordinate> = HashSet::with_capacity(n);
        points.push(LatticeCoordinate::zeros());
        occupied.insert(LatticeCoordinate::zeros());

        let mut backtracks = 0;
        let mut free = Vec::with_capacity(UNIT_STEPS.len());

        while points.len() < n {
            let head = points[points.len() - 1];
            free.clear();
            free.extend(
                UNIT_STEPS
                    .iter()
                    .map(|s| head + LatticeCoordinate::from(*s))
                    .filter(|candidate| !occupied.contains(candidate)),
            );

            if let Some(next) = free.choose(rng) {
                occupied.insert(*next);
                points.push(*next);
                continue;
            }

            backtracks += 1;
            if backtracks > self.params.max_backtracks {
                return Err(WalkError::BudgetExhausted {
                    requested: n,
                    placed: points.len(),
                    backtracks: backtracks - 1,
                });
            }
            let keep = points
                .len()
                .saturating_sub(self.params.backtrack_depth)
                .max(1);
            trace!(placed = points.len(), keep, "Walk trapped, backtracking");
            for removed in points.drain(keep..) {
                occupied.remove(&removed);
            }
        }

        debug!(n, backtracks, "Generated self-avoiding lattice walk");
        Ok(LatticeWalk { points })
    }
}

impl Default for LatticeWalkGenerator {
    fn default() -> Self {
        Self::new(WalkParams::default())
    }
}
