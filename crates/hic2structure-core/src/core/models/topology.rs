use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Chain lengths sum to {sum}, but the system has {atoms} atoms")]
    LengthMismatch { sum: usize, atoms: usize },
    #[error("Chain {index} has zero length")]
    EmptyChain { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1: usize, // 1-based atom id
    pub atom2: usize, // 1-based atom id
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Angle {
    pub atom1: usize,
    pub atom2: usize, // vertex
    pub atom3: usize,
}

/// Atom, bond and angle counts implied by a list of chain lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyCounts {
    pub atoms: usize,
    pub chains: usize,
    pub bonds: usize,
    pub angles: usize,
}

impl TopologyCounts {
    pub fn from_chain_lengths(chain_lengths: &[usize]) -> Self {
        let atoms: usize = chain_lengths.iter().sum();
        let chains = chain_lengths.len();
        Self {
            atoms,
            chains,
            bonds: atoms.saturating_sub(chains),
            angles: chain_lengths.iter().map(|&l| l.saturating_sub(2)).sum(),
        }
    }
}

/// Connectivity of one or more linear polymer chains laid end to end.
///
/// Atom `i` (1-based) belongs to molecule `molecule_tags[i - 1]`. Bonds join
/// consecutive atoms and angles join consecutive triples, but never across a
/// chain boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainTopology {
    pub molecule_tags: Vec<usize>,
    pub bonds: Vec<Bond>,
    pub angles: Vec<Angle>,
}

impl ChainTopology {
    pub fn build(n: usize, chain_lengths: &[usize]) -> Result<Self, TopologyError> {
        if let Some(index) = chain_lengths.iter().position(|&l| l == 0) {
            return Err(TopologyError::EmptyChain { index });
        }
        let sum: usize = chain_lengths.iter().sum();
        if sum != n {
            return Err(TopologyError::LengthMismatch { sum, atoms: n });
        }

        // Ids of the last atom of every chain.
        let chain_ends: HashSet<usize> = chain_lengths
            .iter()
            .scan(0, |acc, &l| {
                *acc += l;
                Some(*acc)
            })
            .collect();

        let molecule_tags = chain_lengths
            .iter()
            .enumerate()
            .flat_map(|(chain, &len)| std::iter::repeat_n(chain + 1, len))
            .collect();

        let bonds = (1..n)
            .filter(|i| !chain_ends.contains(i))
            .map(|i| Bond {
                atom1: i,
                atom2: i + 1,
            })
            .collect();

        let angles = (1..n.saturating_sub(1))
            .filter(|i| !chain_ends.contains(i) && !chain_ends.contains(&(i + 1)))
            .map(|i| Angle {
                atom1: i,
                atom2: i + 1,
                atom3: i + 2,
            })
            .collect();

        Ok(Self {
            molecule_tags,
            bonds,
            angles,
        })
    }

    pub fn atom_count(&self) -> usize {
        self.molecule_tags.len()
    }

    pub fn molecule_of(&self, atom_id: usize) -> Option<usize> {
        atom_id
            .checked_sub(1)
            .and_then(|idx| self.molecule_tags.get(idx))
            .copied()
    }

    pub fn counts(&self) -> TopologyCounts {
        TopologyCounts {
            atoms: self.atom_count(),
            chains: self.molecule_tags.last().copied().unwrap_or(0),
            bonds: self.bonds.len(),
            angles: self.angles.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_no_cross_chain_terms(topology: &ChainTopology) {
        for bond in &topology.bonds {
            assert_eq!(
                topology.molecule_of(bond.atom1),
                topology.molecule_of(bond.atom2),
                "bond {:?} crosses a chain boundary",
                bond
            );
        }
        for angle in &topology.angles {
            let tag = topology.molecule_of(angle.atom1);
            assert_eq!(tag, topology.molecule_of(angle.atom2));
            assert_eq!(tag, topology.molecule_of(angle.atom3));
        }
    }

    #[test]
    fn single_chain_has_consecutive_bonds_and_angles() {
        let topology = ChainTopology::build(5, &[5]).unwrap();
        assert_eq!(topology.molecule_tags, vec![1, 1, 1, 1, 1]);
        assert_eq!(
            topology.bonds,
            (1..5).map(|i| Bond { atom1: i, atom2: i + 1 }).collect::<Vec<_>>()
        );
        assert_eq!(
            topology.angles,
            vec![
                Angle { atom1: 1, atom2: 2, atom3: 3 },
                Angle { atom1: 2, atom2: 3, atom3: 4 },
                Angle { atom1: 3, atom2: 4, atom3: 5 },
            ]
        );
    }

    #[test]
    fn multiple_chains_never_bond_across_boundaries() {
        let lengths = [3, 1, 4, 2];
        let topology = ChainTopology::build(10, &lengths).unwrap();

        assert_eq!(topology.molecule_tags, vec![1, 1, 1, 2, 3, 3, 3, 3, 4, 4]);
        assert!(!topology.bonds.contains(&Bond { atom1: 3, atom2: 4 }));
        assert!(!topology.bonds.contains(&Bond { atom1: 4, atom2: 5 }));
        assert!(!topology.bonds.contains(&Bond { atom1: 8, atom2: 9 }));
        assert_no_cross_chain_terms(&topology);
    }

    #[test]
    fn built_counts_match_counts_derived_from_lengths() {
        for lengths in [vec![1], vec![2], vec![7], vec![3, 1, 4, 2], vec![2, 2, 2], vec![10, 1, 1]] {
            let n = lengths.iter().sum();
            let topology = ChainTopology::build(n, &lengths).unwrap();
            let expected = TopologyCounts::from_chain_lengths(&lengths);

            assert_eq!(topology.counts(), expected, "lengths {:?}", lengths);
            assert_eq!(expected.bonds, n - lengths.len());
            assert_eq!(
                expected.angles,
                lengths.iter().map(|&l| l.saturating_sub(2)).sum::<usize>()
            );
            assert_no_cross_chain_terms(&topology);
        }
    }

    #[test]
    fn molecule_tags_are_non_decreasing_and_step_by_one() {
        let topology = ChainTopology::build(9, &[2, 3, 4]).unwrap();
        for pair in topology.molecule_tags.windows(2) {
            assert!(pair[1] == pair[0] || pair[1] == pair[0] + 1);
        }
    }

    #[test]
    fn build_rejects_length_mismatch() {
        assert_eq!(
            ChainTopology::build(6, &[2, 3]),
            Err(TopologyError::LengthMismatch { sum: 5, atoms: 6 })
        );
    }

    #[test]
    fn build_rejects_empty_chain() {
        assert_eq!(
            ChainTopology::build(3, &[3, 0]),
            Err(TopologyError::EmptyChain { index: 1 })
        );
    }

    #[test]
    fn molecule_of_handles_out_of_range_ids() {
        let topology = ChainTopology::build(2, &[2]).unwrap();
        assert_eq!(topology.molecule_of(0), None);
        assert_eq!(topology.molecule_of(3), None);
        assert_eq!(topology.molecule_of(2), Some(1));
    }
}
