//! Readers and writers for every file the pipeline touches.
//!
//! Parsing formats implement [`traits::ReadFormat`], serializers implement
//! [`traits::WriteFormat`]. The LAMMPS input deck is written by [`deck`] directly,
//! since it spans two files and consumes randomness.

pub mod deck;
pub mod dump;
pub mod hic;
pub mod output;
pub mod traits;
