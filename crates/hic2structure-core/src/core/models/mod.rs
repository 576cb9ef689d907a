//! # Core Models Module
//!
//! Plain data structures shared by every stage of the Hi-C → structure pipeline.
//!
//! - [`contact`] - Contact records, ordered contact tables and value-less contact sets
//! - [`timestep`] - Per-atom trajectory rows, single snapshots and the full timeseries
//! - [`topology`] - Molecule tags, bonds and angles for linear polymer chains
//! - [`lattice`] - Self-avoiding random walks on the cubic lattice used as initial coordinates
//!
//! None of these types perform I/O; reading and writing lives in [`crate::core::io`].

pub mod contact;
pub mod lattice;
pub mod timestep;
pub mod topology;
