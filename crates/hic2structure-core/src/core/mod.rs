//! # Core Module
//!
//! Stateless building blocks of the Hi-C to 3-D structure pipeline.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Contact tables, trajectory snapshots, chain
//!   topology and lattice walks
//! - **File I/O** ([`io`]) - The `.hic` header reader, the LAMMPS dump reader, the
//!   LAMMPS input deck writer and the structure / contact map writers
//!
//! Nothing in this module spawns processes or reads configuration; orchestration
//! lives in [`crate::engine`] and [`crate::workflows`].

pub mod io;
pub mod models;
