//! # hic2structure Core Library
//!
//! Converts genome contact-frequency data from a Hi-C container into a simulated
//! 3-D polymer structure by driving LAMMPS, then derives a spatial contact map from
//! the simulated structure.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Plain data models (`ContactRecordTable`,
//!   `Timeseries`, `ChainTopology`, `LatticeWalk`) and the file formats that read and
//!   write them.
//!
//! - **[`engine`]: The Logic Core.** Configuration, the error taxonomy, contact
//!   extraction and filtering, the contact map builder, the LAMMPS process runner and
//!   progress reporting.
//!
//! - **[`workflows`]: The Public API.** Chains the engine stages into a complete run:
//!   metadata, extraction, input deck, simulation, trajectory, outputs.

pub mod core;
pub mod engine;
pub mod workflows;
