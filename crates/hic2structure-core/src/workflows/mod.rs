//! # Workflows Module
//!
//! High-level entry points that chain the engine stages into complete runs.
//!
//! - **Structure Workflow** ([`structure`]) - Hi-C header and contacts, LAMMPS input
//!   deck, simulation, and the structure / contact map outputs. The individual
//!   halves (`extract_contacts`, `write_deck`, `analyze_trajectory`) are exposed for
//!   front ends that only need part of the pipeline.

pub mod structure;
