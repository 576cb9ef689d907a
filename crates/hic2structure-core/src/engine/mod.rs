//! # Engine Module
//!
//! The stateful half of the pipeline: everything that needs configuration,
//! talks to a backend or spawns a process.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - `PipelineConfig` and its builder
//! - **Error Handling** ([`error`]) - `ValidationError` and the umbrella `PipelineError`
//! - **Extraction** ([`extract`]) - Request validation, the `ContactSource` backend
//!   seam and bin conversion / filtering
//! - **Contact Maps** ([`contact_map`]) - Distance-thresholded contacts of a simulated structure
//! - **Simulation** ([`lammps`]) - Running the LAMMPS executable on an input deck
//! - **Progress Monitoring** ([`progress`]) - Stage events for front ends

pub mod config;
pub mod contact_map;
pub mod error;
pub mod extract;
pub mod lammps;
pub mod progress;
