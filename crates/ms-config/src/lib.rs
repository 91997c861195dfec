//! # ms-config
//!
//! Baseline configuration assembly for the malaria sweep planner.
//!
//! The baseline is built by a fixed-order pipeline of pure overlay steps:
//! template instantiation, serialization, reporting, climate, vector species
//! and habitat, event recording, then the optional IRS and treatment-seeking
//! interventions. The same intervention builders are reused when a sweep's
//! modification sets are materialized into per-run configurations.

pub mod assembler;
pub mod defaults;
pub mod interventions;
pub mod materialize;
pub mod overlays;
pub mod pipeline;

pub use assembler::{assemble_baseline, build_pipeline, AssemblyInputs, Baseline, DAYS_PER_YEAR};
pub use defaults::{from_defaults, species_defaults, MALARIA_SIM};
pub use interventions::{add_health_seeking, add_irs, add_itn_age_season, irs_summary};
pub use materialize::materialize;
pub use overlays::intervention_overlay;
pub use pipeline::{ConfigPipeline, FnOverlay, Overlay};
