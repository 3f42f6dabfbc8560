//! The eight numbered gates (spec §4). Phase 2 is permanently reserved
//! and has no module here; every other gate exposes the same
//! `Input` / `validate_input` / `execute` / `validate_output` /
//! `invariants` quad so it plugs directly into
//! [`super::envelope::run_gate`].

pub mod gate0_config;
pub mod gate1_grid;
pub mod gate3_router;
pub mod gate4_dimension;
pub mod gate5_area;
pub mod gate6_cluster;
pub mod gate7_macro;
