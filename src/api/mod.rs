//! Public-facing API: a thin facade over [`crate::core::pipeline::run`]
//! for callers who don't need to assemble their own [`crate::core::pipeline::RunInputs`].

pub mod engine;

pub use engine::PolidocEngine;
