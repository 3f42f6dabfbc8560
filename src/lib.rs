//! # polidoc-pipeline
//!
//! A deterministic, contract-validated evaluation pipeline for municipal
//! policy documents. Eight numbered gates (phase 2 permanently reserved)
//! take a source document and a fixed 300-question questionnaire through
//! a four-level hierarchical aggregation — micro question, dimension,
//! policy area, cluster, macro — each wrapped in the same input/output
//! contract envelope and recorded into an append-only Manifest.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                        api (facade)                        │
//! ├────────────────────────────────────────────────────────────┤
//! │  core::pipeline          │ core::config │ core::model      │
//! │  • envelope              │ • Questionnaire                 │
//! │  • gates 0,1,3,4,5,6,7   │ • AggregationSettings            │
//! │  • manifest / rubric     │                                  │
//! ├────────────────────────────────────────────────────────────┤
//! │  collaborators: DocumentIngester, QuestionnaireLoader,      │
//! │  Scorer, SignalRegistry, ManifestSink                       │
//! ├────────────────────────────────────────────────────────────┤
//! │  io: manifest_writer                                        │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use polidoc_pipeline::api::PolidocEngine;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = PolidocEngine::new();
//!     let (manifest, macro_score) = engine.evaluate(std::path::Path::new("config.yaml")).await?;
//!     println!("overall status: {:?}", manifest.overall_status);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::suspicious)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::fn_params_excessive_bools)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

// Memory allocator selection (mutually exclusive)
#[cfg(all(feature = "mimalloc", not(feature = "jemalloc")))]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[cfg(all(feature = "jemalloc", not(feature = "mimalloc")))]
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

// Core domain types, math, and the gate pipeline.
pub mod core {
    //! Domain model, deterministic math, configuration, and the gate
    //! pipeline itself.

    pub mod aggregation_math;
    pub mod config;
    pub mod errors;
    pub mod identity;
    pub mod model;
    pub mod pipeline;
}

// External collaborator traits and their reference implementations.
pub mod collaborators;

// Public API facade.
pub mod api;

// I/O: manifest serialization.
pub mod io;

pub use api::PolidocEngine;
pub use core::errors::{PipelineError, Result};
pub use core::pipeline::{run, Manifest, RunInputs};

/// Library version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
