//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `pipeline.rs` — run/stats/tags command handling.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate business logic to `services/*` and `github`.
//! - Keep behavior and output schema stable.

pub mod pipeline;

pub use pipeline::handle_pipeline_commands;
