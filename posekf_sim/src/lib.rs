// posekf_sim/src/lib.rs

//! Headless scenario runner for `posekf_core`: drives a robot around a circle,
//! synthesizes antenna readings and feeds them through the pose EKF.

// This prelude is for convenience for other files WITHIN the posekf_sim crate.
pub mod prelude;

pub mod cli;
pub mod error;
// This module contains all the simulation-specific logic.
pub mod simulation;
pub mod telemetry;
