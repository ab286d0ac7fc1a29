// posekf_core/src/lib.rs

// This file defines the public modules of the library.
pub mod config;
pub mod error;
pub mod estimation;
pub mod models;
pub mod prelude;
pub mod state;
pub mod types;
pub mod vectors;

// Re-exported so that `named_vector!` expands to paths that resolve in any crate.
pub use nalgebra;
