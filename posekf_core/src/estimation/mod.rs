// posekf_core/src/estimation/mod.rs

//! Filter-side machinery: how covariances are represented and the filters
//! that consume linearized measurement models.

pub mod covariance;
pub mod filters;
