// posekf_sim/src/simulation/core/mod.rs

pub mod motion;
pub mod prng;
pub mod trajectory;
