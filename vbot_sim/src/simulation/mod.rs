// vbot_sim/src/simulation/mod.rs

pub mod config;
pub mod core;
pub mod runner;
pub mod tracker;
pub mod world;
