// vbot_core/src/models/mod.rs

//! Process and measurement models shared by every filter channel.

pub mod position;
pub mod singer;

pub use position::{MeasurementNoise, PositionMeasurement};
pub use singer::{Discretization, SingerModel, SingerParams};
