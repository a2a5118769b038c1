// vbot_core/src/lib.rs

// This file defines the public modules of the library.
pub mod channels;
pub mod error;
pub mod estimation;
pub mod geometry;
pub mod guidance;
pub mod messages;
pub mod models;
pub mod pipeline;
pub mod prelude;
pub mod types;
pub mod utils;
