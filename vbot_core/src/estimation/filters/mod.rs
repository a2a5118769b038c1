// vbot_core/src/estimation/filters/mod.rs
pub mod kalman;

pub use kalman::{
    kf_predict, kf_update, predict_correct, ChannelConfig, FilterState, ScalarKalmanChannel,
};
