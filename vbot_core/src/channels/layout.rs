// vbot_core/src/channels/layout.rs
use crate::channels::{ChannelId, FocalPoint};
use crate::types::Vec2;

/// Number of channels in the focal-point layout.
pub const FOCAL_LAYOUT_DIM: usize = 7;

/// Returns the channel layout used to track an enclosing ellipse.
///
/// The layout is composed of:
/// - First focal point (x, y)
/// - Second focal point (x, y)
/// - Focal midpoint (x, y)
/// - Semi-major axis length
///
/// # Arguments
/// * `initial_velocity`: Seed velocity of the point channels, in the world frame.
///   The axis channel always starts at rest.
pub fn focal_pair_layout(initial_velocity: Vec2) -> Vec<(ChannelId, f64)> {
    let (vx, vy) = (initial_velocity.x, initial_velocity.y);
    vec![
        // --- First focal point --- indices 0-1
        (ChannelId::FocalX(FocalPoint::First), vx),
        (ChannelId::FocalY(FocalPoint::First), vy),
        // --- Second focal point --- indices 2-3
        (ChannelId::FocalX(FocalPoint::Second), vx),
        (ChannelId::FocalY(FocalPoint::Second), vy),
        // --- Midpoint --- indices 4-5
        (ChannelId::FocalX(FocalPoint::Mid), vx),
        (ChannelId::FocalY(FocalPoint::Mid), vy),
        // --- Shape --- index 6
        (ChannelId::MajorAxis, 0.0),
    ]
}

/// Returns the `[S, C, Z]` layout of the bounding-area estimator. All channels start at rest.
pub fn vertical_layout() -> Vec<(ChannelId, f64)> {
    vec![
        (ChannelId::Size, 0.0),
        (ChannelId::Offset, 0.0),
        (ChannelId::Altitude, 0.0),
    ]
}
