// vbot_core/src/channels.rs

pub mod layout;

use std::fmt;

/// Which of the three tracked ellipse points a channel follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocalPoint {
    First,
    Second,
    /// Midpoint of the two foci (the ellipse center).
    Mid,
}

/// Every scalar quantity the estimator bank can filter.
///
/// Each channel holds its own `[position, velocity, acceleration]` Singer
/// state; the identifier only says what the "position" is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelId {
    // --- Ellipse geometry ---
    FocalX(FocalPoint),
    FocalY(FocalPoint),
    /// Semi-major axis length `a`.
    MajorAxis,
    // --- Image-space bounding area ---
    /// Diagonal of the bounding box (`S`).
    Size,
    /// Distance of the bounding box from the frame centre (`C`).
    Offset,
    /// Camera altitude (`Z`).
    Altitude,
}

impl ChannelId {
    /// Short stable name used in logs and summaries.
    pub fn name(&self) -> &'static str {
        match self {
            ChannelId::FocalX(FocalPoint::First) => "fp1.x",
            ChannelId::FocalY(FocalPoint::First) => "fp1.y",
            ChannelId::FocalX(FocalPoint::Second) => "fp2.x",
            ChannelId::FocalY(FocalPoint::Second) => "fp2.y",
            ChannelId::FocalX(FocalPoint::Mid) => "mid.x",
            ChannelId::FocalY(FocalPoint::Mid) => "mid.y",
            ChannelId::MajorAxis => "a",
            ChannelId::Size => "S",
            ChannelId::Offset => "C",
            ChannelId::Altitude => "Z",
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
