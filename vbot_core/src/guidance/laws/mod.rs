// vbot_core/src/guidance/laws/mod.rs
pub mod collision_cone;
pub mod focal_pair;

pub use collision_cone::CollisionConeLaw;
pub use focal_pair::FocalPairLaw;
