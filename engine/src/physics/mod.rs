//! Physics module
//!
//! The physics collaborator as seen by the structural engine.
//!
//! # Unit System
//!
//! **1 unit = 1 meter** (SI units throughout)
//!
//! # Submodules
//!
//! - [`types`] - Math re-exports, body handles and bond notifications
//! - [`bodies`] - The [`BodyService`] trait and the headless [`BondWorld`]
//! - [`collision`] - Rays and ray-AABB intersection

pub mod bodies;
pub mod collision;
pub mod types;

pub use bodies::{BodyService, BondWorld, GRAVITY};
pub use collision::{Ray, aabb_surface_normal, ray_aabb_intersect};
pub use types::{BodyDesc, BodyHandle, BondSevered, Quat, Vec3};
