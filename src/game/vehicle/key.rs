//! Vehicle identity keys
//!
//! A structure only needs an opaque, copyable identity for its owner. The
//! player's vehicle and every AI vehicle share the same structure code and
//! differ only in this key.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Opaque identity of the vehicle owning a structure.
pub trait VehicleId: Copy + Eq + Hash + Ord + Debug + Display {}

impl<T> VehicleId for T where T: Copy + Eq + Hash + Ord + Debug + Display {}

/// Default vehicle key: the player or a numbered AI controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VehicleKey {
    Player,
    Ai(u32),
}

impl Display for VehicleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VehicleKey::Player => f.write_str("player"),
            VehicleKey::Ai(id) => write!(f, "ai#{id}"),
        }
    }
}
