//! Rigid bodies and bonds
//!
//! The structural engine never integrates physics itself. It talks to a
//! [`BodyService`]: spawn and destroy block bodies, join two bodies with a
//! breakable bond, ask who a body is bonded to, and collect the bonds that
//! broke under load.
//!
//! [`BondWorld`] is the headless implementation used by the sandbox binary
//! and the tests. Bodies that belong to a vehicle are kinematic and stay where
//! they were spawned; released bodies fall under gravity until they settle on
//! the ground plane, like the collapse clusters of the voxel builder.

use std::collections::{HashMap, HashSet};

use glam::Vec3;

use super::types::{BodyDesc, BodyHandle, BondSevered};

/// Gravity acceleration (m/s²)
pub const GRAVITY: f32 = 9.81;

/// Physical body collaborator consumed by the structural engine.
pub trait BodyService {
    /// Create a kinematic body attached to a vehicle.
    fn spawn_body(&mut self, desc: BodyDesc) -> BodyHandle;

    /// Destroy a body and, silently, every bond it takes part in.
    fn despawn_body(&mut self, body: BodyHandle);

    /// Join two bodies. `strength` is the load the bond survives.
    /// Returns false if either body is unknown or the bond already exists.
    fn create_bond(&mut self, a: BodyHandle, b: BodyHandle, strength: f32) -> bool;

    /// Remove every bond of `body` without raising severed notifications.
    /// Returns the number of bonds removed.
    fn break_bonds(&mut self, body: BodyHandle) -> usize;

    /// Bodies currently bonded to `body`.
    fn bonded_peers(&self, body: BodyHandle) -> Vec<BodyHandle>;

    fn body_position(&self, body: BodyHandle) -> Option<Vec3>;

    /// Hand a body over to free rigid-body simulation.
    fn release_body(&mut self, body: BodyHandle);

    /// Bonds that broke under load since the last drain.
    fn drain_severed(&mut self) -> Vec<BondSevered>;
}

#[derive(Debug, Clone)]
struct RigidBody {
    position: Vec3,
    half_extents: Vec3,
    velocity: Vec3,
    free: bool,
    settled: bool,
}

#[derive(Debug, Clone, Copy)]
struct Bond {
    strength: f32,
}

fn bond_key(a: BodyHandle, b: BodyHandle) -> (BodyHandle, BodyHandle) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Headless body/bond bookkeeping.
#[derive(Debug, Default)]
pub struct BondWorld {
    next_id: u64,
    bodies: HashMap<BodyHandle, RigidBody>,
    bonds: HashMap<(BodyHandle, BodyHandle), Bond>,
    peers: HashMap<BodyHandle, HashSet<BodyHandle>>,
    severed: Vec<BondSevered>,
    /// Ground plane height for released bodies
    pub ground_level: f32,
}

impl BondWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    pub fn contains_body(&self, body: BodyHandle) -> bool {
        self.bodies.contains_key(&body)
    }

    pub fn is_bonded(&self, a: BodyHandle, b: BodyHandle) -> bool {
        self.bonds.contains_key(&bond_key(a, b))
    }

    /// True once a body has been handed to free simulation.
    pub fn is_free(&self, body: BodyHandle) -> bool {
        self.bodies.get(&body).is_some_and(|b| b.free)
    }

    pub fn body_half_extents(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&body).map(|b| b.half_extents)
    }

    /// Break a bond as if it had been torn apart by a force.
    ///
    /// Queues a [`BondSevered`] notification. Returns false if no such bond.
    pub fn sever_bond(&mut self, a: BodyHandle, b: BodyHandle) -> bool {
        if !self.remove_bond(a, b) {
            return false;
        }
        log::debug!("[BondWorld] bond {a} <-> {b} severed");
        self.severed.push(BondSevered { a, b });
        true
    }

    /// Apply a load to a bond, severing it if the load exceeds its strength.
    ///
    /// Returns true if the bond broke.
    pub fn apply_bond_load(&mut self, a: BodyHandle, b: BodyHandle, force: f32) -> bool {
        let Some(bond) = self.bonds.get(&bond_key(a, b)).copied() else {
            return false;
        };
        if force <= bond.strength {
            return false;
        }
        self.sever_bond(a, b)
    }

    /// Integrate released bodies. Vehicle bodies are left untouched.
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let ground = self.ground_level;
        for body in self.bodies.values_mut() {
            if !body.free || body.settled {
                continue;
            }
            body.velocity.y -= GRAVITY * dt;
            body.position += body.velocity * dt;

            let bottom = body.position.y - body.half_extents.y;
            if bottom <= ground {
                body.position.y = ground + body.half_extents.y;
                body.velocity = Vec3::ZERO;
                body.settled = true;
            }
        }
    }

    fn remove_bond(&mut self, a: BodyHandle, b: BodyHandle) -> bool {
        if self.bonds.remove(&bond_key(a, b)).is_none() {
            return false;
        }
        if let Some(set) = self.peers.get_mut(&a) {
            set.remove(&b);
        }
        if let Some(set) = self.peers.get_mut(&b) {
            set.remove(&a);
        }
        true
    }
}

impl BodyService for BondWorld {
    fn spawn_body(&mut self, desc: BodyDesc) -> BodyHandle {
        self.next_id += 1;
        let handle = BodyHandle(self.next_id);
        self.bodies.insert(
            handle,
            RigidBody {
                position: desc.position,
                half_extents: desc.half_extents,
                velocity: Vec3::ZERO,
                free: false,
                settled: false,
            },
        );
        handle
    }

    fn despawn_body(&mut self, body: BodyHandle) {
        self.break_bonds(body);
        self.peers.remove(&body);
        self.bodies.remove(&body);
    }

    fn create_bond(&mut self, a: BodyHandle, b: BodyHandle, strength: f32) -> bool {
        if a == b || !self.bodies.contains_key(&a) || !self.bodies.contains_key(&b) {
            return false;
        }
        let key = bond_key(a, b);
        if self.bonds.contains_key(&key) {
            return false;
        }
        self.bonds.insert(key, Bond { strength });
        self.peers.entry(a).or_default().insert(b);
        self.peers.entry(b).or_default().insert(a);
        true
    }

    fn break_bonds(&mut self, body: BodyHandle) -> usize {
        let peers: Vec<BodyHandle> = self
            .peers
            .get(&body)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        peers
            .into_iter()
            .filter(|peer| self.remove_bond(body, *peer))
            .count()
    }

    fn bonded_peers(&self, body: BodyHandle) -> Vec<BodyHandle> {
        let mut out: Vec<BodyHandle> = self
            .peers
            .get(&body)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    fn body_position(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&body).map(|b| b.position)
    }

    fn release_body(&mut self, body: BodyHandle) {
        if let Some(b) = self.bodies.get_mut(&body) {
            b.free = true;
            b.settled = false;
        }
    }

    fn drain_severed(&mut self) -> Vec<BondSevered> {
        std::mem::take(&mut self.severed)
    }
}
