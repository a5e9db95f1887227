//! Lattice Grid Module
//!
//! Maps between a vehicle's integer block lattice and world space.
//!
//! Every vehicle owns a [`VehicleFrame`] anchored at its root (core) block.
//! Lattice coordinates are expressed in that frame, one cell per block:
//! - `(0, 0, 0)` is always the root cell
//! - `+Y` is the vehicle's local up axis
//! - 1 cell = `cell_size` meters (default 1.0)
//!
//! Orientations are snapped to the 24 axis-aligned rotations and stored as
//! integer matrices ([`LatticeRotation`]) so that rotating connection offsets
//! never accumulates floating point error.

use glam::{IVec3, Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

// ============================================================================
// LATTICE COORDINATE
// ============================================================================

/// Integer cell coordinate in a vehicle's local lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct LatticeCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl LatticeCoord {
    /// The root cell. Holds the vehicle's core block for its whole lifetime.
    pub const ORIGIN: Self = Self::new(0, 0, 0);

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn as_ivec3(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }

    pub fn is_origin(self) -> bool {
        self == Self::ORIGIN
    }

    /// Offset from `self` to `other`.
    pub fn offset_to(self, other: LatticeCoord) -> IVec3 {
        other.as_ivec3() - self.as_ivec3()
    }
}

impl From<IVec3> for LatticeCoord {
    fn from(value: IVec3) -> Self {
        Self::new(value.x, value.y, value.z)
    }
}

impl Add<IVec3> for LatticeCoord {
    type Output = LatticeCoord;

    fn add(self, rhs: IVec3) -> LatticeCoord {
        LatticeCoord::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub<IVec3> for LatticeCoord {
    type Output = LatticeCoord;

    fn sub(self, rhs: IVec3) -> LatticeCoord {
        LatticeCoord::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::fmt::Display for LatticeCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ============================================================================
// AXIS HELPERS
// ============================================================================

/// The six unit lattice directions.
pub const AXIS_DIRECTIONS: [IVec3; 6] = [
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
    IVec3::new(0, 1, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(0, 0, 1),
    IVec3::new(0, 0, -1),
];

/// Snap a direction to the nearest principal axis.
///
/// Ties resolve in X, Y, Z order. A zero vector snaps to zero.
pub fn snap_to_axis(v: Vec3) -> IVec3 {
    let a = v.abs();
    if a.max_element() <= f32::EPSILON {
        return IVec3::ZERO;
    }
    if a.x >= a.y && a.x >= a.z {
        IVec3::new(v.x.signum() as i32, 0, 0)
    } else if a.y >= a.z {
        IVec3::new(0, v.y.signum() as i32, 0)
    } else {
        IVec3::new(0, 0, v.z.signum() as i32)
    }
}

/// Nearest principal axis of `v` that is perpendicular to `exclude`.
fn snap_to_axis_excluding(v: Vec3, exclude: IVec3) -> IVec3 {
    let mut best = IVec3::ZERO;
    let mut best_dot = f32::MIN;
    for axis in AXIS_DIRECTIONS {
        if axis.dot(exclude) != 0 {
            continue;
        }
        let d = axis.as_vec3().dot(v);
        if d > best_dot {
            best_dot = d;
            best = axis;
        }
    }
    best
}

fn cross_i(a: IVec3, b: IVec3) -> IVec3 {
    IVec3::new(
        a.y * b.z - a.z * b.y,
        a.z * b.x - a.x * b.z,
        a.x * b.y - a.y * b.x,
    )
}

// ============================================================================
// LATTICE ROTATION
// ============================================================================

/// One of the 24 axis-aligned rotations, stored as an integer matrix.
///
/// Columns are the images of the local X, Y and Z axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LatticeRotation {
    cols: [IVec3; 3],
}

impl Default for LatticeRotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl LatticeRotation {
    pub const IDENTITY: Self = Self {
        cols: [IVec3::X, IVec3::Y, IVec3::Z],
    };

    /// Snap an arbitrary rotation to the nearest axis-aligned orientation.
    ///
    /// The X column picks the nearest axis, Y the nearest axis perpendicular
    /// to it, and Z completes a right-handed basis, so the result is always a
    /// proper rotation. Snapping an already snapped rotation is a no-op.
    pub fn from_quat(q: Quat) -> Self {
        let m = Mat3::from_quat(q.normalize());
        let x = snap_to_axis(m.x_axis);
        let x = if x == IVec3::ZERO { IVec3::X } else { x };
        let y = snap_to_axis_excluding(m.y_axis, x);
        let z = cross_i(x, y);
        Self { cols: [x, y, z] }
    }

    /// Rotation taking the axis direction `from` onto `to` along the shortest arc.
    ///
    /// Opposite directions produce a half turn about an axis chosen by glam.
    pub fn from_rotation_arc(from: IVec3, to: IVec3) -> Self {
        let from = from.as_vec3().normalize_or_zero();
        let to = to.as_vec3().normalize_or_zero();
        if from == Vec3::ZERO || to == Vec3::ZERO {
            return Self::IDENTITY;
        }
        Self::from_quat(Quat::from_rotation_arc(from, to))
    }

    /// `turns` quarter turns (counter-clockwise looking down the axis) about an axis direction.
    pub fn quarter_turns(axis: IVec3, turns: u8) -> Self {
        let axis = axis.as_vec3().normalize_or_zero();
        if axis == Vec3::ZERO {
            return Self::IDENTITY;
        }
        let angle = std::f32::consts::FRAC_PI_2 * (turns % 4) as f32;
        Self::from_quat(Quat::from_axis_angle(axis, angle))
    }

    /// Half turn about an axis direction.
    pub fn half_turn(axis: IVec3) -> Self {
        Self::quarter_turns(axis, 2)
    }

    pub fn to_mat3(self) -> Mat3 {
        Mat3::from_cols(
            self.cols[0].as_vec3(),
            self.cols[1].as_vec3(),
            self.cols[2].as_vec3(),
        )
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_mat3(&self.to_mat3())
    }

    /// Rotate an integer lattice offset.
    pub fn rotate(self, v: IVec3) -> IVec3 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z
    }

    /// Rotate a float direction.
    pub fn rotate_vec3(self, v: Vec3) -> Vec3 {
        self.to_mat3() * v
    }

    /// Inverse rotation (transpose for an orthonormal matrix).
    pub fn inverse(self) -> Self {
        let [x, y, z] = self.cols;
        Self {
            cols: [
                IVec3::new(x.x, y.x, z.x),
                IVec3::new(x.y, y.y, z.y),
                IVec3::new(x.z, y.z, z.z),
            ],
        }
    }

    /// `self * other`: apply `other` first, then `self`.
    pub fn compose(self, other: LatticeRotation) -> Self {
        Self {
            cols: [
                self.rotate(other.cols[0]),
                self.rotate(other.cols[1]),
                self.rotate(other.cols[2]),
            ],
        }
    }
}

impl Mul for LatticeRotation {
    type Output = LatticeRotation;

    fn mul(self, rhs: LatticeRotation) -> LatticeRotation {
        self.compose(rhs)
    }
}

// ============================================================================
// VEHICLE FRAME
// ============================================================================

/// World transform of a vehicle's root cell plus the lattice cell size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleFrame {
    /// World position of the root cell center
    pub position: Vec3,
    /// World rotation of the vehicle
    pub rotation: Quat,
    /// Edge length of one lattice cell (meters)
    pub cell_size: f32,
}

impl Default for VehicleFrame {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            cell_size: 1.0,
        }
    }
}

impl VehicleFrame {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Self::default()
        }
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Round a world-space point to the nearest lattice cell.
    pub fn world_to_local(&self, world: Vec3) -> LatticeCoord {
        let local = self.rotation.inverse() * (world - self.position) / self.cell_size;
        LatticeCoord::from(local.round().as_ivec3())
    }

    /// World-space center of a lattice cell.
    pub fn local_to_world(&self, coord: LatticeCoord) -> Vec3 {
        self.position + self.rotation * (coord.as_vec3() * self.cell_size)
    }

    /// World-space point into continuous lattice units (no rounding).
    pub fn world_point_to_lattice(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position) / self.cell_size
    }

    pub fn world_dir_to_local(&self, dir: Vec3) -> Vec3 {
        self.rotation.inverse() * dir
    }

    pub fn local_dir_to_world(&self, dir: Vec3) -> Vec3 {
        self.rotation * dir
    }

    /// Snap a world rotation to an orientation in this frame.
    pub fn world_rotation_to_local(&self, rotation: Quat) -> LatticeRotation {
        LatticeRotation::from_quat(self.rotation.inverse() * rotation)
    }

    pub fn local_rotation_to_world(&self, rotation: LatticeRotation) -> Quat {
        self.rotation * rotation.to_quat()
    }

    /// Lattice offset between two world points, rounded to whole cells.
    pub fn world_offset_to_lattice(&self, from: Vec3, to: Vec3) -> IVec3 {
        (self.rotation.inverse() * (to - from) / self.cell_size)
            .round()
            .as_ivec3()
    }
}

/// `WorldToLocal` using an explicit frame.
pub fn world_to_local(frame: &VehicleFrame, world: Vec3) -> LatticeCoord {
    frame.world_to_local(world)
}

/// `LocalToWorld` using an explicit frame.
pub fn local_to_world(frame: &VehicleFrame, coord: LatticeCoord) -> Vec3 {
    frame.local_to_world(coord)
}
