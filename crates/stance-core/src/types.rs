//! Small value types shared across the controller crates.

use std::ops::{Index, IndexMut, Range};

use crate::traits::KinematicTree;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// One side of a bilateral robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Both sides, in storage order.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    /// Single-letter key used in configuration documents.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Left => "l",
            Self::Right => "r",
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// SideArray
// ---------------------------------------------------------------------------

/// Fixed two-slot container indexed by [`Side`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SideArray<T>([T; 2]);

impl<T> SideArray<T> {
    pub const fn new(left: T, right: T) -> Self {
        Self([left, right])
    }

    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        Self::new(f(Side::Left), f(Side::Right))
    }

    /// Build from a fallible per-side constructor, stopping at the first error.
    pub fn try_from_fn<E>(mut f: impl FnMut(Side) -> Result<T, E>) -> Result<Self, E> {
        let left = f(Side::Left)?;
        let right = f(Side::Right)?;
        Ok(Self::new(left, right))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        Side::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<Side> for SideArray<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        &self.0[side.slot()]
    }
}

impl<T> IndexMut<Side> for SideArray<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        &mut self.0[side.slot()]
    }
}

// ---------------------------------------------------------------------------
// DofCounts
// ---------------------------------------------------------------------------

/// Degree-of-freedom counts every size invariant is expressed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DofCounts {
    /// Position-space dimension.
    pub nq: usize,
    /// Velocity-space dimension.
    pub nv: usize,
    /// Number of actuated joints.
    pub nu: usize,
}

impl DofCounts {
    pub const fn new(nq: usize, nv: usize, nu: usize) -> Self {
        Self { nq, nv, nu }
    }

    pub fn from_tree(tree: &impl KinematicTree) -> Self {
        Self {
            nq: tree.num_positions(),
            nv: tree.num_velocities(),
            nu: tree.actuators().len(),
        }
    }
}

// ---------------------------------------------------------------------------
// JointSpan
// ---------------------------------------------------------------------------

/// Where a joint's coordinates live in the position vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointSpan {
    pub position_start: usize,
    pub num_positions: usize,
}

impl JointSpan {
    pub const fn new(position_start: usize, num_positions: usize) -> Self {
        Self {
            position_start,
            num_positions,
        }
    }

    /// Contiguous position indices covered by this joint.
    pub const fn positions(&self) -> Range<usize> {
        self.position_start..self.position_start + self.num_positions
    }
}

// ---------------------------------------------------------------------------
// Actuator
// ---------------------------------------------------------------------------

/// A single actuator of the kinematic model.
#[derive(Debug, Clone, PartialEq)]
pub struct Actuator {
    /// Actuator name.
    pub name: String,
    /// Name of the joint driven by this actuator.
    pub joint: String,
    /// Name of the link moved by the driven joint.
    pub body: String,
    /// Lower effort limit (Nm or N).
    pub effort_limit_min: f64,
    /// Upper effort limit (Nm or N).
    pub effort_limit_max: f64,
}
