//! Grid of initial conditions of a sweep.
mod config;
use crate::error::Real2SimError;
pub use config::{GridConfig, RangeTuple};
use itertools::iproduct;
use nalgebra::{Quaternion, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// Initial robot and object poses of an episode.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitialCondition {
    /// Robot base x.
    pub robot_x: f64,

    /// Robot base y.
    pub robot_y: f64,

    /// Robot base orientation, `[w, x, y, z]`.
    pub robot_orientation: [f64; 4],

    /// Object x.
    pub object_x: f64,

    /// Object y.
    pub object_y: f64,
}

/// Composes `euler(roll, pitch, yaw) * center`.
///
/// Euler angles are about static x, y and z axes, applied in that order.
pub fn compose_orientation(roll: f64, pitch: f64, yaw: f64, center: [f64; 4]) -> [f64; 4] {
    let q = UnitQuaternion::from_euler_angles(roll, pitch, yaw).into_inner();
    let c = Quaternion::new(center[0], center[1], center[2], center[3]);
    let r = q * c;
    [r.w, r.i, r.j, r.k]
}

/// The Cartesian product of the expanded ranges.
///
/// Iteration order is fixed: robot x, robot y, orientation, object x and object y,
/// with object y varying fastest. Orientations are ordered by roll, pitch, then yaw.
#[derive(Clone, Debug, PartialEq)]
pub struct InitialConditionGrid {
    robot_xs: Vec<f64>,
    robot_ys: Vec<f64>,
    orientations: Vec<[f64; 4]>,
    object_xs: Vec<f64>,
    object_ys: Vec<f64>,
}

impl InitialConditionGrid {
    /// Expands the ranges of the configuration.
    pub fn new(config: &GridConfig) -> Result<Self, Real2SimError> {
        let [roll, pitch, yaw] = &config.robot_init_rot_rpy;
        let center = config.robot_init_rot_quat_center;
        let orientations = iproduct!(roll.linspace()?, pitch.linspace()?, yaw.linspace()?)
            .map(|(r, p, y)| compose_orientation(r, p, y, center))
            .collect();

        Ok(Self {
            robot_xs: config.robot_init_x.linspace()?,
            robot_ys: config.robot_init_y.linspace()?,
            orientations,
            object_xs: config.obj_init_x.linspace()?,
            object_ys: config.obj_init_y.linspace()?,
        })
    }

    /// The number of initial conditions.
    pub fn len(&self) -> usize {
        self.robot_xs.len()
            * self.robot_ys.len()
            * self.orientations.len()
            * self.object_xs.len()
            * self.object_ys.len()
    }

    /// Returns `true` if the grid has no point.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Robot orientations, in iteration order.
    pub fn orientations(&self) -> &[[f64; 4]] {
        &self.orientations
    }

    /// Iterates over the initial conditions.
    pub fn iter(&self) -> impl Iterator<Item = InitialCondition> + '_ {
        iproduct!(
            self.robot_xs.iter(),
            self.robot_ys.iter(),
            self.orientations.iter(),
            self.object_xs.iter(),
            self.object_ys.iter()
        )
        .map(|(&robot_x, &robot_y, &robot_orientation, &object_x, &object_y)| {
            InitialCondition {
                robot_x,
                robot_y,
                robot_orientation,
                object_x,
                object_y,
            }
        })
    }
}
