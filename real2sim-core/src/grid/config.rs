//! Configuration of [`InitialConditionGrid`](super::InitialConditionGrid).
use crate::{
    base::{load_yaml, save_yaml},
    error::Real2SimError,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A range `[min, max]` sampled at `num` evenly spaced points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RangeTuple {
    /// First point.
    pub min: f64,

    /// Last point.
    pub max: f64,

    /// Number of points.
    pub num: i64,
}

impl RangeTuple {
    /// Constructs a range.
    pub fn new(min: f64, max: f64, num: i64) -> Self {
        Self { min, max, num }
    }

    /// A range with the single point `v`.
    pub fn point(v: f64) -> Self {
        Self::new(v, v, 1)
    }

    /// Constructs a range from `[min, max, num]`.
    ///
    /// `num` is truncated toward zero, as command line values arrive as floats.
    pub fn from_slice(name: &str, v: &[f64]) -> Result<Self, Real2SimError> {
        if v.len() != 3 {
            return Err(Real2SimError::RangeArity {
                name: name.to_string(),
                expected: 3,
                actual: v.len(),
            });
        }
        Ok(Self::new(v[0], v[1], v[2] as i64))
    }

    /// Evenly spaced points, both ends included.
    ///
    /// A single point yields `min`. The last point is exactly `max`.
    pub fn linspace(&self) -> Result<Vec<f64>, Real2SimError> {
        if self.num <= 0 {
            return Err(Real2SimError::NonPositiveCount {
                min: self.min,
                max: self.max,
                num: self.num,
            });
        }
        if self.num == 1 {
            return Ok(vec![self.min]);
        }

        let n = self.num as usize;
        let step = (self.max - self.min) / (n - 1) as f64;
        let mut points: Vec<f64> = (0..n).map(|i| self.min + i as f64 * step).collect();
        points[n - 1] = self.max;
        Ok(points)
    }
}

/// Ranges of the initial conditions of a sweep.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Robot base x.
    pub robot_init_x: RangeTuple,

    /// Robot base y.
    pub robot_init_y: RangeTuple,

    /// Roll, pitch and yaw of the robot base, composed with the center rotation.
    pub robot_init_rot_rpy: [RangeTuple; 3],

    /// Center rotation of the robot base, `[w, x, y, z]`.
    pub robot_init_rot_quat_center: [f64; 4],

    /// Object x.
    pub obj_init_x: RangeTuple,

    /// Object y.
    pub obj_init_y: RangeTuple,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            robot_init_x: RangeTuple::point(0.35),
            robot_init_y: RangeTuple::point(0.20),
            robot_init_rot_rpy: [RangeTuple::point(0.0); 3],
            robot_init_rot_quat_center: [1.0, 0.0, 0.0, 0.0],
            obj_init_x: RangeTuple::new(-0.35, -0.12, 5),
            obj_init_y: RangeTuple::new(-0.02, 0.42, 5),
        }
    }
}

impl GridConfig {
    /// Sets the range of robot x.
    pub fn robot_init_x(mut self, v: RangeTuple) -> Self {
        self.robot_init_x = v;
        self
    }

    /// Sets the range of robot y.
    pub fn robot_init_y(mut self, v: RangeTuple) -> Self {
        self.robot_init_y = v;
        self
    }

    /// Sets the roll, pitch and yaw ranges.
    pub fn robot_init_rot_rpy(mut self, v: [RangeTuple; 3]) -> Self {
        self.robot_init_rot_rpy = v;
        self
    }

    /// Sets the roll, pitch and yaw ranges from
    /// `[rmin, rmax, rnum, pmin, pmax, pnum, ymin, ymax, ynum]`.
    pub fn robot_init_rot_rpy_from_slice(mut self, v: &[f64]) -> Result<Self, Real2SimError> {
        if v.len() != 9 {
            return Err(Real2SimError::RangeArity {
                name: "robot_init_rot_rpy".to_string(),
                expected: 9,
                actual: v.len(),
            });
        }
        self.robot_init_rot_rpy = [
            RangeTuple::from_slice("roll", &v[0..3])?,
            RangeTuple::from_slice("pitch", &v[3..6])?,
            RangeTuple::from_slice("yaw", &v[6..9])?,
        ];
        Ok(self)
    }

    /// Sets the center rotation, `[w, x, y, z]`.
    pub fn robot_init_rot_quat_center(mut self, v: [f64; 4]) -> Self {
        self.robot_init_rot_quat_center = v;
        self
    }

    /// Sets the range of object x.
    pub fn obj_init_x(mut self, v: RangeTuple) -> Self {
        self.obj_init_x = v;
        self
    }

    /// Sets the range of object y.
    pub fn obj_init_y(mut self, v: RangeTuple) -> Self {
        self.obj_init_y = v;
        self
    }

    /// Constructs [`GridConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_yaml(path)
    }

    /// Saves [`GridConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_yaml(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{} != {}", a, b);
    }

    #[test]
    fn test_linspace_endpoints_and_count() {
        for &(min, max, num) in &[(-0.35, -0.12, 5), (-0.02, 0.42, 5), (0.0, 1.0, 7), (2.0, -1.0, 4)] {
            let v = RangeTuple::new(min, max, num).linspace().unwrap();
            assert_eq!(v.len(), num as usize);
            assert_close(v[0], min);
            assert_close(v[v.len() - 1], max);
            for w in v.windows(2) {
                if min < max {
                    assert!(w[0] < w[1]);
                } else {
                    assert!(w[0] > w[1]);
                }
            }
        }
    }

    #[test]
    fn test_linspace_single_point_is_min() {
        assert_eq!(RangeTuple::new(0.35, 0.9, 1).linspace().unwrap(), vec![0.35]);
    }

    #[test]
    fn test_linspace_constant_range() {
        let v = RangeTuple::new(0.2, 0.2, 3).linspace().unwrap();
        assert_eq!(v, vec![0.2, 0.2, 0.2]);
    }

    #[test]
    fn test_linspace_rejects_non_positive_count() {
        assert!(matches!(
            RangeTuple::new(0.0, 1.0, 0).linspace(),
            Err(Real2SimError::NonPositiveCount { .. })
        ));
        assert!(RangeTuple::new(0.0, 1.0, -3).linspace().is_err());
    }

    #[test]
    fn test_linspace_matches_numpy() {
        let v = RangeTuple::new(-0.35, -0.12, 5).linspace().unwrap();
        let expected = [-0.35, -0.2925, -0.235, -0.1775, -0.12];
        for (a, b) in v.iter().zip(expected.iter()) {
            assert_close(*a, *b);
        }
    }

    #[test]
    fn test_from_slice_arity() {
        assert_eq!(
            RangeTuple::from_slice("x", &[0.0, 1.0, 5.0]).unwrap(),
            RangeTuple::new(0.0, 1.0, 5)
        );
        assert!(matches!(
            RangeTuple::from_slice("x", &[0.0, 1.0]),
            Err(Real2SimError::RangeArity { expected: 3, actual: 2, .. })
        ));
        assert!(GridConfig::default()
            .robot_init_rot_rpy_from_slice(&[0.0, 0.0, 1.0])
            .is_err());
    }

    #[test]
    fn test_serde_grid_config() -> Result<()> {
        let config = GridConfig::default()
            .robot_init_x(RangeTuple::new(0.30, 0.40, 3))
            .robot_init_rot_rpy_from_slice(&[0.0, 0.0, 1.0, 0.0, 0.0, 1.0, -0.1, 0.1, 3.0])?;

        let dir = TempDir::new("grid_config")?;
        let path = dir.path().join("grid_config.yaml");
        config.save(&path)?;
        let config_ = GridConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
