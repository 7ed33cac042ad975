//! Environment.
use super::{Observation, Step};
use crate::{kwargs::BuildKwargs, InitialCondition};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Represents a simulated manipulation scene.
pub trait Env {
    /// Builds an environment.
    fn build(config: &EnvConfig) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment to the given initial poses.
    ///
    /// Returns the first observation and the language description of the task.
    fn reset(&mut self, options: &ResetOptions) -> Result<(Observation, String)>;

    /// Performs an environment step with `world_vector ++ rot_axangle ++ gripper`.
    fn step(&mut self, act: &[f64; 7]) -> Result<Step>;

    /// Current closedness of the gripper.
    fn gripper_closedness(&self) -> Result<f64>;
}

/// Initial poses passed to [`Env::reset`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResetOptions {
    /// Initial object position on the table.
    pub obj_init_xy: [f64; 2],

    /// Initial robot base position.
    pub robot_init_xy: [f64; 2],

    /// Initial robot base orientation, `[w, x, y, z]`.
    pub robot_init_rot_quat: [f64; 4],
}

impl From<&InitialCondition> for ResetOptions {
    fn from(c: &InitialCondition) -> Self {
        Self {
            obj_init_xy: [c.object_x, c.object_y],
            robot_init_xy: [c.robot_x, c.robot_y],
            robot_init_rot_quat: c.robot_orientation,
        }
    }
}

/// Configuration used to build an environment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Name of the environment, e.g. `GraspSingleOpenedCokeCanInScene-v0`.
    pub env_name: String,

    /// Observation mode.
    pub obs_mode: String,

    /// Robot identifier.
    pub robot: String,

    /// Simulation frequency in Hz.
    pub sim_freq: usize,

    /// Controller of the robot. Empty means the default controller of the robot.
    pub control_mode: String,

    /// Control frequency in Hz.
    pub control_freq: usize,

    /// Step ceiling of an episode; reaching it truncates the episode.
    pub max_episode_steps: usize,

    /// Name of the scene.
    pub scene_name: String,

    /// Render segmentation masks along with RGB.
    pub add_segmentation: bool,

    /// Camera whose RGB image is fed to the policy.
    pub camera: String,

    /// Background image composited into renders.
    pub rgb_overlay_path: Option<PathBuf>,

    /// Task instruction replacing the one of the environment.
    pub instruction: Option<String>,

    /// Additional build arguments, forwarded as keyword arguments.
    pub additional_kwargs: BuildKwargs,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            env_name: String::new(),
            obs_mode: "rgbd".to_string(),
            robot: "google_robot_static".to_string(),
            sim_freq: 513,
            control_mode: String::new(),
            control_freq: 3,
            max_episode_steps: 80,
            scene_name: "google_pick_coke_can_1_v4".to_string(),
            add_segmentation: true,
            camera: "overhead_camera".to_string(),
            rgb_overlay_path: None,
            instruction: None,
            additional_kwargs: BuildKwargs::default(),
        }
    }
}

impl EnvConfig {
    /// Sets the name of the environment.
    pub fn env_name(mut self, v: impl Into<String>) -> Self {
        self.env_name = v.into();
        self
    }

    /// Sets the robot.
    pub fn robot(mut self, v: impl Into<String>) -> Self {
        self.robot = v.into();
        self
    }

    /// Sets the simulation frequency.
    pub fn sim_freq(mut self, v: usize) -> Self {
        self.sim_freq = v;
        self
    }

    /// Sets the control mode.
    pub fn control_mode(mut self, v: impl Into<String>) -> Self {
        self.control_mode = v.into();
        self
    }

    /// Sets the control frequency.
    pub fn control_freq(mut self, v: usize) -> Self {
        self.control_freq = v;
        self
    }

    /// Sets the step ceiling of an episode.
    pub fn max_episode_steps(mut self, v: usize) -> Self {
        self.max_episode_steps = v;
        self
    }

    /// Sets the scene.
    pub fn scene_name(mut self, v: impl Into<String>) -> Self {
        self.scene_name = v.into();
        self
    }

    /// Sets the camera fed to the policy.
    pub fn camera(mut self, v: impl Into<String>) -> Self {
        self.camera = v.into();
        self
    }

    /// Sets the overlay image.
    pub fn rgb_overlay_path(mut self, v: Option<impl AsRef<Path>>) -> Self {
        self.rgb_overlay_path = v.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Sets the task instruction.
    pub fn instruction(mut self, v: Option<String>) -> Self {
        self.instruction = v;
        self
    }

    /// Sets the additional build arguments.
    pub fn additional_kwargs(mut self, v: BuildKwargs) -> Self {
        self.additional_kwargs = v;
        self
    }
}
