//! Command line arguments.
use anyhow::{Context, Result};
use clap::Parser;
use real2sim_core::{
    kwargs::BuildKwargs, runtime::RuntimeConfig, EnvConfig, GridConfig, OnEpisodeError,
    PolicyModel, RangeTuple, SweepConfig, TaskFamily,
};
use std::path::PathBuf;

/// Evaluates a robot manipulation policy on a grid of initial conditions in
/// a real-to-sim environment.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Args {
    /// Policy model
    #[arg(long, default_value = "rt1", value_parser = ["rt1", "octo-base", "octo-small"])]
    pub policy_model: String,

    /// Checkpoint of the policy
    #[arg(long, required_unless_present = "config")]
    pub ckpt_path: Option<String>,

    /// Name of the environment
    #[arg(long, required_unless_present = "config")]
    pub env_name: Option<String>,

    /// Name of the scene
    #[arg(long, default_value = "google_pick_coke_can_1_v4")]
    pub scene_name: String,

    /// Robot
    #[arg(long, default_value = "google_robot_static")]
    pub robot: String,

    /// Controller of the robot; the default controller of the robot if not given
    #[arg(long)]
    pub control_mode: Option<String>,

    /// Index of the GPU
    #[arg(long, default_value_t = 0)]
    pub gpu_id: usize,

    /// Memory limit of TensorFlow in MiB, applied to RT-1
    #[arg(long, default_value_t = 4096)]
    pub tf_memory_limit_mb: usize,

    /// Scale of actions
    #[arg(long, default_value_t = 1.0)]
    pub action_scale: f64,

    /// Control frequency
    #[arg(long, default_value_t = 3)]
    pub control_freq: usize,

    /// Simulation frequency
    #[arg(long, default_value_t = 513)]
    pub sim_freq: usize,

    /// Maximum number of steps in an episode
    #[arg(long, default_value_t = 80)]
    pub max_episode_steps: usize,

    /// Background image composited into renders
    #[arg(long)]
    pub rgb_overlay_path: Option<PathBuf>,

    /// Task instruction replacing the one of the environment
    #[arg(long)]
    pub instruction: Option<String>,

    /// [xmin, xmax, num]
    #[arg(long, num_args = 3, allow_negative_numbers = true, default_values_t = [0.35, 0.35, 1.0])]
    pub robot_init_x_range: Vec<f64>,

    /// [ymin, ymax, num]
    #[arg(long, num_args = 3, allow_negative_numbers = true, default_values_t = [0.20, 0.20, 1.0])]
    pub robot_init_y_range: Vec<f64>,

    /// [w, x, y, z]
    #[arg(long, num_args = 4, allow_negative_numbers = true, default_values_t = [1.0, 0.0, 0.0, 0.0])]
    pub robot_init_rot_quat_center: Vec<f64>,

    /// [rmin, rmax, rnum, pmin, pmax, pnum, ymin, ymax, ynum]
    #[arg(
        long,
        num_args = 9,
        allow_negative_numbers = true,
        default_values_t = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]
    )]
    pub robot_init_rot_rpy_range: Vec<f64>,

    /// [xmin, xmax, num]
    #[arg(long, num_args = 3, allow_negative_numbers = true, default_values_t = [-0.35, -0.12, 5.0])]
    pub obj_init_x_range: Vec<f64>,

    /// [ymin, ymax, num]
    #[arg(long, num_args = 3, allow_negative_numbers = true, default_values_t = [-0.02, 0.42, 5.0])]
    pub obj_init_y_range: Vec<f64>,

    /// Additional env build kwargs in xxx=yyy format. If the value is a list,
    /// it should be like key="[a,b]" or key=a,b. Nested list/tuple values are
    /// allowed, e.g. key="[(a,b),(c,d)]". No white space is allowed.
    #[arg(long, num_args = 1..)]
    pub additional_env_build_kwargs: Vec<String>,

    /// Task family: grasp, move_near, drawer or other; inferred from the env name if not given
    #[arg(long)]
    pub task_family: Option<String>,

    /// Save results under results_tmp
    #[arg(long, default_value_t = false)]
    pub tmp_exp: bool,

    /// What to do when an episode fails: abort or skip
    #[arg(long, default_value = "abort")]
    pub on_episode_error: String,

    /// Directory under which results are saved
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Save frames as PNG files instead of encoding videos with mediapy
    #[arg(long, default_value_t = false)]
    pub png_frames: bool,

    /// Load the sweep configuration from a YAML file, ignoring the other options
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Save the sweep configuration to a YAML file
    #[arg(long)]
    pub save_config: Option<PathBuf>,
}

impl Args {
    /// Grid of initial conditions.
    pub fn grid_config(&self) -> Result<GridConfig> {
        let q = &self.robot_init_rot_quat_center;
        Ok(GridConfig::default()
            .robot_init_x(RangeTuple::from_slice("robot_init_x_range", &self.robot_init_x_range)?)
            .robot_init_y(RangeTuple::from_slice("robot_init_y_range", &self.robot_init_y_range)?)
            .robot_init_rot_rpy_from_slice(&self.robot_init_rot_rpy_range)?
            .robot_init_rot_quat_center([q[0], q[1], q[2], q[3]])
            .obj_init_x(RangeTuple::from_slice("obj_init_x_range", &self.obj_init_x_range)?)
            .obj_init_y(RangeTuple::from_slice("obj_init_y_range", &self.obj_init_y_range)?))
    }

    /// Environment built for every episode.
    pub fn env_config(&self) -> Result<EnvConfig> {
        let env_name = self.env_name.as_deref().context("--env-name is required")?;
        Ok(EnvConfig::default()
            .env_name(env_name)
            .robot(&self.robot)
            .sim_freq(self.sim_freq)
            .control_mode(self.control_mode.clone().unwrap_or_default())
            .control_freq(self.control_freq)
            .max_episode_steps(self.max_episode_steps)
            .scene_name(&self.scene_name)
            .rgb_overlay_path(self.rgb_overlay_path.as_ref())
            .instruction(self.instruction.clone())
            .additional_kwargs(BuildKwargs::parse(&self.additional_env_build_kwargs[..])?))
    }

    /// Configuration of the sweep.
    pub fn sweep_config(&self) -> Result<SweepConfig> {
        let ckpt_path = self.ckpt_path.as_deref().context("--ckpt-path is required")?;
        let task_family = match self.task_family.as_deref() {
            Some(family) => Some(family.parse::<TaskFamily>()?),
            None => None,
        };

        Ok(SweepConfig::default()
            .grid(self.grid_config()?)
            .env(self.env_config()?)
            .policy_model(self.policy_model.parse::<PolicyModel>()?)
            .ckpt_path(ckpt_path)
            .action_scale(self.action_scale)
            .task_family(task_family)
            .tmp_exp(self.tmp_exp)
            .on_episode_error(self.on_episode_error.parse::<OnEpisodeError>()?)
            .output_dir(&self.output_dir)
            .runtime(
                RuntimeConfig::default()
                    .gpu_id(self.gpu_id)
                    .tf_memory_limit_mb(Some(self.tf_memory_limit_mb)),
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use real2sim_core::kwargs::KwargValue;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("real2sim").chain(args.iter().cloned())).unwrap()
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let args = parse(&[
            "--ckpt-path",
            "/ckpts/rt_1_x_tf_trained_for_002272480_step/",
            "--env-name",
            "GraspSingleOpenedCokeCanInScene-v0",
        ]);
        let config = args.sweep_config()?;

        assert_eq!(config.policy_model, PolicyModel::Rt1);
        assert_eq!(config.grid, GridConfig::default());
        assert_eq!(config.env.scene_name, "google_pick_coke_can_1_v4");
        assert_eq!(config.env.max_episode_steps, 80);
        assert_eq!(config.env.control_mode, "");
        assert_eq!(config.on_episode_error, OnEpisodeError::Abort);
        assert_eq!(config.resolved_task_family(), TaskFamily::Grasp);
        assert_eq!(config.runtime.tf_memory_limit_mb, Some(4096));
        Ok(())
    }

    #[test]
    fn test_ranges_and_kwargs() -> Result<()> {
        let args = parse(&[
            "--policy-model",
            "octo-small",
            "--ckpt-path",
            "None",
            "--env-name",
            "MoveNearGoogleBakedTexInScene-v0",
            "--robot-init-x-range",
            "0.35",
            "0.35",
            "1",
            "--robot-init-rot-rpy-range",
            "0",
            "0",
            "1",
            "0",
            "0",
            "1",
            "-0.09",
            "-0.09",
            "1",
            "--obj-init-x-range",
            "-0.35",
            "-0.12",
            "3",
            "--additional-env-build-kwargs",
            "urdf_version=recolor_tabletop_visual_matching_1",
            "lr_switch=True",
            "--on-episode-error",
            "skip",
        ]);
        let config = args.sweep_config()?;

        assert_eq!(config.policy_model, PolicyModel::OctoSmall);
        assert_eq!(config.grid.obj_init_x, RangeTuple::new(-0.35, -0.12, 3));
        assert_eq!(config.grid.robot_init_rot_rpy[2], RangeTuple::new(-0.09, -0.09, 1));
        assert_eq!(
            config.env.additional_kwargs.get("lr_switch"),
            Some(&KwargValue::Bool(true))
        );
        assert_eq!(config.on_episode_error, OnEpisodeError::Skip);
        assert_eq!(config.resolved_task_family(), TaskFamily::MoveNear);
        Ok(())
    }

    #[test]
    fn test_invalid_values() {
        assert!(Args::try_parse_from(["real2sim", "--policy-model", "rt2", "--ckpt-path", "x", "--env-name", "y"]).is_err());
        assert!(Args::try_parse_from(["real2sim", "--obj-init-x-range", "0", "1"]).is_err());

        let args = parse(&["--ckpt-path", "x", "--env-name", "y", "--additional-env-build-kwargs", "novalue"]);
        assert!(args.sweep_config().is_err());
        let args = parse(&["--ckpt-path", "x", "--env-name", "y", "--task-family", "pour"]);
        assert!(args.sweep_config().is_err());
    }

    #[test]
    fn test_config_file_replaces_required_options() {
        let args = parse(&["--config", "sweep.yaml"]);
        assert_eq!(args.config, Some(PathBuf::from("sweep.yaml")));
        assert!(args.sweep_config().is_err());
    }
}
