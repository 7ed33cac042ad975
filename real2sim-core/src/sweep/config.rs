//! Configuration of [`Sweep`](super::Sweep).
use crate::{
    artifact::DEFAULT_FPS,
    base::{load_yaml, save_yaml},
    error::Real2SimError,
    runtime::RuntimeConfig,
    EnvConfig, GridConfig, PolicyModel, TaskFamily,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

/// What the sweep does when an episode fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnEpisodeError {
    /// Stop the sweep and return the error.
    Abort,

    /// Log the error and go on with the next episode. No artifact is written for
    /// the failed episode.
    Skip,
}

impl Default for OnEpisodeError {
    fn default() -> Self {
        OnEpisodeError::Abort
    }
}

impl fmt::Display for OnEpisodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnEpisodeError::Abort => f.write_str("abort"),
            OnEpisodeError::Skip => f.write_str("skip"),
        }
    }
}

impl FromStr for OnEpisodeError {
    type Err = Real2SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(OnEpisodeError::Abort),
            "skip" => Ok(OnEpisodeError::Skip),
            _ => Err(Real2SimError::UnknownErrorPolicy(s.to_string())),
        }
    }
}

/// Configuration of [`Sweep`](super::Sweep).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Ranges of the initial conditions.
    pub grid: GridConfig,

    /// Environment built for every episode.
    pub env: EnvConfig,

    /// Policy evaluated in the sweep.
    pub policy_model: PolicyModel,

    /// Checkpoint of the policy.
    pub ckpt_path: String,

    /// Scale applied to the actions of the policy.
    pub action_scale: f64,

    /// Task family. Inferred from the name of the environment if `None`.
    pub task_family: Option<TaskFamily>,

    /// Writes artifacts under `results_tmp` instead of `results`.
    pub tmp_exp: bool,

    /// What to do when an episode fails.
    pub on_episode_error: OnEpisodeError,

    /// Frame rate of the videos.
    pub video_fps: f64,

    /// Directory under which `results` or `results_tmp` is created.
    pub output_dir: PathBuf,

    /// Settings of the inference runtime.
    pub runtime: RuntimeConfig,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            env: EnvConfig::default(),
            policy_model: PolicyModel::default(),
            ckpt_path: String::new(),
            action_scale: 1.0,
            task_family: None,
            tmp_exp: false,
            on_episode_error: OnEpisodeError::default(),
            video_fps: DEFAULT_FPS,
            output_dir: PathBuf::from("."),
            runtime: RuntimeConfig::default(),
        }
    }
}

impl SweepConfig {
    /// Sets the grid.
    pub fn grid(mut self, v: GridConfig) -> Self {
        self.grid = v;
        self
    }

    /// Sets the environment.
    pub fn env(mut self, v: EnvConfig) -> Self {
        self.env = v;
        self
    }

    /// Sets the policy.
    pub fn policy_model(mut self, v: PolicyModel) -> Self {
        self.policy_model = v;
        self
    }

    /// Sets the checkpoint of the policy.
    pub fn ckpt_path(mut self, v: impl Into<String>) -> Self {
        self.ckpt_path = v.into();
        self
    }

    /// Sets the action scale.
    pub fn action_scale(mut self, v: f64) -> Self {
        self.action_scale = v;
        self
    }

    /// Sets the task family.
    pub fn task_family(mut self, v: Option<TaskFamily>) -> Self {
        self.task_family = v;
        self
    }

    /// Sets the temporary experiment flag.
    pub fn tmp_exp(mut self, v: bool) -> Self {
        self.tmp_exp = v;
        self
    }

    /// Sets what to do when an episode fails.
    pub fn on_episode_error(mut self, v: OnEpisodeError) -> Self {
        self.on_episode_error = v;
        self
    }

    /// Sets the frame rate of the videos.
    pub fn video_fps(mut self, v: f64) -> Self {
        self.video_fps = v;
        self
    }

    /// Sets the output directory.
    pub fn output_dir(mut self, v: impl AsRef<Path>) -> Self {
        self.output_dir = v.as_ref().to_path_buf();
        self
    }

    /// Sets the runtime settings.
    pub fn runtime(mut self, v: RuntimeConfig) -> Self {
        self.runtime = v;
        self
    }

    /// The task family, given or inferred from the name of the environment.
    pub fn resolved_task_family(&self) -> TaskFamily {
        self.task_family
            .unwrap_or_else(|| TaskFamily::infer(&self.env.env_name))
    }

    /// Constructs [`SweepConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        load_yaml(path)
    }

    /// Saves [`SweepConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        save_yaml(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{kwargs::BuildKwargs, RangeTuple};
    use tempdir::TempDir;

    #[test]
    fn test_on_episode_error_from_str() {
        assert_eq!("skip".parse::<OnEpisodeError>().unwrap(), OnEpisodeError::Skip);
        assert_eq!("abort".parse::<OnEpisodeError>().unwrap(), OnEpisodeError::Abort);
        assert!("retry".parse::<OnEpisodeError>().is_err());
        assert_eq!(OnEpisodeError::default(), OnEpisodeError::Abort);
    }

    #[test]
    fn test_resolved_task_family() {
        let config = SweepConfig::default().env(EnvConfig::default().env_name("MoveNearGoogleInScene-v0"));
        assert_eq!(config.resolved_task_family(), TaskFamily::MoveNear);
        let config = config.task_family(Some(TaskFamily::Other));
        assert_eq!(config.resolved_task_family(), TaskFamily::Other);
    }

    #[test]
    fn test_serde_sweep_config() -> Result<()> {
        let config = SweepConfig::default()
            .grid(GridConfig::default().obj_init_x(RangeTuple::new(-0.3, -0.1, 3)))
            .env(
                EnvConfig::default()
                    .env_name("OpenDrawerCustomInScene-v0")
                    .rgb_overlay_path(Some("data/open_drawer_a0.png"))
                    .additional_kwargs(BuildKwargs::parse(&["station_name=mk_station"])?),
            )
            .policy_model(PolicyModel::OctoSmall)
            .ckpt_path("None")
            .task_family(Some(TaskFamily::Drawer))
            .on_episode_error(OnEpisodeError::Skip)
            .runtime(RuntimeConfig::default().gpu_id(1).tf_memory_limit_mb(None));

        let dir = TempDir::new("sweep_config")?;
        let path = dir.path().join("sweep.yaml");
        config.save(&path)?;
        let config_ = SweepConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
