//! Evaluation sweep over a grid of initial conditions.
mod config;
use crate::{
    artifact::{save_episode, ArtifactNamer, VideoWriter},
    error::Real2SimError,
    rollout::rollout,
    Env, InitialCondition, InitialConditionGrid, Outcome, Policy, TaskFamily,
};
use anyhow::{Context, Result};
pub use config::{OnEpisodeError, SweepConfig};
use log::{info, warn};
use std::path::PathBuf;

/// How an episode of a sweep ended.
#[derive(Clone, Debug, PartialEq)]
pub enum EpisodeStatus {
    /// The episode ran to the end and its artifacts were saved.
    Finished {
        /// Outcome of the episode.
        outcome: Outcome,
        /// The number of environment steps.
        steps: usize,
        /// Path of the video.
        video: PathBuf,
    },

    /// The episode failed and was skipped.
    Skipped {
        /// Description of the failure.
        error: String,
    },
}

/// An episode of a sweep.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeRecord {
    /// Index of the episode in the sweep.
    pub index: usize,

    /// Initial condition of the episode.
    pub condition: InitialCondition,

    /// How the episode ended.
    pub status: EpisodeStatus,
}

/// Episodes of a sweep, in grid order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SweepReport {
    /// Episodes.
    pub episodes: Vec<EpisodeRecord>,
}

impl SweepReport {
    fn count(&self, f: impl Fn(&EpisodeStatus) -> bool) -> usize {
        self.episodes.iter().filter(|e| f(&e.status)).count()
    }

    /// The number of successful episodes.
    pub fn n_success(&self) -> usize {
        self.count(|s| matches!(s, EpisodeStatus::Finished { outcome: Outcome::Success, .. }))
    }

    /// The number of finished episodes.
    pub fn n_finished(&self) -> usize {
        self.count(|s| matches!(s, EpisodeStatus::Finished { .. }))
    }

    /// The number of skipped episodes.
    pub fn n_skipped(&self) -> usize {
        self.count(|s| matches!(s, EpisodeStatus::Skipped { .. }))
    }

    /// Ratio of successful episodes among finished ones.
    pub fn success_rate(&self) -> Option<f64> {
        match self.n_finished() {
            0 => None,
            n => Some(self.n_success() as f64 / n as f64),
        }
    }
}

/// Runs a policy on every initial condition of a grid.
///
/// A single policy instance is shared by all episodes; it is reset at the
/// start of each of them. The environment is built anew for every episode.
/// Episodes run sequentially in the order of [`InitialConditionGrid::iter`].
pub struct Sweep {
    config: SweepConfig,
    grid: InitialConditionGrid,
    task_family: TaskFamily,
    namer: ArtifactNamer,
}

impl Sweep {
    /// Constructs a sweep.
    ///
    /// Fails on invalid ranges, before any episode runs.
    pub fn new(config: SweepConfig) -> Result<Self, Real2SimError> {
        let grid = InitialConditionGrid::new(&config.grid)?;
        let task_family = config.resolved_task_family();
        let namer = ArtifactNamer::new(&config.output_dir, &config.ckpt_path, &config.env, config.tmp_exp);

        Ok(Self {
            config,
            grid,
            task_family,
            namer,
        })
    }

    /// Configuration.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Grid of initial conditions.
    pub fn grid(&self) -> &InitialConditionGrid {
        &self.grid
    }

    /// Task family of the environment.
    pub fn task_family(&self) -> TaskFamily {
        self.task_family
    }

    /// Artifact namer.
    pub fn namer(&self) -> &ArtifactNamer {
        &self.namer
    }

    /// Runs an episode and saves its artifacts.
    pub fn run_episode<E, P>(
        &self,
        cond: &InitialCondition,
        policy: &mut P,
        writer: &mut dyn VideoWriter,
    ) -> Result<EpisodeStatus>
    where
        E: Env,
        P: Policy,
    {
        let mut env = E::build(&self.config.env).context("Failed to build the environment")?;
        let result = rollout(&mut env, policy, cond, self.task_family, &self.config.env.camera)?;
        let paths = self.namer.paths(cond, result.outcome, &result.stats);
        save_episode(&paths, &result, policy, writer, self.config.video_fps)?;

        Ok(EpisodeStatus::Finished {
            outcome: result.outcome,
            steps: result.steps(),
            video: paths.video,
        })
    }

    /// Runs all episodes.
    pub fn run<E, P>(&self, policy: &mut P, writer: &mut dyn VideoWriter) -> Result<SweepReport>
    where
        E: Env,
        P: Policy,
    {
        let n_episodes = self.grid.len();
        info!(
            "Evaluating {} on {} with {} episodes ({})",
            self.config.policy_model, self.config.env.env_name, n_episodes, self.task_family
        );
        if self.grid.orientations().len() > 1 {
            warn!(
                "{} robot orientations share artifact paths; later episodes overwrite earlier ones",
                self.grid.orientations().len()
            );
        }

        let mut report = SweepReport::default();
        for (index, cond) in self.grid.iter().enumerate() {
            info!(
                "Episode {}/{}: robot ({}, {}, {:?}), object ({}, {})",
                index + 1,
                n_episodes,
                cond.robot_x,
                cond.robot_y,
                cond.robot_orientation,
                cond.object_x,
                cond.object_y
            );

            let status = match self.run_episode::<E, P>(&cond, policy, writer) {
                Ok(status) => status,
                Err(e) => match self.config.on_episode_error {
                    OnEpisodeError::Abort => {
                        return Err(e.context(format!("Episode {}/{} failed", index + 1, n_episodes)))
                    }
                    OnEpisodeError::Skip => {
                        warn!("Skipped episode {}/{}: {:#}", index + 1, n_episodes, e);
                        EpisodeStatus::Skipped {
                            error: format!("{:#}", e),
                        }
                    }
                },
            };
            report.episodes.push(EpisodeRecord {
                index,
                condition: cond,
                status,
            });
        }

        info!(
            "Success rate: {}/{} ({} skipped)",
            report.n_success(),
            report.n_finished(),
            report.n_skipped()
        );
        Ok(report)
    }
}
