//! Closed-loop rollout of a policy in an environment.
use crate::{
    Action, Env, EpisodeStats, Frame, InitialCondition, Observation, Policy, PolicySession,
    ResetOptions, StepInfo, TaskFamily,
};
use log::{debug, info};
use std::fmt;
use thiserror::Error;

/// Outcome of an episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The task was accomplished.
    Success,

    /// The task was not accomplished.
    Failure,
}

impl Outcome {
    /// Label used in artifact names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
        }
    }

    /// Returns `true` for [`Outcome::Success`].
    pub fn is_success(&self) -> bool {
        *self == Outcome::Success
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything recorded in an episode.
#[derive(Clone, Debug)]
pub struct EpisodeResult<R> {
    /// Outcome of the episode.
    pub outcome: Outcome,

    /// The initial frame followed by the frame after every step.
    pub frames: Vec<Frame>,

    /// Raw policy outputs, one per step.
    pub raw_actions: Vec<R>,

    /// Actions, one per step.
    pub actions: Vec<Action>,

    /// Statistics of the task family.
    pub stats: EpisodeStats,

    /// Task given to the policy.
    pub task_description: String,

    /// Information of the last step.
    pub last_info: Option<StepInfo>,

    /// The policy declared termination.
    pub terminated_by_policy: bool,

    /// The environment reached its step ceiling.
    pub truncated: bool,
}

impl<R> EpisodeResult<R> {
    /// The number of environment steps.
    pub fn steps(&self) -> usize {
        self.actions.len()
    }
}

/// Failure of an episode.
///
/// Episodes are never resumed after a failure; the partial recording is
/// discarded.
#[derive(Error, Debug)]
pub enum RolloutError {
    /// The environment failed.
    #[error("Environment failed at step {step}")]
    Env {
        /// Step at which the failure happened; 0 for the reset.
        step: usize,
        /// Cause.
        #[source]
        source: anyhow::Error,
    },

    /// The policy failed.
    #[error("Policy failed at step {step}")]
    Policy {
        /// Step at which the failure happened; 0 for the reset.
        step: usize,
        /// Cause.
        #[source]
        source: anyhow::Error,
    },

    /// The observation lacks the image of the camera given to the policy.
    #[error("Camera {camera:?} is missing from the observation (available: {available:?})")]
    MissingCamera {
        /// The requested camera.
        camera: String,
        /// Cameras in the observation.
        available: Vec<String>,
    },
}

fn take_image(obs: Observation, camera: &str) -> Result<Frame, RolloutError> {
    let available: Vec<String> = match obs.image(camera) {
        Some(_) => vec![],
        None => obs.cameras().map(String::from).collect(),
    };
    obs.into_image(camera)
        .ok_or_else(|| RolloutError::MissingCamera {
            camera: camera.to_string(),
            available,
        })
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs an episode from the given initial condition.
///
/// The episode goes on until the policy declares termination or the
/// environment truncates the episode. Termination declared by the environment
/// itself does not end the episode.
///
/// ```mermaid
/// graph LR
///     E[Env] -->|image| P[PolicySession]
///     E -->|gripper closedness| P
///     P -->|Action| E
///     E -->|StepInfo| S[EpisodeStats]
/// ```
///
/// The outcome is [`Outcome::Success`] if the environment reports success at the
/// step where the policy declares termination, or if the statistics of the task
/// family judge the final state successful.
pub fn rollout<E, P>(
    env: &mut E,
    policy: &mut P,
    condition: &InitialCondition,
    family: TaskFamily,
    camera: &str,
) -> Result<EpisodeResult<P::RawAction>, RolloutError>
where
    E: Env,
    P: Policy,
{
    let (obs, task_description) = env
        .reset(&ResetOptions::from(condition))
        .map_err(|source| RolloutError::Env { step: 0, source })?;
    let mut frames = vec![take_image(obs, camera)?];
    let mut session = PolicySession::begin(policy, &task_description)
        .map_err(|source| RolloutError::Policy { step: 0, source })?;
    let mut stats = EpisodeStats::new(family);
    let mut raw_actions = vec![];
    let mut actions = vec![];
    let mut last_info: Option<StepInfo> = None;
    let mut outcome = Outcome::Failure;
    let (mut predicted_terminated, mut truncated) = (false, false);
    let mut timestep = 0;

    while !(predicted_terminated || truncated) {
        let gripper_closedness = env
            .gripper_closedness()
            .map_err(|source| RolloutError::Env { step: timestep, source })?;
        let image = &frames[frames.len() - 1];
        let (raw_action, act) = session
            .step(image, gripper_closedness)
            .map_err(|source| RolloutError::Policy { step: timestep, source })?;
        debug!("{} {:?}", timestep, raw_action);
        raw_actions.push(raw_action);
        predicted_terminated = act.terminates();

        let step = env
            .step(&act.env_vector())
            .map_err(|source| RolloutError::Env { step: timestep + 1, source })?;
        stats.update(&step.info);
        if predicted_terminated && step.info.success() {
            outcome = Outcome::Success;
        }
        truncated = step.is_truncated;
        debug!("{:?}", step.info);

        frames.push(take_image(step.obs, camera)?);
        actions.push(act);
        last_info = Some(step.info);
        timestep += 1;
    }

    if !outcome.is_success() && stats.truncation_success(last_info.as_ref()) {
        outcome = Outcome::Success;
    }
    info!(
        "Episode finished with {} after {} steps ({})",
        outcome,
        timestep,
        if predicted_terminated { "terminated" } else { "truncated" }
    );

    Ok(EpisodeResult {
        outcome,
        frames,
        raw_actions,
        actions,
        stats,
        task_description,
        last_info,
        terminated_by_policy: predicted_terminated,
        truncated,
    })
}
