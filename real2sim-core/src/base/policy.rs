//! Policy.
use super::{Action, Frame};
use crate::error::Real2SimError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fmt, fmt::Debug, path::Path, str::FromStr};

/// A visuomotor policy.
///
/// A policy may keep episode-local state, e.g. a history of images.
/// [`Policy::reset`] must erase all of it, so that the first action of an episode
/// does not depend on previous episodes. The rollout never calls the policy
/// directly; it goes through a [`PolicySession`], which can only be opened by
/// resetting the policy.
pub trait Policy {
    /// Output of the model before post-processing, kept for visualization.
    type RawAction: Clone + Debug;

    /// Clears episode-local state and sets the task of the next episode.
    fn reset(&mut self, task_description: &str) -> Result<()>;

    /// Predicts an action from the current image and gripper closedness.
    fn step(&mut self, image: &Frame, gripper_closedness: f64)
        -> Result<(Self::RawAction, Action)>;

    /// Saves a visualization of the predicted actions of an episode.
    fn visualize_epoch(
        &self,
        raw_actions: &[Self::RawAction],
        images: &[Frame],
        save_path: &Path,
    ) -> Result<()>;
}

/// A policy bound to a single episode.
///
/// The session holds the only mutable borrow of the policy until it is dropped,
/// and it can only be created through [`PolicySession::begin`], which resets the
/// policy.
pub struct PolicySession<'a, P: Policy> {
    policy: &'a mut P,
    task_description: String,
    steps: usize,
}

impl<'a, P: Policy> PolicySession<'a, P> {
    /// Resets the policy with the task description and opens a session.
    pub fn begin(policy: &'a mut P, task_description: &str) -> Result<Self> {
        policy.reset(task_description)?;
        Ok(Self {
            policy,
            task_description: task_description.to_string(),
            steps: 0,
        })
    }

    /// Queries the policy.
    pub fn step(&mut self, image: &Frame, gripper_closedness: f64) -> Result<(P::RawAction, Action)> {
        let ret = self.policy.step(image, gripper_closedness)?;
        self.steps += 1;
        Ok(ret)
    }

    /// The task of this episode.
    pub fn task_description(&self) -> &str {
        &self.task_description
    }

    /// The number of queries made in this session.
    pub fn steps(&self) -> usize {
        self.steps
    }
}

/// Policy families that can be evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyModel {
    /// RT-1, loaded from a saved model checkpoint.
    #[serde(rename = "rt1")]
    Rt1,

    /// Octo, base size.
    #[serde(rename = "octo-base")]
    OctoBase,

    /// Octo, small size.
    #[serde(rename = "octo-small")]
    OctoSmall,
}

impl PolicyModel {
    /// Identifier used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyModel::Rt1 => "rt1",
            PolicyModel::OctoBase => "octo-base",
            PolicyModel::OctoSmall => "octo-small",
        }
    }

    /// Returns `true` for the Octo family.
    pub fn is_octo(&self) -> bool {
        matches!(self, PolicyModel::OctoBase | PolicyModel::OctoSmall)
    }
}

impl Default for PolicyModel {
    fn default() -> Self {
        PolicyModel::Rt1
    }
}

impl fmt::Display for PolicyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyModel {
    type Err = Real2SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rt1" => Ok(PolicyModel::Rt1),
            "octo-base" => Ok(PolicyModel::OctoBase),
            "octo-small" => Ok(PolicyModel::OctoSmall),
            _ => Err(Real2SimError::UnknownPolicyModel(s.to_string())),
        }
    }
}
