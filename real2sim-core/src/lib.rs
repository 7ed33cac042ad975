#![warn(missing_docs)]
//! Episode rollout and evaluation sweep for real-to-sim evaluation of robot
//! manipulation policies.
//!
//! A sweep evaluates one policy on a grid of initial conditions. For every grid
//! point, the environment is built and reset with the initial robot and object
//! poses, then the policy is stepped in closed loop until it declares the
//! episode finished or the environment truncates it. The outcome, the rendered
//! frames and the predicted actions are written under a path that encodes the
//! whole experiment setup.
//!
//! The environment and the policy are collaborators behind the [`Env`] and
//! [`Policy`] traits. Implementations backed by Python live in the
//! `real2sim-py-env` crate; [`dummy`] provides scripted ones for tests.
pub mod artifact;
pub mod dummy;
pub mod error;
pub mod grid;
pub mod kwargs;
pub mod rollout;
pub mod runtime;
pub mod stats;
pub mod sweep;
pub mod util;

mod base;
pub use base::{
    Action, Env, EnvConfig, Frame, InfoValue, Observation, Policy, PolicyModel, PolicySession,
    ResetOptions, Step, StepInfo,
};
pub use error::Real2SimError;
pub use grid::{GridConfig, InitialCondition, InitialConditionGrid, RangeTuple};
pub use rollout::{rollout, EpisodeResult, Outcome, RolloutError};
pub use stats::{EpisodeStats, TaskFamily};
pub use sweep::{OnEpisodeError, Sweep, SweepConfig, SweepReport};
