//! Python collaborators of real-to-sim evaluation, based on [`PyO3`](https://github.com/PyO3/pyo3).
//!
//! * [`ManiSkillEnv`] wraps an environment of the ManiSkill2 real-to-sim
//!   scenes built with `real2sim.utils.env.env_builder`.
//! * [`PyPolicy`] wraps `RT1Inference` and `OctoInference`.
//! * [`MediapyVideoWriter`] encodes episode videos with mediapy.
//!
//! Images cross the boundary as numpy arrays of dtype `uint8`. Info
//! dictionaries returned by the environment are converted into
//! [`StepInfo`](real2sim_core::StepInfo), keeping the order of keys; numpy
//! booleans and numbers are mapped to their Rust counterparts.
mod env;
mod policy;
mod runtime;
pub mod util;
mod video;
pub use env::{robot_control_mode, ManiSkillEnv};
pub use policy::{PyPolicy, PyRawAction};
pub use runtime::apply_runtime_config;
pub use video::MediapyVideoWriter;
