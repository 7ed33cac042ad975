//! Scripted environment and policy, used in tests.
//!
//! [`DummyEnv`] is scripted with the additional build arguments of
//! [`EnvConfig`]:
//!
//! * `success_from_step=n` - `success` is reported from the `n`-th step on.
//! * `fail_at_step=n` - the `n`-th step returns an error.
//! * `fail_obj_x=x` - resetting with object x equal to `x` returns an error.
//! * `flags=[a,b]` - info keys reported as `true` at every step.
use crate::{
    kwargs::KwargValue, Action, Env, EnvConfig, Frame, InfoValue, Observation, Policy,
    ResetOptions, Step, StepInfo,
};
use anyhow::{bail, Result};
use ndarray::Array3;
use std::path::Path;

/// Side length of the frames of [`DummyEnv`].
pub const FRAME_SIZE: usize = 4;

/// A frame filled with `v`.
pub fn frame(v: u8) -> Frame {
    Array3::from_elem((FRAME_SIZE, FRAME_SIZE, 3), v)
}

/// Scripted environment.
pub struct DummyEnv {
    camera: String,
    max_steps: usize,
    success_from_step: Option<usize>,
    fail_at_step: Option<usize>,
    fail_obj_x: Option<f64>,
    flags: Vec<String>,
    steps: usize,
    options: Option<ResetOptions>,
}

impl DummyEnv {
    /// Reset options of the last reset.
    pub fn options(&self) -> Option<&ResetOptions> {
        self.options.as_ref()
    }

    fn observation(&self) -> Observation {
        Observation::from_camera(self.camera.clone(), frame(self.steps as u8))
    }
}

fn as_usize(v: Option<&KwargValue>) -> Option<usize> {
    match v {
        Some(KwargValue::Int(n)) if *n >= 0 => Some(*n as usize),
        _ => None,
    }
}

impl Env for DummyEnv {
    fn build(config: &EnvConfig) -> Result<Self> {
        let kwargs = &config.additional_kwargs;
        let fail_obj_x = match kwargs.get("fail_obj_x") {
            Some(KwargValue::Float(x)) => Some(*x),
            Some(KwargValue::Int(x)) => Some(*x as f64),
            _ => None,
        };
        let flags = match kwargs.get("flags") {
            Some(KwargValue::List(v)) => v.iter().map(|f| f.to_string()).collect(),
            Some(KwargValue::Str(f)) => vec![f.clone()],
            _ => vec![],
        };

        Ok(Self {
            camera: config.camera.clone(),
            max_steps: config.max_episode_steps,
            success_from_step: as_usize(kwargs.get("success_from_step")),
            fail_at_step: as_usize(kwargs.get("fail_at_step")),
            fail_obj_x,
            flags,
            steps: 0,
            options: None,
        })
    }

    fn reset(&mut self, options: &ResetOptions) -> Result<(Observation, String)> {
        if self.fail_obj_x == Some(options.obj_init_xy[0]) {
            bail!("Failed to place the object at {:?}", options.obj_init_xy);
        }
        self.steps = 0;
        self.options = Some(options.clone());
        Ok((self.observation(), "pick coke can".to_string()))
    }

    fn step(&mut self, _act: &[f64; 7]) -> Result<Step> {
        self.steps += 1;
        if self.fail_at_step == Some(self.steps) {
            bail!("Simulation diverged at step {}", self.steps);
        }

        let success = self.success_from_step.map_or(false, |n| self.steps >= n);
        let mut info = StepInfo::empty();
        info.insert("elapsed_steps", InfoValue::Number(self.steps as f64));
        for flag in self.flags.iter() {
            info.insert(flag.clone(), InfoValue::Bool(true));
        }
        info.insert("success", InfoValue::Bool(success));

        let is_truncated = self.steps >= self.max_steps;
        Ok(Step::new(self.observation(), 0.0, success, is_truncated, info))
    }

    fn gripper_closedness(&self) -> Result<f64> {
        Ok((self.steps as f64 * 0.1).min(1.0))
    }
}

/// Raw output of [`DummyPolicy`].
#[derive(Clone, Debug, PartialEq)]
pub struct DummyRawAction {
    /// Index of the query within the episode.
    pub step_in_episode: usize,

    /// Gripper closedness given to the policy.
    pub gripper_closedness: f64,
}

/// Policy which terminates at a fixed step of every episode.
pub struct DummyPolicy {
    terminate_at: Option<usize>,
    ignore_reset: bool,
    step_in_episode: usize,
    n_resets: usize,
}

impl DummyPolicy {
    /// Declares termination at the `n`-th query of every episode.
    pub fn terminate_at(n: usize) -> Self {
        Self {
            terminate_at: Some(n),
            ignore_reset: false,
            step_in_episode: 0,
            n_resets: 0,
        }
    }

    /// Never declares termination.
    pub fn never_terminate() -> Self {
        Self {
            terminate_at: None,
            ..Self::terminate_at(0)
        }
    }

    /// Keeps its step counter across resets.
    pub fn leaky(mut self) -> Self {
        self.ignore_reset = true;
        self
    }

    /// The number of resets.
    pub fn n_resets(&self) -> usize {
        self.n_resets
    }
}

impl Policy for DummyPolicy {
    type RawAction = DummyRawAction;

    fn reset(&mut self, _task_description: &str) -> Result<()> {
        self.n_resets += 1;
        if !self.ignore_reset {
            self.step_in_episode = 0;
        }
        Ok(())
    }

    fn step(&mut self, _image: &Frame, gripper_closedness: f64) -> Result<(DummyRawAction, Action)> {
        let raw = DummyRawAction {
            step_in_episode: self.step_in_episode,
            gripper_closedness,
        };
        self.step_in_episode += 1;

        let terminate = self.terminate_at == Some(self.step_in_episode);
        let act = Action::default()
            .world_vector([0.01 * raw.step_in_episode as f64, 0.0, 0.0])
            .gripper(1.0)
            .terminate_episode(if terminate { 1.0 } else { 0.0 });
        Ok((raw, act))
    }

    fn visualize_epoch(
        &self,
        raw_actions: &[DummyRawAction],
        images: &[Frame],
        save_path: &Path,
    ) -> Result<()> {
        let text = format!("{} actions, {} images\n", raw_actions.len(), images.len());
        std::fs::write(save_path, text)?;
        Ok(())
    }
}
