//! ManiSkill2 real-to-sim environments.
use crate::util::{
    kwarg_to_pyobj, pyany_to_frame, pydict_to_step_info, reset_options_to_pydict,
};
use anyhow::{Context, Result};
use log::{info, trace, warn};
use numpy::PyArray1;
use pyo3::{
    types::{PyDict, PyTuple},
    IntoPy, PyAny, PyObject, Python,
};
use real2sim_core::{Env, EnvConfig, Observation, ResetOptions, Step};
use std::collections::BTreeMap;

const ENV_BUILDER_MODULE: &str = "real2sim.utils.env.env_builder";

/// Returns the default controller of a robot.
pub fn robot_control_mode(robot: &str) -> Result<String> {
    Python::with_gil(|py| {
        let builder = py.import(ENV_BUILDER_MODULE)?;
        let mode = builder.getattr("get_robot_control_mode")?.call1((robot,))?;
        Ok(mode.extract()?)
    })
}

/// Takes the RGB images of all cameras in `obs["image"]`.
fn observation(obs: &PyAny) -> Result<Observation> {
    let cameras: &PyDict = obs.get_item("image")?.downcast().map_err(pyo3::PyErr::from)?;
    let mut images = BTreeMap::new();
    for (name, camera) in cameras.iter() {
        let name: String = name.extract()?;
        let rgb = pyany_to_frame(camera.get_item("rgb")?)
            .with_context(|| format!("Failed to read the RGB image of {}", name))?;
        images.insert(name, rgb);
    }
    Ok(Observation::new(images))
}

/// A ManiSkill2 environment on Python.
///
/// Environments are built with `build_maniskill2_env()` of the real-to-sim
/// tooling, which also provides the language description of the task.
pub struct ManiSkillEnv {
    env: PyObject,
    task_description: String,
}

impl ManiSkillEnv {
    /// Language description of the task given at build time.
    pub fn task_description(&self) -> &str {
        &self.task_description
    }
}

impl Env for ManiSkillEnv {
    fn build(config: &EnvConfig) -> Result<Self> {
        let control_mode = match config.control_mode.as_str() {
            "" => robot_control_mode(&config.robot)?,
            mode => mode.to_string(),
        };

        Python::with_gil(|py| {
            let builder = py.import(ENV_BUILDER_MODULE)?;
            let camera_cfgs = PyDict::new(py);
            camera_cfgs.set_item("add_segmentation", config.add_segmentation)?;

            let kwargs = PyDict::new(py);
            kwargs.set_item("obs_mode", &config.obs_mode)?;
            kwargs.set_item("robot", &config.robot)?;
            kwargs.set_item("sim_freq", config.sim_freq)?;
            kwargs.set_item("control_mode", &control_mode)?;
            kwargs.set_item("control_freq", config.control_freq)?;
            kwargs.set_item("max_episode_steps", config.max_episode_steps)?;
            kwargs.set_item("scene_name", &config.scene_name)?;
            kwargs.set_item("camera_cfgs", camera_cfgs)?;
            kwargs.set_item(
                "rgb_overlay_path",
                config
                    .rgb_overlay_path
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?;
            kwargs.set_item("instruction", &config.instruction)?;
            for (k, v) in config.additional_kwargs.iter() {
                kwargs.set_item(k, kwarg_to_pyobj(py, v))?;
            }

            let ret = builder
                .getattr("build_maniskill2_env")?
                .call((config.env_name.as_str(),), Some(kwargs))?;
            let (env, task_description): (PyObject, String) = ret.extract()?;
            info!("Built {} ({}): {}", config.env_name, control_mode, task_description);

            Ok(Self {
                env,
                task_description,
            })
        })
    }

    fn reset(&mut self, options: &ResetOptions) -> Result<(Observation, String)> {
        trace!("ManiSkillEnv::reset()");
        Python::with_gil(|py| {
            let kwargs = PyDict::new(py);
            kwargs.set_item("options", reset_options_to_pydict(py, options)?)?;
            let ret = self.env.call_method(py, "reset", (), Some(kwargs))?;
            let ret: &PyTuple = ret.extract(py)?;
            let obs = observation(ret.get_item(0))?;
            Ok((obs, self.task_description.clone()))
        })
    }

    fn step(&mut self, act: &[f64; 7]) -> Result<Step> {
        trace!("ManiSkillEnv::step()");
        Python::with_gil(|py| {
            let act: pyo3::PyObject = PyArray1::from_slice(py, &act[..]).into_py(py);
            let ret = self.env.call_method(py, "step", (act,), None)?;
            let step: &PyTuple = ret.extract(py)?;
            let obs = observation(step.get_item(0))?;
            let reward: f64 = step.get_item(1).extract()?;
            let is_terminated = step.get_item(2).is_true()?;
            let is_truncated = step.get_item(3).is_true()?;
            let info: &PyDict = step.get_item(4).downcast().map_err(pyo3::PyErr::from)?;
            let info = pydict_to_step_info(info)?;

            Ok(Step::new(obs, reward as f32, is_terminated, is_truncated, info))
        })
    }

    fn gripper_closedness(&self) -> Result<f64> {
        Python::with_gil(|py| {
            let agent = self.env.getattr(py, "agent")?;
            Ok(agent.call_method0(py, "get_gripper_closedness")?.extract(py)?)
        })
    }
}

impl Drop for ManiSkillEnv {
    fn drop(&mut self) {
        Python::with_gil(|py| {
            if let Err(e) = self.env.call_method0(py, "close") {
                warn!("Failed to close the environment: {}", e);
            }
        })
    }
}
