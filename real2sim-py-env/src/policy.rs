//! RT-1 and Octo policies on Python.
use crate::{
    runtime::apply_runtime_config,
    util::{frame_to_pyobj, frames_to_pylist, get_f64_array},
};
use anyhow::Result;
use log::{info, trace};
use pyo3::{
    types::{PyDict, PyList, PyTuple},
    PyObject, Python,
};
use real2sim_core::{runtime::RuntimeConfig, Action, Frame, Policy, PolicyModel};
use std::{fmt, path::Path};

const RT1_MODULE: &str = "real2sim.rt1.rt1_model";
const OCTO_MODULE: &str = "real2sim.octo.octo_model";

/// Raw output of a policy on Python, kept for the visualization of actions.
#[derive(Clone)]
pub struct PyRawAction {
    obj: PyObject,
    repr: String,
}

impl PyRawAction {
    /// The Python object.
    pub fn as_pyobj(&self) -> &PyObject {
        &self.obj
    }
}

impl fmt::Debug for PyRawAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

/// A policy model on Python, either `RT1Inference` or `OctoInference`.
pub struct PyPolicy {
    model: PolicyModel,
    inner: PyObject,
}

impl PyPolicy {
    /// Loads a policy.
    ///
    /// The runtime settings are applied to the process before the model is
    /// created. `ckpt_path` is used only by RT-1; Octo models are fetched by
    /// their name.
    pub fn load(
        model: PolicyModel,
        ckpt_path: &str,
        action_scale: f64,
        runtime: &RuntimeConfig,
    ) -> Result<Self> {
        apply_runtime_config(runtime, model)?;

        let inner = Python::with_gil(|py| -> Result<PyObject> {
            let kwargs = PyDict::new(py);
            kwargs.set_item("action_scale", action_scale)?;
            let inner = match model {
                PolicyModel::Rt1 => {
                    kwargs.set_item("saved_model_path", ckpt_path)?;
                    py.import(RT1_MODULE)?
                        .getattr("RT1Inference")?
                        .call((), Some(kwargs))?
                }
                PolicyModel::OctoBase | PolicyModel::OctoSmall => {
                    kwargs.set_item("model_type", model.as_str())?;
                    py.import(OCTO_MODULE)?
                        .getattr("OctoInference")?
                        .call((), Some(kwargs))?
                }
            };
            Ok(inner.into())
        })?;
        info!("Loaded {} policy (action scale {})", model, action_scale);

        Ok(Self { model, inner })
    }

    /// The policy model.
    pub fn model(&self) -> PolicyModel {
        self.model
    }
}

impl Policy for PyPolicy {
    type RawAction = PyRawAction;

    fn reset(&mut self, task_description: &str) -> Result<()> {
        trace!("PyPolicy::reset({})", task_description);
        Python::with_gil(|py| {
            self.inner.call_method(py, "reset", (task_description,), None)?;
            Ok(())
        })
    }

    fn step(&mut self, image: &Frame, gripper_closedness: f64) -> Result<(PyRawAction, Action)> {
        Python::with_gil(|py| {
            let image = frame_to_pyobj(py, image);
            let ret = self
                .inner
                .call_method(py, "step", (image, gripper_closedness), None)?;
            let ret: &PyTuple = ret.extract(py)?;
            let (raw, action) = (ret.get_item(0), ret.get_item(1));

            let act = Action {
                world_vector: get_f64_array(action, "world_vector")?,
                rot_axangle: get_f64_array(action, "rot_axangle")?,
                gripper: get_f64_array::<1>(action, "gripper")?[0],
                terminate_episode: get_f64_array::<1>(action, "terminate_episode")?[0],
            };
            let raw = PyRawAction {
                obj: raw.into(),
                repr: raw.str()?.to_string(),
            };
            Ok((raw, act))
        })
    }

    fn visualize_epoch(
        &self,
        raw_actions: &[PyRawAction],
        images: &[Frame],
        save_path: &Path,
    ) -> Result<()> {
        Python::with_gil(|py| {
            let raw_actions = PyList::new(py, raw_actions.iter().map(|a| a.obj.clone_ref(py)));
            let images = frames_to_pylist(py, images);
            let kwargs = PyDict::new(py);
            kwargs.set_item("save_path", save_path.to_string_lossy().as_ref())?;
            self.inner
                .call_method(py, "visualize_epoch", (raw_actions, images), Some(kwargs))?;
            Ok(())
        })
    }
}
