//! Settings of the Python process running the models.
use anyhow::Result;
use log::{info, warn};
use pyo3::{types::PyList, Python};
use real2sim_core::{runtime::RuntimeConfig, PolicyModel};

/// Applies runtime settings before a model is created.
///
/// Environment variables are set through `os.environ` so that they are seen by
/// libraries loaded later in the interpreter. The memory cap of TensorFlow is
/// applied to the first visible GPU for RT-1 only.
pub fn apply_runtime_config(config: &RuntimeConfig, model: PolicyModel) -> Result<()> {
    Python::with_gil(|py| {
        let environ = py.import("os")?.getattr("environ")?;
        for (k, v) in config.env_vars() {
            environ.set_item(k, v)?;
        }
        info!("CUDA_VISIBLE_DEVICES={}", config.gpu_id);

        if let (false, Some(limit)) = (model.is_octo(), config.tf_memory_limit_mb) {
            let tf_config = py.import("tensorflow")?.getattr("config")?;
            let gpus: &PyList = tf_config
                .call_method1("list_physical_devices", ("GPU",))?
                .downcast()
                .map_err(pyo3::PyErr::from)?;
            if gpus.is_empty() {
                warn!("No GPU is visible to TensorFlow; memory limit is not applied");
                return Ok(());
            }

            let device_config = tf_config
                .getattr("LogicalDeviceConfiguration")?
                .call1((limit,))?;
            tf_config.call_method1(
                "set_logical_device_configuration",
                (gpus.get_item(0), PyList::new(py, &[device_config])),
            )?;
            info!("TensorFlow memory limit: {} MiB", limit);
        }
        Ok(())
    })
}
