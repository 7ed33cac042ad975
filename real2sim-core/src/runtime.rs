//! Process-level settings of the inference runtime.
use serde::{Deserialize, Serialize};

/// Settings applied once before a policy is loaded.
///
/// These are passed explicitly to the policy loader, which applies them to the
/// process it runs the model in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Index of the GPU made visible to the model.
    pub gpu_id: usize,

    /// Memory cap of TensorFlow on the GPU in MiB. `None` leaves the default
    /// allocation behavior.
    pub tf_memory_limit_mb: Option<usize>,

    /// Disables the display for headless rendering.
    pub headless: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            gpu_id: 0,
            tf_memory_limit_mb: Some(4096),
            headless: true,
        }
    }
}

impl RuntimeConfig {
    /// Sets the GPU index.
    pub fn gpu_id(mut self, v: usize) -> Self {
        self.gpu_id = v;
        self
    }

    /// Sets the memory cap of TensorFlow.
    pub fn tf_memory_limit_mb(mut self, v: Option<usize>) -> Self {
        self.tf_memory_limit_mb = v;
        self
    }

    /// Sets headless mode.
    pub fn headless(mut self, v: bool) -> Self {
        self.headless = v;
        self
    }

    /// Environment variables to be set in the process.
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        let mut vars = vec![("CUDA_VISIBLE_DEVICES", self.gpu_id.to_string())];
        if self.headless {
            vars.push(("DISPLAY", String::new()));
        }
        vars
    }
}
