//! Core functionalities.
mod action;
mod env;
mod policy;
mod step;
pub use action::Action;
pub use env::{Env, EnvConfig, ResetOptions};
pub use policy::{Policy, PolicyModel, PolicySession};
pub use step::{InfoValue, Step, StepInfo};

use anyhow::Result;
use ndarray::Array3;
use std::collections::BTreeMap;

/// An RGB image of shape `(height, width, 3)`.
pub type Frame = Array3<u8>;

/// Observation of the environment.
///
/// Only the camera images are exposed to the rollout. Other parts of the
/// simulator observation stay on the environment side.
#[derive(Clone, Debug, Default)]
pub struct Observation {
    images: BTreeMap<String, Frame>,
}

impl Observation {
    /// Constructs an observation from camera images.
    pub fn new(images: BTreeMap<String, Frame>) -> Self {
        Self { images }
    }

    /// Constructs an observation with a single camera.
    pub fn from_camera(camera: impl Into<String>, image: Frame) -> Self {
        let mut images = BTreeMap::new();
        images.insert(camera.into(), image);
        Self { images }
    }

    /// Returns the RGB image of the given camera.
    pub fn image(&self, camera: &str) -> Option<&Frame> {
        self.images.get(camera)
    }

    /// Takes the RGB image of the given camera out of the observation.
    pub fn into_image(mut self, camera: &str) -> Option<Frame> {
        self.images.remove(camera)
    }

    /// Names of the cameras in the observation.
    pub fn cameras(&self) -> impl Iterator<Item = &str> {
        self.images.keys().map(|k| k.as_str())
    }
}

/// Loads a configuration from a YAML file.
pub(crate) fn load_yaml<T: serde::de::DeserializeOwned>(path: impl AsRef<std::path::Path>) -> Result<T> {
    let file = std::fs::File::open(path)?;
    let rdr = std::io::BufReader::new(file);
    Ok(serde_yaml::from_reader(rdr)?)
}

/// Saves a configuration to a YAML file.
pub(crate) fn save_yaml<T: serde::Serialize>(value: &T, path: impl AsRef<std::path::Path>) -> Result<()> {
    use std::io::Write;
    let mut file = std::fs::File::create(path)?;
    file.write_all(serde_yaml::to_string(value)?.as_bytes())?;
    Ok(())
}
