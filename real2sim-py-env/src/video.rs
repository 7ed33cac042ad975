//! Video writer backed by mediapy.
use crate::util::frames_to_pylist;
use anyhow::Result;
use log::trace;
use pyo3::{types::PyDict, Python};
use real2sim_core::{artifact::VideoWriter, Frame};
use std::path::Path;

/// Writes videos with `mediapy.write_video()`.
#[derive(Clone, Debug, Default)]
pub struct MediapyVideoWriter;

impl VideoWriter for MediapyVideoWriter {
    fn write(&mut self, path: &Path, frames: &[Frame], fps: f64) -> Result<()> {
        trace!("MediapyVideoWriter::write({:?}, {} frames)", path, frames.len());
        Python::with_gil(|py| {
            let mediapy = py.import("mediapy")?;
            let images = frames_to_pylist(py, frames);
            let kwargs = PyDict::new(py);
            kwargs.set_item("fps", fps)?;
            mediapy
                .getattr("write_video")?
                .call((path.to_string_lossy().as_ref(), images), Some(kwargs))?;
            Ok(())
        })
    }
}
