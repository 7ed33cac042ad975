//! Writers of episode artifacts.
use super::EpisodePaths;
use crate::{EpisodeResult, Frame, Policy};
use anyhow::{anyhow, bail, Result};
use image::{ImageBuffer, Rgb};
use log::{debug, info};
use std::{fs, path::Path};

/// Frame rate of episode videos.
pub const DEFAULT_FPS: f64 = 5.0;

/// Encodes a sequence of frames into a video file.
pub trait VideoWriter {
    /// Writes `frames` at `path`. The parent directory exists.
    fn write(&mut self, path: &Path, frames: &[Frame], fps: f64) -> Result<()>;
}

/// Writes the frames of a video as numbered PNG files.
///
/// The frames of the video at `foo/bar.mp4` are saved as `foo/bar/00000.png`,
/// `foo/bar/00001.png` and so on. Frame rate is not recorded.
#[derive(Clone, Debug, Default)]
pub struct PngSequenceWriter;

impl VideoWriter for PngSequenceWriter {
    fn write(&mut self, path: &Path, frames: &[Frame], _fps: f64) -> Result<()> {
        let dir = path.with_extension("");
        fs::create_dir_all(&dir)?;
        for (i, frame) in frames.iter().enumerate() {
            let (h, w, c) = frame.dim();
            if c != 3 {
                bail!("Frame of shape {:?} is not an RGB image", frame.dim());
            }
            let img = ImageBuffer::<Rgb<u8>, _>::from_vec(w as u32, h as u32, frame.iter().cloned().collect())
                .ok_or_else(|| anyhow!("Frame of shape {:?} is not an RGB image", frame.dim()))?;
            img.save(dir.join(format!("{:05}.png", i)))?;
        }
        debug!("Saved {} frames in {:?}", frames.len(), dir);
        Ok(())
    }
}

/// Saves the video and the action visualization of an episode.
///
/// Directories are created as needed.
pub fn save_episode<P: Policy>(
    paths: &EpisodePaths,
    result: &EpisodeResult<P::RawAction>,
    policy: &P,
    writer: &mut dyn VideoWriter,
    fps: f64,
) -> Result<()> {
    if let Some(dir) = paths.video.parent() {
        fs::create_dir_all(dir)?;
    }
    writer.write(&paths.video, &result.frames, fps)?;

    if let Some(dir) = paths.actions.parent() {
        fs::create_dir_all(dir)?;
    }
    policy.visualize_epoch(&result.raw_actions, &result.frames, &paths.actions)?;
    info!("Saved {:?}", paths.video);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dummy::{frame, DummyPolicy, FRAME_SIZE},
        EpisodeStats, Outcome, TaskFamily,
    };
    use ndarray::Array3;
    use tempdir::TempDir;

    #[test]
    fn test_png_sequence_writer() -> Result<()> {
        let tmp = TempDir::new("png_sequence")?;
        let path = tmp.path().join("success_obj_0.1_0.2.mp4");
        let frames = vec![frame(0), frame(128), frame(255)];
        PngSequenceWriter.write(&path, &frames, DEFAULT_FPS)?;

        let dir = tmp.path().join("success_obj_0.1_0.2");
        let img = image::open(dir.join("00001.png"))?.to_rgb8();
        assert_eq!(img.dimensions(), (FRAME_SIZE as u32, FRAME_SIZE as u32));
        assert_eq!(img.get_pixel(0, 0), &Rgb([128, 128, 128]));
        assert!(dir.join("00002.png").exists());
        assert!(!dir.join("00003.png").exists());
        Ok(())
    }

    #[test]
    fn test_png_sequence_writer_rejects_non_rgb() -> Result<()> {
        let tmp = TempDir::new("png_sequence")?;
        let frames = vec![Array3::<u8>::zeros((2, 2, 4))];
        assert!(PngSequenceWriter.write(&tmp.path().join("a.mp4"), &frames, DEFAULT_FPS).is_err());
        Ok(())
    }

    #[test]
    fn test_save_episode_creates_directories() -> Result<()> {
        let tmp = TempDir::new("save_episode")?;
        let dir = tmp.path().join("results").join("rob_0.35_0.2_rgb_overlay_None");
        let paths = EpisodePaths {
            video: dir.join("failure_obj_0.0_0.0.mp4"),
            actions: dir.join("actions").join("failure_obj_0.0_0.0.png"),
        };
        let result = EpisodeResult {
            outcome: Outcome::Failure,
            frames: vec![frame(0), frame(1)],
            raw_actions: vec![],
            actions: vec![],
            stats: EpisodeStats::new(TaskFamily::Other),
            task_description: "pick coke can".to_string(),
            last_info: None,
            terminated_by_policy: false,
            truncated: true,
        };
        let policy = DummyPolicy::never_terminate();

        // Twice, directory creation is idempotent
        for _ in 0..2 {
            save_episode(&paths, &result, &policy, &mut PngSequenceWriter, DEFAULT_FPS)?;
        }
        assert!(dir.join("failure_obj_0.0_0.0").join("00001.png").exists());
        assert_eq!(
            fs::read_to_string(&paths.actions)?,
            "0 actions, 2 images\n"
        );
        Ok(())
    }
}
