//! Artifacts of episodes.
//!
//! Every episode produces a video of the rendered frames and a visualization
//! of the predicted actions. [`ArtifactNamer`] computes where they go;
//! [`save_episode`] writes them through a [`VideoWriter`] and the policy.
mod naming;
mod writer;
pub use naming::{ArtifactNamer, EpisodePaths};
pub use writer::{save_episode, PngSequenceWriter, VideoWriter, DEFAULT_FPS};
