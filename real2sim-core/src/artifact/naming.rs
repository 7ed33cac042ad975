//! Paths of episode artifacts.
use crate::{
    rollout::Outcome,
    stats::StatValue,
    util::{fmt_py_bool, fmt_py_float},
    EnvConfig, EpisodeStats, InitialCondition,
};
use std::path::{Path, PathBuf};

/// Paths of the artifacts of an episode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EpisodePaths {
    /// Video of the rendered frames.
    pub video: PathBuf,

    /// Visualization of the predicted actions.
    pub actions: PathBuf,
}

/// Computes artifact paths from the setup of an experiment.
///
/// The video of an episode is saved at
///
/// ```text
/// {root}/{ckpt}/{scene}/{control_mode}/{env}[_{k}_{v}...]
///     /rob_{x}_{y}_rgb_overlay_{overlay}
///     /{outcome}_obj_{x}_{y}[_{stat}_{v}...].mp4
/// ```
///
/// where `root` is `results`, or `results_tmp` for temporary experiments, and
/// `ckpt` is the last component of the checkpoint path. The visualization of
/// actions is saved in the `actions` subdirectory with the same stem and the
/// `png` extension.
///
/// Naming is pure; nothing is touched on the file system.
#[derive(Clone, Debug, PartialEq)]
pub struct ArtifactNamer {
    experiment_dir: PathBuf,
    overlay: String,
}

/// Last component of a checkpoint path, ignoring one trailing `/`.
fn ckpt_basename(ckpt_path: &str) -> &str {
    let path = ckpt_path.strip_suffix('/').unwrap_or(ckpt_path);
    path.rsplit('/').next().unwrap_or(path)
}

fn fmt_stat(v: &StatValue) -> String {
    match v {
        StatValue::Flag(b) => fmt_py_bool(*b).to_string(),
        StatValue::Count(n) => n.to_string(),
    }
}

impl ArtifactNamer {
    /// Constructs a namer writing under `base_dir`.
    pub fn new(base_dir: impl AsRef<Path>, ckpt_path: &str, env: &EnvConfig, tmp_exp: bool) -> Self {
        let root = if tmp_exp { "results_tmp" } else { "results" };
        let control_mode = if env.control_mode.is_empty() {
            "None"
        } else {
            env.control_mode.as_str()
        };
        let env_save_name = env
            .additional_kwargs
            .iter()
            .fold(env.env_name.clone(), |name, (k, v)| format!("{}_{}_{}", name, k, v));
        let overlay = env
            .rgb_overlay_path
            .as_ref()
            .and_then(|p| p.file_stem())
            .map_or_else(|| "None".to_string(), |s| s.to_string_lossy().into_owned());

        Self {
            experiment_dir: base_dir
                .as_ref()
                .join(root)
                .join(ckpt_basename(ckpt_path))
                .join(&env.scene_name)
                .join(control_mode)
                .join(env_save_name),
            overlay,
        }
    }

    /// Directory shared by the episodes of an experiment.
    pub fn experiment_dir(&self) -> &Path {
        &self.experiment_dir
    }

    /// Directory of the episodes starting from the robot pose of `cond`.
    ///
    /// The orientation of the robot is not part of the name.
    pub fn episode_dir(&self, cond: &InitialCondition) -> PathBuf {
        self.experiment_dir.join(format!(
            "rob_{}_{}_rgb_overlay_{}",
            fmt_py_float(cond.robot_x),
            fmt_py_float(cond.robot_y),
            self.overlay
        ))
    }

    /// File stem of the artifacts of an episode.
    pub fn stem(outcome: Outcome, cond: &InitialCondition, stats: &EpisodeStats) -> String {
        stats.labels().iter().fold(
            format!(
                "{}_obj_{}_{}",
                outcome,
                fmt_py_float(cond.object_x),
                fmt_py_float(cond.object_y)
            ),
            |stem, (k, v)| format!("{}_{}_{}", stem, k, fmt_stat(v)),
        )
    }

    /// Paths of the artifacts of an episode.
    pub fn paths(&self, cond: &InitialCondition, outcome: Outcome, stats: &EpisodeStats) -> EpisodePaths {
        let dir = self.episode_dir(cond);
        let stem = Self::stem(outcome, cond, stats);
        EpisodePaths {
            video: dir.join(format!("{}.mp4", stem)),
            actions: dir.join("actions").join(format!("{}.png", stem)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{kwargs::BuildKwargs, TaskFamily};
    use anyhow::Result;

    fn cond() -> InitialCondition {
        InitialCondition {
            robot_x: 0.35,
            robot_y: 0.2,
            robot_orientation: [1.0, 0.0, 0.0, 0.0],
            object_x: -0.2925,
            object_y: 0.2,
        }
    }

    fn env_config() -> EnvConfig {
        EnvConfig::default()
            .env_name("GraspSingleOpenedCokeCanInScene-v0")
            .control_mode("arm_pd_ee_delta_pose_align_gripper_pd_joint_pos")
    }

    #[test]
    fn test_ckpt_basename() {
        assert_eq!(ckpt_basename("/ckpts/rt_1_x_tf_trained_for_002272480_step/"), "rt_1_x_tf_trained_for_002272480_step");
        assert_eq!(ckpt_basename("/ckpts/rt1"), "rt1");
        assert_eq!(ckpt_basename("rt1"), "rt1");
        assert_eq!(ckpt_basename("None"), "None");
    }

    #[test]
    fn test_paths() {
        let namer = ArtifactNamer::new("", "/ckpts/rt1/", &env_config(), false);
        let paths = namer.paths(&cond(), Outcome::Failure, &EpisodeStats::new(TaskFamily::Other));
        let dir = "results/rt1/google_pick_coke_can_1_v4/arm_pd_ee_delta_pose_align_gripper_pd_joint_pos\
                   /GraspSingleOpenedCokeCanInScene-v0/rob_0.35_0.2_rgb_overlay_None";
        assert_eq!(
            paths.video,
            PathBuf::from(format!("{}/failure_obj_-0.2925_0.2.mp4", dir))
        );
        assert_eq!(
            paths.actions,
            PathBuf::from(format!("{}/actions/failure_obj_-0.2925_0.2.png", dir))
        );
    }

    #[test]
    fn test_tmp_exp_overlay_and_kwargs() -> Result<()> {
        let config = env_config()
            .rgb_overlay_path(Some("/data/real_inpainting/google_coke_can_real_eval_1.png"))
            .additional_kwargs(BuildKwargs::parse(&["lr_switch=True", "urdf_version=recolor_tabletop"])?);
        let namer = ArtifactNamer::new("/tmp/out", "rt1", &config, true);

        assert_eq!(
            namer.experiment_dir(),
            Path::new(
                "/tmp/out/results_tmp/rt1/google_pick_coke_can_1_v4\
                 /arm_pd_ee_delta_pose_align_gripper_pd_joint_pos\
                 /GraspSingleOpenedCokeCanInScene-v0_lr_switch_True_urdf_version_recolor_tabletop"
            )
        );
        assert!(namer
            .episode_dir(&cond())
            .ends_with("rob_0.35_0.2_rgb_overlay_google_coke_can_real_eval_1"));
        Ok(())
    }

    #[test]
    fn test_quoted_list_kwargs_in_env_dir() -> Result<()> {
        let config = env_config().additional_kwargs(BuildKwargs::parse(&["objs=\"['a','b']\""])?);
        let namer = ArtifactNamer::new("", "rt1", &config, false);
        assert!(namer
            .experiment_dir()
            .ends_with("GraspSingleOpenedCokeCanInScene-v0_objs_['a', 'b']"));
        Ok(())
    }

    #[test]
    fn test_stem_with_stats() {
        let stats = EpisodeStats::Grasp {
            n_lift_significant: 3,
            consec_grasp: true,
            grasped: false,
        };
        assert_eq!(
            ArtifactNamer::stem(Outcome::Success, &cond(), &stats),
            "success_obj_-0.2925_0.2_n_lift_significant_3_consec_grasp_True_grasped_False"
        );

        let stats = EpisodeStats::MoveNear {
            moved_correct_obj: true,
            moved_wrong_obj: false,
        };
        assert_eq!(
            ArtifactNamer::stem(Outcome::Failure, &cond(), &stats),
            "failure_obj_-0.2925_0.2_moved_correct_obj_True_moved_wrong_obj_False"
        );
    }

    #[test]
    fn test_naming_is_deterministic() {
        let a = ArtifactNamer::new(".", "rt1", &env_config(), false);
        let b = ArtifactNamer::new(".", "rt1", &env_config(), false);
        let stats = EpisodeStats::new(TaskFamily::Grasp);
        assert_eq!(a.paths(&cond(), Outcome::Success, &stats), b.paths(&cond(), Outcome::Success, &stats));
    }
}
