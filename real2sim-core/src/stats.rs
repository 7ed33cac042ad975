//! Per-episode statistics specific to task families.
//!
//! Task families define success differently when the policy never declares the
//! episode finished. Each family accumulates its own statistics from the
//! [`StepInfo`] records of an episode and judges success at truncation from
//! them and the last record. The statistics also label the saved artifacts.
use crate::{error::Real2SimError, StepInfo};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A class of environments sharing a success rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFamily {
    /// Grasp an object and lift it, `GraspSingle*`.
    Grasp,

    /// Move an object near another one, `MoveNear*`.
    MoveNear,

    /// Open or close a drawer, `OpenDrawer*` and `CloseDrawer*`.
    Drawer,

    /// Any other environment. No statistics, no success at truncation.
    Other,
}

impl TaskFamily {
    /// Infers the family from the name of an environment.
    pub fn infer(env_name: &str) -> Self {
        if env_name.contains("GraspSingle") {
            TaskFamily::Grasp
        } else if env_name.contains("MoveNear") {
            TaskFamily::MoveNear
        } else if env_name.contains("OpenDrawer") || env_name.contains("CloseDrawer") {
            TaskFamily::Drawer
        } else {
            TaskFamily::Other
        }
    }

    /// Identifier used in configurations.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskFamily::Grasp => "grasp",
            TaskFamily::MoveNear => "move_near",
            TaskFamily::Drawer => "drawer",
            TaskFamily::Other => "other",
        }
    }
}

impl fmt::Display for TaskFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFamily {
    type Err = Real2SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grasp" => Ok(TaskFamily::Grasp),
            "move_near" => Ok(TaskFamily::MoveNear),
            "drawer" => Ok(TaskFamily::Drawer),
            "other" => Ok(TaskFamily::Other),
            _ => Err(Real2SimError::UnknownTaskFamily(s.to_string())),
        }
    }
}

/// A labelled statistic, rendered into artifact names.
#[derive(Clone, Debug, PartialEq)]
pub enum StatValue {
    /// Sticky flag.
    Flag(bool),

    /// Counter.
    Count(u32),
}

/// Statistics accumulated over one episode.
///
/// Updates are monotonic: flags once set stay set, counters and maxima never
/// decrease.
#[derive(Clone, Debug, PartialEq)]
pub enum EpisodeStats {
    /// Statistics of [`TaskFamily::Grasp`].
    Grasp {
        /// Steps at which the object was lifted significantly.
        n_lift_significant: u32,
        /// The object was grasped for consecutive steps at some point.
        consec_grasp: bool,
        /// The object was grasped at some point.
        grasped: bool,
    },

    /// Statistics of [`TaskFamily::MoveNear`].
    MoveNear {
        /// The source object was moved at some point.
        moved_correct_obj: bool,
        /// Another object was moved at some point.
        moved_wrong_obj: bool,
    },

    /// Statistics of [`TaskFamily::Drawer`].
    Drawer {
        /// Largest drawer joint position seen.
        max_qpos: f64,
    },

    /// No statistics.
    Other,
}

impl EpisodeStats {
    /// Statistics at the start of an episode.
    pub fn new(family: TaskFamily) -> Self {
        match family {
            TaskFamily::Grasp => EpisodeStats::Grasp {
                n_lift_significant: 0,
                consec_grasp: false,
                grasped: false,
            },
            TaskFamily::MoveNear => EpisodeStats::MoveNear {
                moved_correct_obj: false,
                moved_wrong_obj: false,
            },
            TaskFamily::Drawer => EpisodeStats::Drawer {
                max_qpos: f64::NEG_INFINITY,
            },
            TaskFamily::Other => EpisodeStats::Other,
        }
    }

    /// Folds the information of a step into the statistics.
    pub fn update(&mut self, info: &StepInfo) {
        match self {
            EpisodeStats::Grasp {
                n_lift_significant,
                consec_grasp,
                grasped,
            } => {
                if info.flag("lifted_object_significantly") {
                    *n_lift_significant += 1;
                }
                *consec_grasp |= info.flag("consecutive_grasp");
                *grasped |= info.flag("is_grasped");
            }
            EpisodeStats::MoveNear {
                moved_correct_obj,
                moved_wrong_obj,
            } => {
                *moved_correct_obj |= info.flag("moved_correct_obj");
                *moved_wrong_obj |= info.flag("moved_wrong_obj");
            }
            EpisodeStats::Drawer { max_qpos } => {
                if let Some(qpos) = info.number("qpos") {
                    *max_qpos = max_qpos.max(qpos);
                }
            }
            EpisodeStats::Other => {}
        }
    }

    /// Success of an episode that ended without a confirmed termination.
    ///
    /// `last_info` is the information of the last step; `None` when no step
    /// was taken.
    pub fn truncation_success(&self, last_info: Option<&StepInfo>) -> bool {
        let success = last_info.map_or(false, StepInfo::success);
        match self {
            EpisodeStats::Grasp {
                n_lift_significant, ..
            } => success && *n_lift_significant > 0,
            EpisodeStats::MoveNear {
                moved_correct_obj,
                moved_wrong_obj,
            } => success && *moved_correct_obj && !*moved_wrong_obj,
            EpisodeStats::Drawer { .. } => success,
            EpisodeStats::Other => false,
        }
    }

    /// Statistics as ordered `(name, value)` pairs.
    pub fn labels(&self) -> Vec<(&'static str, StatValue)> {
        match self {
            EpisodeStats::Grasp {
                n_lift_significant,
                consec_grasp,
                grasped,
            } => vec![
                ("n_lift_significant", StatValue::Count(*n_lift_significant)),
                ("consec_grasp", StatValue::Flag(*consec_grasp)),
                ("grasped", StatValue::Flag(*grasped)),
            ],
            EpisodeStats::MoveNear {
                moved_correct_obj,
                moved_wrong_obj,
            } => vec![
                ("moved_correct_obj", StatValue::Flag(*moved_correct_obj)),
                ("moved_wrong_obj", StatValue::Flag(*moved_wrong_obj)),
            ],
            EpisodeStats::Drawer { .. } | EpisodeStats::Other => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InfoValue::{Bool, Number};

    fn info(pairs: &[(&str, crate::InfoValue)]) -> StepInfo {
        StepInfo::from_slice(pairs)
    }

    #[test]
    fn test_infer_family() {
        assert_eq!(TaskFamily::infer("GraspSingleOpenedCokeCanInScene-v0"), TaskFamily::Grasp);
        assert_eq!(TaskFamily::infer("MoveNearGoogleInScene-v0"), TaskFamily::MoveNear);
        assert_eq!(TaskFamily::infer("OpenDrawerCustomInScene-v0"), TaskFamily::Drawer);
        assert_eq!(TaskFamily::infer("CloseDrawerCustomInScene-v0"), TaskFamily::Drawer);
        assert_eq!(TaskFamily::infer("PickCube-v0"), TaskFamily::Other);
        assert_eq!("move_near".parse::<TaskFamily>().unwrap(), TaskFamily::MoveNear);
        assert!("pour".parse::<TaskFamily>().is_err());
    }

    #[test]
    fn test_grasp_flags_are_sticky() {
        let mut stats = EpisodeStats::new(TaskFamily::Grasp);
        stats.update(&info(&[
            ("is_grasped", Bool(true)),
            ("consecutive_grasp", Bool(true)),
            ("lifted_object_significantly", Bool(true)),
        ]));
        stats.update(&info(&[
            ("is_grasped", Bool(false)),
            ("consecutive_grasp", Bool(false)),
            ("lifted_object_significantly", Bool(false)),
        ]));
        assert_eq!(
            stats,
            EpisodeStats::Grasp {
                n_lift_significant: 1,
                consec_grasp: true,
                grasped: true
            }
        );
    }

    #[test]
    fn test_grasp_truncation_success() {
        let mut stats = EpisodeStats::new(TaskFamily::Grasp);
        let last = info(&[("success", Bool(true))]);
        assert!(!stats.truncation_success(Some(&last)));

        stats.update(&info(&[("lifted_object_significantly", Bool(true))]));
        assert!(stats.truncation_success(Some(&last)));
        assert!(!stats.truncation_success(Some(&info(&[("success", Bool(false))]))));
        assert!(!stats.truncation_success(None));
    }

    #[test]
    fn test_move_near_wrong_object_spoils_success() {
        let last = info(&[("success", Bool(true))]);
        let mut stats = EpisodeStats::new(TaskFamily::MoveNear);
        stats.update(&info(&[("moved_correct_obj", Bool(true))]));
        assert!(stats.truncation_success(Some(&last)));

        stats.update(&info(&[("moved_wrong_obj", Bool(true))]));
        stats.update(&info(&[("moved_wrong_obj", Bool(false))]));
        assert!(!stats.truncation_success(Some(&last)));
    }

    #[test]
    fn test_drawer_tracks_max_qpos() {
        let mut stats = EpisodeStats::new(TaskFamily::Drawer);
        stats.update(&info(&[("qpos", Number(0.1))]));
        stats.update(&info(&[("qpos", Number(0.3))]));
        stats.update(&info(&[("qpos", Number(0.2))]));
        assert_eq!(stats, EpisodeStats::Drawer { max_qpos: 0.3 });
        assert!(stats.truncation_success(Some(&info(&[("success", Bool(true))]))));
    }

    #[test]
    fn test_other_family_is_no_op() {
        let mut stats = EpisodeStats::new(TaskFamily::Other);
        stats.update(&info(&[("success", Bool(true)), ("is_grasped", Bool(true))]));
        assert_eq!(stats, EpisodeStats::Other);
        assert!(stats.labels().is_empty());
        assert!(!stats.truncation_success(Some(&info(&[("success", Bool(true))]))));
    }

    #[test]
    fn test_labels_order() {
        let names: Vec<_> = EpisodeStats::new(TaskFamily::Grasp)
            .labels()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(names, vec!["n_lift_significant", "consec_grasp", "grasped"]);
    }
}
