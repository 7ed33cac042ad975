//! Action emitted by a policy.
use serde::{Deserialize, Serialize};

/// Structured action of a manipulation policy.
///
/// The environment consumes the 7-dimensional vector
/// `world_vector ++ rot_axangle ++ gripper`, see [`Action::env_vector`].
/// `terminate_episode` is not sent to the environment; it is the policy's
/// declaration that the task is finished.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Action {
    /// End-effector translation.
    pub world_vector: [f64; 3],

    /// End-effector rotation in axis-angle form.
    pub rot_axangle: [f64; 3],

    /// Gripper command.
    pub gripper: f64,

    /// Positive when the policy declares the episode finished.
    pub terminate_episode: f64,
}

impl Action {
    /// Returns `true` if the policy declares the episode finished.
    pub fn terminates(&self) -> bool {
        self.terminate_episode > 0.0
    }

    /// The action vector passed to [`Env::step`](crate::Env::step).
    pub fn env_vector(&self) -> [f64; 7] {
        let [x, y, z] = self.world_vector;
        let [rx, ry, rz] = self.rot_axangle;
        [x, y, z, rx, ry, rz, self.gripper]
    }

    /// Sets the translation.
    pub fn world_vector(mut self, v: [f64; 3]) -> Self {
        self.world_vector = v;
        self
    }

    /// Sets the rotation.
    pub fn rot_axangle(mut self, v: [f64; 3]) -> Self {
        self.rot_axangle = v;
        self
    }

    /// Sets the gripper command.
    pub fn gripper(mut self, v: f64) -> Self {
        self.gripper = v;
        self
    }

    /// Sets the termination flag.
    pub fn terminate_episode(mut self, v: f64) -> Self {
        self.terminate_episode = v;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_vector_order() {
        let act = Action::default()
            .world_vector([1.0, 2.0, 3.0])
            .rot_axangle([4.0, 5.0, 6.0])
            .gripper(7.0)
            .terminate_episode(1.0);
        assert_eq!(act.env_vector(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_terminates_strictly_positive() {
        assert!(!Action::default().terminates());
        assert!(!Action::default().terminate_episode(-1.0).terminates());
        assert!(Action::default().terminate_episode(0.5).terminates());
    }
}
