//! Environment step.
use super::Observation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value in a [`StepInfo`] record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InfoValue {
    /// Boolean flag.
    Bool(bool),

    /// Numeric value.
    Number(f64),

    /// Anything else, in its textual form.
    Text(String),
}

impl InfoValue {
    /// Truthiness of the value.
    ///
    /// Numbers are true when non-zero, text when non-empty.
    pub fn as_bool(&self) -> bool {
        match self {
            InfoValue::Bool(b) => *b,
            InfoValue::Number(v) => *v != 0.0,
            InfoValue::Text(s) => !s.is_empty(),
        }
    }

    /// Numeric value, with booleans mapped to 0 and 1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            InfoValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            InfoValue::Number(v) => Some(*v),
            InfoValue::Text(_) => None,
        }
    }
}

impl fmt::Display for InfoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfoValue::Bool(b) => write!(f, "{}", b),
            InfoValue::Number(v) => write!(f, "{}", v),
            InfoValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Information returned by the environment at every step.
///
/// Keys keep the order in which the environment reported them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StepInfo(Vec<(String, InfoValue)>);

impl StepInfo {
    /// Creates an empty record.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Creates a record from key-value pairs.
    pub fn from_slice<K: Into<String> + Clone>(s: &[(K, InfoValue)]) -> Self {
        let mut info = Self::empty();
        for (k, v) in s.iter() {
            info.insert(k.clone(), v.clone());
        }
        info
    }

    /// Inserts a value, replacing the previous one of the same key.
    pub fn insert(&mut self, k: impl Into<String>, v: InfoValue) {
        let k = k.into();
        match self.0.iter_mut().find(|(key, _)| *key == k) {
            Some((_, value)) => *value = v,
            None => self.0.push((k, v)),
        }
    }

    /// Gets the value of a key.
    pub fn get(&self, k: &str) -> Option<&InfoValue> {
        self.0.iter().find(|(key, _)| key == k).map(|(_, v)| v)
    }

    /// Truthiness of a key; missing keys are false.
    pub fn flag(&self, k: &str) -> bool {
        self.get(k).map_or(false, InfoValue::as_bool)
    }

    /// Numeric value of a key.
    pub fn number(&self, k: &str) -> Option<f64> {
        self.get(k).and_then(InfoValue::as_f64)
    }

    /// The environment's success verdict at this step.
    pub fn success(&self) -> bool {
        self.flag("success")
    }

    /// Iterates over key-value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &InfoValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns `true` if the record has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of [`Env::step`](crate::Env::step).
#[derive(Clone, Debug)]
pub struct Step {
    /// Observation after the action.
    pub obs: Observation,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if the environment terminated the episode.
    pub is_terminated: bool,

    /// Flag denoting if the episode reached the step ceiling.
    pub is_truncated: bool,

    /// Information reported by the environment.
    pub info: StepInfo,
}

impl Step {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: Observation,
        reward: f32,
        is_terminated: bool,
        is_truncated: bool,
        info: StepInfo,
    ) -> Self {
        Step {
            obs,
            reward,
            is_terminated,
            is_truncated,
            info,
        }
    }
}
