use serde::{Deserialize, Serialize};

/// Tolerance used when checking that a normalized row sums to one
pub const ROW_SUM_TOLERANCE: f64 = 1e-9;
pub const DEFAULT_DISCOUNT: f64 = 0.95;

/// Dense id of a node in the recency-window tree, in `[0, N)`
pub type NodeId = usize;
/// Dense id of a state: `environment * N + node` (or `node` in plain MDP mode)
pub type StateId = usize;
/// Item / action / edge label, in `[0, K)`
pub type Item = usize;
pub type EnvId = usize;

/// Summation strategy used when normalizing transition rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Plain running sum
    #[default]
    Standard,
    /// Kahan compensated summation (slower, less drift)
    Compensated,
}

impl Precision {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" | "plain" => Some(Precision::Standard),
            "compensated" | "kahan" | "precise" => Some(Precision::Compensated),
            _ => None,
        }
    }
}

/// The four counts declared by a `.summary` file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub n_observations: usize,
    pub n_actions: usize,
    pub n_environments: usize,
    pub history_length: usize,
}

/// Read-only description of a loaded model, logged at load time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub n_observations: usize,
    pub n_actions: usize,
    pub n_environments: usize,
    pub n_states: usize,
    pub history_length: usize,
    pub environments_disabled: bool,
    pub discount: f64,
}

impl ModelSummary {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
