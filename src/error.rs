use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Which of the three model files a load error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFile {
    Summary,
    Rewards,
    Transitions,
}

impl fmt::Display for ModelFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelFile::Summary => ".summary",
            ModelFile::Rewards => ".rewards",
            ModelFile::Transitions => ".transitions",
        };
        f.write_str(name)
    }
}

/// Fatal errors raised while building a model. There is no partial load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{file} file {} could not be read: {source}", path.display())]
    Io {
        file: ModelFile,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{file} line {line}: malformed entry ({reason})")]
    Malformed {
        file: ModelFile,
        line: usize,
        reason: String,
    },
    #[error("{file} line {line}: {field} {value} outside of [{min}, {max}]")]
    OutOfRange {
        file: ModelFile,
        line: usize,
        field: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },
    #[error("{file} line {line}: invalid value {value}")]
    InvalidProbability {
        file: ModelFile,
        line: usize,
        value: f64,
    },
    #[error("inconsistent summary: {declared} observations declared, {expected} expected for {n_actions} actions and history length {history_length}")]
    InconsistentSummary {
        declared: usize,
        expected: usize,
        n_actions: usize,
        history_length: usize,
    },
    #[error("transition table for {n_profiles} profiles of {n_observations} nodes and {n_actions} actions does not fit in memory")]
    TableTooLarge {
        n_profiles: usize,
        n_observations: usize,
        n_actions: usize,
    },
    #[error("missing item {item} in .rewards file")]
    MissingReward { item: usize },
    #[error(".rewards line {line}: item {item} listed twice")]
    DuplicateReward { line: usize, item: usize },
    #[error("incomplete transition function in profile {profile}: expected {expected} entries, found {found}")]
    RowCount {
        profile: usize,
        expected: usize,
        found: usize,
    },
    #[error("wrong number of profiles in .transitions file: expected {expected}, found {found}")]
    ProfileCount { expected: usize, found: usize },
    #[error(".transitions line {line}: unfeasible transition {s1} -> {s2} with probability {probability}")]
    Disconnected {
        line: usize,
        s1: usize,
        s2: usize,
        probability: f64,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {key}")]
    Missing { key: &'static str },
    #[error("invalid configuration: {0}")]
    Invalid(String),
    #[error("config file {} could not be read: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Error returned by the one-shot `RecoModel::load`
#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Load(#[from] LoadError),
}
