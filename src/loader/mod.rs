//! Loading of `.summary`, `.rewards` and `.transitions` files
//!
//! All three formats are line oriented with whitespace separated fields:
//! - summary: `N`, `K`, `E`, `H`, one per line
//! - rewards: `K` lines of `item reward`, items 1-indexed
//! - transitions: profiles of exactly `N * K * K` lines `s1 a s2 p`
//!   (`a` 1-indexed); any line that does not read as such a record,
//!   blank or not, closes the current profile
//!
//! Any inconsistency aborts the whole load.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::error::{LoadError, ModelFile};
use crate::history::HistoryIndex;
use crate::transition::{TransitionModel, TransitionTable};
use crate::types::{Dimensions, Precision};

fn open(file: ModelFile, path: &Path) -> Result<BufReader<File>, LoadError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LoadError::Io {
            file,
            path: path.to_path_buf(),
            source,
        })
}

/// Numbered lines of a reader, 1-based
fn numbered_lines<R: BufRead>(
    file: ModelFile,
    reader: R,
) -> impl Iterator<Item = Result<(usize, String), LoadError>> {
    reader.lines().enumerate().map(move |(i, line)| {
        line.map(|l| (i + 1, l)).map_err(|e| LoadError::Malformed {
            file,
            line: i + 1,
            reason: e.to_string(),
        })
    })
}

fn parse_field<T: FromStr>(
    file: ModelFile,
    line: usize,
    name: &str,
    token: &str,
) -> Result<T, LoadError> {
    token.parse::<T>().map_err(|_| LoadError::Malformed {
        file,
        line,
        reason: format!("{} is not a valid {}", token, name),
    })
}

fn expect_fields<'a>(
    file: ModelFile,
    line: usize,
    text: &'a str,
    count: usize,
) -> Result<Vec<&'a str>, LoadError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != count {
        return Err(LoadError::Malformed {
            file,
            line,
            reason: format!("expected {} fields, found {}", count, fields.len()),
        });
    }
    Ok(fields)
}

fn check_range(
    file: ModelFile,
    line: usize,
    field: &'static str,
    value: usize,
    min: usize,
    max: usize,
) -> Result<(), LoadError> {
    if value < min || value > max {
        return Err(LoadError::OutOfRange {
            file,
            line,
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

// ==================== Summary ====================

pub fn load_summary(path: &Path) -> Result<Dimensions, LoadError> {
    parse_summary(open(ModelFile::Summary, path)?)
}

pub fn parse_summary<R: BufRead>(reader: R) -> Result<Dimensions, LoadError> {
    const FILE: ModelFile = ModelFile::Summary;
    const NAMES: [&str; 4] = [
        "observation count",
        "action count",
        "environment count",
        "history length",
    ];

    let mut values = Vec::with_capacity(4);
    for entry in numbered_lines(FILE, reader) {
        let (line, text) = entry?;
        if values.len() == NAMES.len() {
            break;
        }
        let fields = expect_fields(FILE, line, &text, 1)?;
        let value: usize = parse_field(FILE, line, NAMES[values.len()], fields[0])?;
        if value == 0 {
            return Err(LoadError::Malformed {
                file: FILE,
                line,
                reason: format!("{} must be positive", NAMES[values.len()]),
            });
        }
        values.push(value);
    }

    if values.len() < NAMES.len() {
        return Err(LoadError::Malformed {
            file: FILE,
            line: values.len() + 1,
            reason: format!("missing {}", NAMES[values.len()]),
        });
    }

    let dims = Dimensions {
        n_observations: values[0],
        n_actions: values[1],
        n_environments: values[2],
        history_length: values[3],
    };

    let expected = HistoryIndex::expected_node_count(dims.n_actions, dims.history_length)
        .unwrap_or(usize::MAX);
    if dims.n_observations != expected {
        return Err(LoadError::InconsistentSummary {
            declared: dims.n_observations,
            expected,
            n_actions: dims.n_actions,
            history_length: dims.history_length,
        });
    }

    tracing::info!(
        observations = dims.n_observations,
        actions = dims.n_actions,
        environments = dims.n_environments,
        history_length = dims.history_length,
        "summary loaded"
    );
    Ok(dims)
}

// ==================== Rewards ====================

pub fn load_rewards(path: &Path, n_actions: usize) -> Result<Vec<f64>, LoadError> {
    parse_rewards(open(ModelFile::Rewards, path)?, n_actions)
}

/// `rewards[item - 1]` for each `item reward` line; every item exactly once
pub fn parse_rewards<R: BufRead>(reader: R, n_actions: usize) -> Result<Vec<f64>, LoadError> {
    const FILE: ModelFile = ModelFile::Rewards;

    let mut rewards: Vec<Option<f64>> = vec![None; n_actions];
    for entry in numbered_lines(FILE, reader) {
        let (line, text) = entry?;
        if text.trim().is_empty() {
            continue;
        }
        let fields = expect_fields(FILE, line, &text, 2)?;
        let item: usize = parse_field(FILE, line, "item", fields[0])?;
        let value: f64 = parse_field(FILE, line, "reward", fields[1])?;

        check_range(FILE, line, "item", item, 1, n_actions)?;
        if !value.is_finite() {
            return Err(LoadError::InvalidProbability {
                file: FILE,
                line,
                value,
            });
        }

        let slot = &mut rewards[item - 1];
        if slot.is_some() {
            return Err(LoadError::DuplicateReward { line, item });
        }
        *slot = Some(value);
    }

    let rewards = rewards
        .into_iter()
        .enumerate()
        .map(|(i, r)| r.ok_or(LoadError::MissingReward { item: i + 1 }))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(items = rewards.len(), "rewards loaded");
    Ok(rewards)
}

// ==================== Transitions ====================

/// One `s1 a s2 p` line of a transitions file
#[derive(Debug, Clone, Copy)]
struct Record {
    s1: usize,
    a: usize,
    s2: usize,
    p: f64,
}

impl Record {
    /// Reads the four leading fields; `None` marks a profile separator.
    fn parse(text: &str) -> Option<Self> {
        let mut fields = text.split_whitespace();
        Some(Self {
            s1: fields.next()?.parse().ok()?,
            a: fields.next()?.parse().ok()?,
            s2: fields.next()?.parse().ok()?,
            p: fields.next()?.parse().ok()?,
        })
    }
}

/// Per-file parsing context, dropped on every exit path
struct TransitionParser<'a> {
    index: &'a HistoryIndex,
    table: TransitionTable,
    expected_rows: usize,
    merge_profiles: bool,
    profiles_found: usize,
    rows_in_profile: usize,
}

impl<'a> TransitionParser<'a> {
    fn new(index: &'a HistoryIndex) -> Self {
        let n = index.n_observations();
        let k = index.n_actions();
        let merge_profiles = index.environments_disabled();
        let n_profiles = if merge_profiles { 1 } else { index.n_environments() };
        Self {
            index,
            table: TransitionTable::zeros(n_profiles, n, k),
            expected_rows: n * k * k,
            merge_profiles,
            profiles_found: 0,
            rows_in_profile: 0,
        }
    }

    fn max_profiles(&self) -> usize {
        self.index.n_environments()
    }

    fn close_profile(&mut self) -> Result<(), LoadError> {
        if self.rows_in_profile != self.expected_rows {
            return Err(LoadError::RowCount {
                profile: self.profiles_found,
                expected: self.expected_rows,
                found: self.rows_in_profile,
            });
        }
        tracing::debug!(profile = self.profiles_found, rows = self.rows_in_profile, "profile parsed");
        self.profiles_found += 1;
        self.rows_in_profile = 0;
        Ok(())
    }

    fn add_record(&mut self, line: usize, record: Record) -> Result<(), LoadError> {
        const FILE: ModelFile = ModelFile::Transitions;

        if self.rows_in_profile == 0 && self.profiles_found == self.max_profiles() {
            return Err(LoadError::ProfileCount {
                expected: self.max_profiles(),
                found: self.profiles_found + 1,
            });
        }

        let Record { s1, a, s2, p } = record;
        let n = self.index.n_observations();
        let k = self.index.n_actions();
        check_range(FILE, line, "state", s1, 0, n - 1)?;
        check_range(FILE, line, "action", a, 1, k)?;
        check_range(FILE, line, "state", s2, 0, n - 1)?;
        if !p.is_finite() || p < 0.0 {
            return Err(LoadError::InvalidProbability {
                file: FILE,
                line,
                value: p,
            });
        }

        self.rows_in_profile += 1;
        if self.rows_in_profile > self.expected_rows {
            return Err(LoadError::RowCount {
                profile: self.profiles_found,
                expected: self.expected_rows,
                found: self.rows_in_profile,
            });
        }

        // file states are node ids, so connectivity is checked on nodes
        match self.index.is_connected(s1, s2) {
            Some(link) => {
                let profile = if self.merge_profiles { 0 } else { self.profiles_found };
                self.table.add(profile, s1, a - 1, link, p);
            }
            None if p > 0.0 => {
                return Err(LoadError::Disconnected {
                    line,
                    s1,
                    s2,
                    probability: p,
                });
            }
            None => {}
        }
        Ok(())
    }

    fn finish(mut self) -> Result<TransitionTable, LoadError> {
        if self.rows_in_profile > 0 {
            self.close_profile()?;
        }

        let declared = self.index.n_environments();
        let accepted = if self.merge_profiles {
            // a single merged profile, or one per environment
            self.profiles_found == 1 || self.profiles_found == declared
        } else {
            self.profiles_found == declared
        };
        if !accepted {
            return Err(LoadError::ProfileCount {
                expected: declared,
                found: self.profiles_found,
            });
        }

        tracing::info!(profiles = self.profiles_found, "transitions loaded");
        Ok(self.table)
    }
}

pub fn load_transitions(
    path: &Path,
    index: &HistoryIndex,
    precision: Precision,
) -> Result<TransitionTable, LoadError> {
    parse_transitions(open(ModelFile::Transitions, path)?, index, precision)
}

/// Parse every profile, then normalize each `(profile, node, action)` row
pub fn parse_transitions<R: BufRead>(
    reader: R,
    index: &HistoryIndex,
    precision: Precision,
) -> Result<TransitionTable, LoadError> {
    let mut parser = TransitionParser::new(index);
    for entry in numbered_lines(ModelFile::Transitions, reader) {
        let (line, text) = entry?;
        match Record::parse(&text) {
            Some(record) => parser.add_record(line, record)?,
            None if parser.rows_in_profile > 0 => parser.close_profile()?,
            None => {}
        }
    }

    let mut table = parser.finish()?;
    let fallback = table.normalize(precision);
    if fallback > 0 {
        tracing::warn!(rows = fallback, "rows without probability mass set to uniform");
    }
    tracing::debug!(?precision, "transition rows normalized");
    Ok(table)
}

// ==================== Model ====================

/// Load all three files into a validated, normalized model
pub fn load_model(
    summary_path: &Path,
    rewards_path: &Path,
    transitions_path: &Path,
    environments_disabled: bool,
    precision: Precision,
) -> Result<TransitionModel, LoadError> {
    let dims = load_summary(summary_path)?;
    let index = index_for(&dims, environments_disabled)?;
    let rewards = load_rewards(rewards_path, dims.n_actions)?;
    let table = load_transitions(transitions_path, &index, precision)?;
    Ok(TransitionModel::new(index, table, rewards))
}

/// Index for validated dimensions
pub fn index_for(dims: &Dimensions, environments_disabled: bool) -> Result<HistoryIndex, LoadError> {
    let n_profiles = if environments_disabled {
        1
    } else {
        dims.n_environments
    };
    let Some(expected) = HistoryIndex::expected_node_count(dims.n_actions, dims.history_length)
    else {
        return Err(LoadError::InconsistentSummary {
            declared: dims.n_observations,
            expected: usize::MAX,
            n_actions: dims.n_actions,
            history_length: dims.history_length,
        });
    };
    HistoryIndex::new(
        dims.n_actions,
        dims.history_length,
        dims.n_environments,
        environments_disabled,
    )
    .ok_or(LoadError::TableTooLarge {
        n_profiles,
        n_observations: expected,
        n_actions: dims.n_actions,
    })
}
