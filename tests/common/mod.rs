#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use recomodel::{HistoryIndex, ModelConfig};
use tempfile::TempDir;

/// Model files written under a temporary directory
pub struct Fixture {
    pub dir: TempDir,
    pub base: PathBuf,
}

impl Fixture {
    pub fn new(summary: &str, rewards: &str, transitions: &str) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let base = dir.path().join("model");
        let fixture = Self { dir, base };
        fixture.write("summary", summary);
        fixture.write("rewards", rewards);
        fixture.write("transitions", transitions);
        fixture
    }

    pub fn write(&self, ext: &str, content: &str) {
        fs::write(self.path(ext), content).expect("write fixture file");
    }

    pub fn path(&self, ext: &str) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.base.display(), ext))
    }

    pub fn config(&self) -> ModelConfig {
        ModelConfig::from_base_name(&self.base)
    }
}

pub fn summary(n: usize, k: usize, e: usize, h: usize) -> String {
    format!("{}\n{}\n{}\n{}\n", n, k, e, h)
}

pub fn rewards(values: &[f64]) -> String {
    values
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{} {}\n", i + 1, r))
        .collect()
}

/// One profile of `N * K * K` lines; `prob(node, action, link)` gives the
/// mass put on the child reached by `link`.
pub fn profile<F>(index: &HistoryIndex, prob: F) -> String
where
    F: Fn(usize, usize, usize) -> f64,
{
    let k = index.n_actions();
    let mut out = String::new();
    for node in 0..index.n_observations() {
        for action in 0..k {
            for link in 0..k {
                let s2 = index.next_state(node, link);
                out.push_str(&format!("{} {} {} {}\n", node, action + 1, s2, prob(node, action, link)));
            }
        }
    }
    out
}

/// Profiles joined by blank separator lines
pub fn profiles(parts: &[String]) -> String {
    parts.join("\n")
}
