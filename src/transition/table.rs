use crate::sanitize::{is_stochastic, normalize_row};
use crate::types::{Item, NodeId, Precision};

/// Dense `(profile, node, action, link)` probability table
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTable {
    n_profiles: usize,
    n_nodes: usize,
    n_actions: usize,
    data: Vec<f64>,
}

impl TransitionTable {
    /// Sized from an index built by `HistoryIndex::new`, which rejects
    /// shapes whose entry count overflows `usize`.
    pub fn zeros(n_profiles: usize, n_nodes: usize, n_actions: usize) -> Self {
        Self {
            n_profiles,
            n_nodes,
            n_actions,
            data: vec![0.0; n_profiles * n_nodes * n_actions * n_actions],
        }
    }

    pub fn shape(&self) -> (usize, usize, usize, usize) {
        (self.n_profiles, self.n_nodes, self.n_actions, self.n_actions)
    }

    pub fn n_profiles(&self) -> usize {
        self.n_profiles
    }

    #[inline]
    fn index(&self, profile: usize, node: NodeId, action: Item, link: Item) -> usize {
        debug_assert!(profile < self.n_profiles, "profile {} out of bounds", profile);
        debug_assert!(node < self.n_nodes, "node {} out of bounds", node);
        debug_assert!(action < self.n_actions, "action {} out of bounds", action);
        debug_assert!(link < self.n_actions, "link {} out of bounds", link);
        link + self.n_actions * (action + self.n_actions * (node + self.n_nodes * profile))
    }

    #[inline]
    pub fn get(&self, profile: usize, node: NodeId, action: Item, link: Item) -> f64 {
        self.data[self.index(profile, node, action, link)]
    }

    pub fn add(&mut self, profile: usize, node: NodeId, action: Item, link: Item, value: f64) {
        let idx = self.index(profile, node, action, link);
        self.data[idx] += value;
    }

    /// Distribution over links for `(profile, node, action)`
    pub fn row(&self, profile: usize, node: NodeId, action: Item) -> &[f64] {
        let start = self.index(profile, node, action, 0);
        &self.data[start..start + self.n_actions]
    }

    /// Make every row a distribution over links.
    ///
    /// Returns the number of rows that had no mass and were set to uniform.
    pub fn normalize(&mut self, precision: Precision) -> usize {
        let k = self.n_actions;
        if k == 0 {
            return 0;
        }
        self.data
            .chunks_mut(k)
            .map(|row| normalize_row(row, precision))
            .filter(|ok| !ok)
            .count()
    }

    pub fn is_row_stochastic(&self) -> bool {
        self.n_actions == 0 || self.data.chunks(self.n_actions).all(is_stochastic)
    }
}
