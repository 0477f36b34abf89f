//! Table-driven transition, reward and observation model
//!
//! Every query first resolves the `(s1, s2)` pair to the label of the edge
//! joining them in the history tree, then reads one table entry. Pairs that
//! are not joined by a single action have probability and reward 0.

pub mod table;

pub use table::TransitionTable;

use crate::history::HistoryIndex;
use crate::types::{Item, NodeId, StateId};

#[derive(Debug, Clone)]
pub struct TransitionModel {
    index: HistoryIndex,
    table: TransitionTable,
    /// `rewards[item]`: payoff when the recommended item is accepted
    rewards: Vec<f64>,
}

impl TransitionModel {
    /// Assemble a model from an already normalized table.
    ///
    /// Shapes are checked in debug builds; the loader is the only producer.
    pub fn new(index: HistoryIndex, table: TransitionTable, rewards: Vec<f64>) -> Self {
        debug_assert_eq!(rewards.len(), index.n_actions());
        debug_assert_eq!(table.shape().1, index.n_observations());
        debug_assert_eq!(table.shape().2, index.n_actions());
        Self {
            index,
            table,
            rewards,
        }
    }

    pub fn index(&self) -> &HistoryIndex {
        &self.index
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    pub fn reward(&self, item: Item) -> f64 {
        self.rewards.get(item).copied().unwrap_or(0.0)
    }

    /// Distribution over links when recommending `action` in state `s`
    pub fn row(&self, s: StateId, action: Item) -> Option<&[f64]> {
        if s >= self.index.n_states() || action >= self.index.n_actions() {
            return None;
        }
        let profile = self.index.environment_of(s);
        Some(self.table.row(profile, self.index.node_of(s), action))
    }

    pub fn transition_probability(&self, s1: StateId, action: Item, s2: StateId) -> f64 {
        if action >= self.index.n_actions() {
            return 0.0;
        }
        match self.index.is_connected(s1, s2) {
            Some(link) => self.table.get(
                self.index.environment_of(s1),
                self.index.node_of(s1),
                action,
                link,
            ),
            None => 0.0,
        }
    }

    /// Paid only when the realized link is the recommended action
    pub fn expected_reward(&self, s1: StateId, action: Item, s2: StateId) -> f64 {
        match self.index.is_connected(s1, s2) {
            Some(link) if link == action => self.rewards[link],
            _ => 0.0,
        }
    }

    /// The window is always observed; only the environment is hidden
    pub fn observation_probability(&self, s1: StateId, _action: Item, o: NodeId) -> f64 {
        if self.index.node_of(s1) == o {
            1.0
        } else {
            0.0
        }
    }

    /// State reached from `s` when `link` is accepted; the environment is kept
    pub fn successor(&self, s: StateId, link: Item) -> (StateId, NodeId) {
        let env = self.index.environment_of(s);
        let o2 = self.index.next_state(self.index.node_of(s), link);
        (self.index.state_id(env, o2), o2)
    }

    pub fn reward_for(&self, action: Item, link: Item) -> f64 {
        if action == link {
            self.reward(link)
        } else {
            0.0
        }
    }
}
