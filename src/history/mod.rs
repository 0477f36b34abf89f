//! Recency-window tree indexing
//!
//! A history node is a window of at most `H` recently accepted items. Nodes
//! are numbered by bijective base-K numeration of their items: the root (the
//! empty window) is 0, and appending item `x` (0-indexed) to a node `p` below
//! full depth yields `p * K + x + 1`. Equivalently, the length-normalized
//! sequence `(d_0, .., d_{H-1})`, left padded with 0 and holding 1-indexed
//! items, has id `sum d_i * K^(H-1-i)`.
//!
//! Core quantities:
//! - `pows[i] = K^(H-1-i)`: weight of position `i`
//! - `acpows[i] = pows[i] + .. + pows[H-1]`: first id of depth `H - i`
//!
//! Full-depth nodes (ids `>= acpows[0]`) slide: the oldest item is dropped
//! before the new one is appended, so they form a K-regular graph among
//! themselves. Node count is `N = 1 + K + .. + K^H`.

use crate::types::{EnvId, Item, NodeId, StateId};

/// Encoding between recency windows, node ids and state ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryIndex {
    n_actions: usize,
    history_length: usize,
    n_observations: usize,
    n_environments: usize,
    environments_disabled: bool,
    /// `pows[i] = K^(H-1-i)`
    pows: Vec<usize>,
    /// `acpows[i] = sum_{j >= i} pows[j]`, with `acpows[H] = 0`
    acpows: Vec<usize>,
}

impl HistoryIndex {
    /// Build the index for `n_actions` items and windows of `history_length`.
    ///
    /// Returns `None` when any count is zero, or when the state count or
    /// the transition table size overflows `usize`.
    pub fn new(
        n_actions: usize,
        history_length: usize,
        n_environments: usize,
        environments_disabled: bool,
    ) -> Option<Self> {
        if n_actions == 0 || history_length == 0 || n_environments == 0 {
            return None;
        }

        let mut pows = vec![1usize; history_length];
        let mut acpows = vec![0usize; history_length + 1];
        acpows[history_length - 1] = 1;
        for i in (0..history_length - 1).rev() {
            pows[i] = pows[i + 1].checked_mul(n_actions)?;
            acpows[i] = acpows[i + 1].checked_add(pows[i])?;
        }

        // N = 1 + K * (1 + K + .. + K^(H-1))
        let n_observations = acpows[0].checked_mul(n_actions)?.checked_add(1)?;
        let n_profiles = if environments_disabled {
            1
        } else {
            n_observations.checked_mul(n_environments)?;
            n_environments
        };
        n_profiles
            .checked_mul(n_observations)?
            .checked_mul(n_actions)?
            .checked_mul(n_actions)?;

        Some(Self {
            n_actions,
            history_length,
            n_observations,
            n_environments,
            environments_disabled,
            pows,
            acpows,
        })
    }

    /// Closed-form node count `1 + K + .. + K^H`, `None` on overflow
    pub fn expected_node_count(n_actions: usize, history_length: usize) -> Option<usize> {
        let mut total: usize = 1;
        let mut level: usize = 1;
        for _ in 0..history_length {
            level = level.checked_mul(n_actions)?;
            total = total.checked_add(level)?;
        }
        Some(total)
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    pub fn history_length(&self) -> usize {
        self.history_length
    }

    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    pub fn n_environments(&self) -> usize {
        self.n_environments
    }

    pub fn environments_disabled(&self) -> bool {
        self.environments_disabled
    }

    pub fn n_states(&self) -> usize {
        if self.environments_disabled {
            self.n_observations
        } else {
            self.n_observations * self.n_environments
        }
    }

    /// Entry count of the `(profile, node, action, link)` table for this index
    pub fn table_len(&self) -> usize {
        let n_profiles = if self.environments_disabled {
            1
        } else {
            self.n_environments
        };
        n_profiles * self.n_observations * self.n_actions * self.n_actions
    }

    // ==================== Windows ====================

    /// Id of a length-normalized sequence: exactly `H` entries, leading
    /// zeros for empty slots, items 1-indexed.
    ///
    /// Returns `None` when the sequence has the wrong length, an entry above
    /// `K`, or an empty slot after the first item.
    pub fn state_to_id(&self, sequence: &[usize]) -> Option<NodeId> {
        if sequence.len() != self.history_length {
            return None;
        }

        let mut started = false;
        let mut id = 0;
        for (&digit, &weight) in sequence.iter().zip(&self.pows) {
            if digit > self.n_actions || (started && digit == 0) {
                return None;
            }
            started |= digit > 0;
            id += digit * weight;
        }
        Some(id)
    }

    /// Inverse of [`state_to_id`](Self::state_to_id); `None` for ids `>= N`
    pub fn id_to_state(&self, id: NodeId) -> Option<Vec<usize>> {
        if id >= self.n_observations {
            return None;
        }

        let mut sequence = vec![0; self.history_length];
        let mut rest = id;
        for i in 0..self.history_length {
            // rest encodes the window occupying positions i..H
            let tail = self.acpows[i + 1];
            if rest < self.acpows[i] {
                // position i is still empty
                continue;
            }
            let digit = (rest - tail) / self.pows[i];
            sequence[i] = digit;
            rest -= digit * self.pows[i];
        }
        debug_assert_eq!(rest, 0);
        Some(sequence)
    }

    /// Items of the window, oldest first, 0-indexed
    pub fn window(&self, id: NodeId) -> Option<Vec<Item>> {
        self.id_to_state(id).map(|sequence| {
            sequence
                .into_iter()
                .filter(|&d| d > 0)
                .map(|d| d - 1)
                .collect()
        })
    }

    /// Id of an explicit window of at most `H` items, oldest first
    pub fn node_from_window(&self, items: &[Item]) -> Option<NodeId> {
        if items.len() > self.history_length {
            return None;
        }
        items.iter().try_fold(0, |id, &item| {
            (item < self.n_actions).then(|| id * self.n_actions + item + 1)
        })
    }

    /// Number of items in the window
    pub fn depth(&self, node: NodeId) -> usize {
        // acpows is decreasing: depth d starts at acpows[H - d]
        (0..=self.history_length)
            .find(|&i| node >= self.acpows[i])
            .map(|i| self.history_length - i)
            .unwrap_or(0)
    }

    pub fn is_full(&self, node: NodeId) -> bool {
        node >= self.acpows[0]
    }

    /// Most recent item of the window, `None` for the root
    pub fn last_item(&self, node: NodeId) -> Option<Item> {
        (node > 0).then(|| (node - 1) % self.n_actions)
    }

    // ==================== Navigation ====================

    /// Window obtained by accepting `item` in `node`
    pub fn next_state(&self, node: NodeId, item: Item) -> NodeId {
        debug_assert!(node < self.n_observations && item < self.n_actions);
        self.suffix(node) * self.n_actions + item + 1
    }

    /// Node whose children share the window of `node` minus its oldest item
    /// once full; below full depth this is `node` itself.
    fn suffix(&self, node: NodeId) -> NodeId {
        if self.is_full(node) {
            self.acpows[1] + (node - self.acpows[1]) % self.pows[0]
        } else {
            node
        }
    }

    /// Every `p` such that `next_state(p, last_item(node)) == node`.
    ///
    /// The root has no parent and shallow nodes have exactly one. A
    /// full-depth node has `K + 1`: the depth `H - 1` node it grew from, and
    /// the `K` full-depth nodes that slide into it, one per dropped item.
    pub fn previous_states(&self, node: NodeId) -> Vec<NodeId> {
        if node == 0 || node >= self.n_observations {
            return Vec::new();
        }

        let prefix = (node - 1) / self.n_actions;
        if !self.is_full(node) {
            return vec![prefix];
        }

        let mut parents = Vec::with_capacity(self.n_actions + 1);
        parents.push(prefix);
        parents.extend((1..=self.n_actions).map(|oldest| prefix + oldest * self.pows[0]));
        parents
    }

    /// Children of `node`, indexed by item
    pub fn next_states(&self, node: NodeId) -> Vec<NodeId> {
        (0..self.n_actions)
            .map(|item| self.next_state(node, item))
            .collect()
    }

    // ==================== States ====================

    pub fn environment_of(&self, state: StateId) -> EnvId {
        if self.environments_disabled {
            0
        } else {
            state / self.n_observations
        }
    }

    pub fn node_of(&self, state: StateId) -> NodeId {
        state % self.n_observations
    }

    pub fn state_id(&self, env: EnvId, node: NodeId) -> StateId {
        if self.environments_disabled {
            node
        } else {
            env * self.n_observations + node
        }
    }

    /// Label of the single action leading from `s1` to `s2`, if any.
    ///
    /// States in different environments are never connected.
    pub fn is_connected(&self, s1: StateId, s2: StateId) -> Option<Item> {
        let n_states = self.n_states();
        if s1 >= n_states || s2 >= n_states {
            return None;
        }
        if self.environment_of(s1) != self.environment_of(s2) {
            return None;
        }

        let (n1, n2) = (self.node_of(s1), self.node_of(s2));
        let link = self.last_item(n2)?;
        // prefix of the target must be the retained suffix of the source
        ((n2 - 1) / self.n_actions == self.suffix(n1)).then_some(link)
    }
}
