//! Stochastic transitions consistent with the probability table
//!
//! The random source is an explicit dependency: [`Sampler`] owns a
//! `ChaCha8Rng` seeded per session, and the free functions take any
//! `RngCore` so planners can thread their own generator through.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::transition::TransitionModel;
use crate::types::{Item, NodeId, StateId};

/// Draw a link from a distribution over links.
///
/// Rows are normalized at load time; a row that cannot back a weighted
/// draw falls back to a uniform pick.
pub fn draw_link<R: RngCore + ?Sized>(row: &[f64], rng: &mut R) -> Item {
    match WeightedIndex::<f64>::new(row) {
        Ok(dist) => dist.sample(rng),
        Err(_) => rng.gen_range(0..row.len().max(1)),
    }
}

/// `(s2, reward)` after recommending `action` in `s`
pub fn sample_transition_reward<R: RngCore + ?Sized>(
    model: &TransitionModel,
    rng: &mut R,
    s: StateId,
    action: Item,
) -> (StateId, f64) {
    let (s2, _, reward) = sample_transition_observation_reward(model, rng, s, action);
    (s2, reward)
}

/// `(s2, o2, reward)` where `o2` is the window component of `s2`
pub fn sample_transition_observation_reward<R: RngCore + ?Sized>(
    model: &TransitionModel,
    rng: &mut R,
    s: StateId,
    action: Item,
) -> (StateId, NodeId, f64) {
    let link = match model.row(s, action) {
        Some(row) => draw_link(row, rng),
        None => return (s, model.index().node_of(s), 0.0),
    };
    let (s2, o2) = model.successor(s, link);
    (s2, o2, model.reward_for(action, link))
}

/// Per-session sampler over a shared, read-only model
pub struct Sampler<'m> {
    model: &'m TransitionModel,
    rng: ChaCha8Rng,
}

impl<'m> Sampler<'m> {
    /// Seeded from the OS entropy source
    pub fn new(model: &'m TransitionModel) -> Self {
        Self {
            model,
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Reproducible sampler (same seed, same call sequence, same draws)
    pub fn with_seed(model: &'m TransitionModel, seed: u64) -> Self {
        Self {
            model,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_seed_option(model: &'m TransitionModel, seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::with_seed(model, seed),
            None => Self::new(model),
        }
    }

    pub fn model(&self) -> &'m TransitionModel {
        self.model
    }

    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn sample_transition_reward(&mut self, s: StateId, action: Item) -> (StateId, f64) {
        sample_transition_reward(self.model, &mut self.rng, s, action)
    }

    pub fn sample_transition_observation_reward(
        &mut self,
        s: StateId,
        action: Item,
    ) -> (StateId, NodeId, f64) {
        sample_transition_observation_reward(self.model, &mut self.rng, s, action)
    }
}
