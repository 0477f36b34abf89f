//! Model façade consumed by planners and evaluators
//!
//! [`Memdp`] is the narrow capability interface: counts, discount, state
//! predicates, point queries and sampling. It is object safe, so solvers can
//! hold a `&dyn Memdp` or be generic over `M: Memdp`.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::RngCore;

use crate::config::ModelConfig;
use crate::error::ModelError;
use crate::history::HistoryIndex;
use crate::loader;
use crate::sampler::{self, Sampler};
use crate::transition::TransitionModel;
use crate::types::{EnvId, Item, ModelSummary, NodeId, StateId};

pub trait Memdp {
    /// Number of items (K)
    fn n_actions(&self) -> usize;
    /// Number of history nodes (N)
    fn n_observations(&self) -> usize;
    fn n_environments(&self) -> usize;
    fn n_states(&self) -> usize;
    fn discount(&self) -> f64;
    /// Plain MDP mode: the state is the history node alone
    fn environments_disabled(&self) -> bool;

    fn environment_of(&self, s: StateId) -> EnvId;
    fn node_of(&self, s: StateId) -> NodeId;

    fn is_terminal(&self, s: StateId) -> bool;
    fn is_initial(&self, s: StateId) -> bool;

    fn transition_probability(&self, s1: StateId, a: Item, s2: StateId) -> f64;
    fn expected_reward(&self, s1: StateId, a: Item, s2: StateId) -> f64;
    fn observation_probability(&self, s1: StateId, a: Item, o: NodeId) -> f64;

    fn sample_transition_reward(
        &self,
        rng: &mut dyn RngCore,
        s: StateId,
        a: Item,
    ) -> (StateId, f64);
    fn sample_transition_observation_reward(
        &self,
        rng: &mut dyn RngCore,
        s: StateId,
        a: Item,
    ) -> (StateId, NodeId, f64);

    /// Count one expensive planner call (e.g. particle generation)
    fn record_bottleneck_call(&self);
    fn bottleneck_calls(&self) -> u64;
}

/// Loaded recommendation model: immutable tables plus an instrumentation
/// counter. Shareable across threads behind `&`.
#[derive(Debug)]
pub struct RecoModel {
    transitions: TransitionModel,
    discount: f64,
    seed: Option<u64>,
    bottleneck_calls: AtomicU64,
}

impl RecoModel {
    pub fn new(transitions: TransitionModel, discount: f64) -> Self {
        Self {
            transitions,
            discount,
            seed: None,
            bottleneck_calls: AtomicU64::new(0),
        }
    }

    /// Validate the config, then load and normalize all three files
    pub fn load(config: &ModelConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let transitions = loader::load_model(
            &config.summary_path,
            &config.rewards_path,
            &config.transitions_path,
            config.environments_disabled,
            config.precision,
        )?;

        let mut model = Self::new(transitions, config.discount);
        model.seed = config.seed;

        let summary = model.summary();
        tracing::info!(
            observations = summary.n_observations,
            actions = summary.n_actions,
            states = summary.n_states,
            environments = summary.n_environments,
            mdp = summary.environments_disabled,
            "model ready"
        );
        Ok(model)
    }

    pub fn from_base_name(base: &str, environments_disabled: bool) -> Result<Self, ModelError> {
        let config = ModelConfig::from_base_name(base).with_environments_disabled(environments_disabled);
        Self::load(&config)
    }

    pub fn transitions(&self) -> &TransitionModel {
        &self.transitions
    }

    pub fn index(&self) -> &HistoryIndex {
        self.transitions.index()
    }

    pub fn rewards(&self) -> &[f64] {
        self.transitions.rewards()
    }

    /// Label of the action joining `s1` to `s2`
    pub fn is_connected(&self, s1: StateId, s2: StateId) -> Option<Item> {
        self.index().is_connected(s1, s2)
    }

    /// Session sampler seeded from the configured seed, if any
    pub fn sampler(&self) -> Sampler<'_> {
        Sampler::from_seed_option(&self.transitions, self.seed)
    }

    pub fn sampler_with_seed(&self, seed: u64) -> Sampler<'_> {
        Sampler::with_seed(&self.transitions, seed)
    }

    pub fn summary(&self) -> ModelSummary {
        let index = self.index();
        ModelSummary {
            n_observations: index.n_observations(),
            n_actions: index.n_actions(),
            n_environments: index.n_environments(),
            n_states: index.n_states(),
            history_length: index.history_length(),
            environments_disabled: index.environments_disabled(),
            discount: self.discount,
        }
    }

    /// Every `(profile, node, action)` row is a distribution over links
    pub fn is_row_stochastic(&self) -> bool {
        self.transitions.table().is_row_stochastic()
    }
}

impl Memdp for RecoModel {
    fn n_actions(&self) -> usize {
        self.index().n_actions()
    }

    fn n_observations(&self) -> usize {
        self.index().n_observations()
    }

    fn n_environments(&self) -> usize {
        self.index().n_environments()
    }

    fn n_states(&self) -> usize {
        self.index().n_states()
    }

    fn discount(&self) -> f64 {
        self.discount
    }

    fn environments_disabled(&self) -> bool {
        self.index().environments_disabled()
    }

    fn environment_of(&self, s: StateId) -> EnvId {
        self.index().environment_of(s)
    }

    fn node_of(&self, s: StateId) -> NodeId {
        self.index().node_of(s)
    }

    fn is_terminal(&self, _s: StateId) -> bool {
        false
    }

    /// Empty window, in any environment
    fn is_initial(&self, s: StateId) -> bool {
        self.index().node_of(s) == 0
    }

    fn transition_probability(&self, s1: StateId, a: Item, s2: StateId) -> f64 {
        self.transitions.transition_probability(s1, a, s2)
    }

    fn expected_reward(&self, s1: StateId, a: Item, s2: StateId) -> f64 {
        self.transitions.expected_reward(s1, a, s2)
    }

    fn observation_probability(&self, s1: StateId, a: Item, o: NodeId) -> f64 {
        self.transitions.observation_probability(s1, a, o)
    }

    fn sample_transition_reward(
        &self,
        rng: &mut dyn RngCore,
        s: StateId,
        a: Item,
    ) -> (StateId, f64) {
        sampler::sample_transition_reward(&self.transitions, rng, s, a)
    }

    fn sample_transition_observation_reward(
        &self,
        rng: &mut dyn RngCore,
        s: StateId,
        a: Item,
    ) -> (StateId, NodeId, f64) {
        sampler::sample_transition_observation_reward(&self.transitions, rng, s, a)
    }

    fn record_bottleneck_call(&self) {
        self.bottleneck_calls.fetch_add(1, Ordering::Relaxed);
    }

    fn bottleneck_calls(&self) -> u64 {
        self.bottleneck_calls.load(Ordering::Relaxed)
    }
}
