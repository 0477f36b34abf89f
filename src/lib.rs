//! # recomodel - recency-window MEMDP for sequential recommendation
//!
//! The state space of a recommender simulator: a state is a bounded window
//! of recently accepted items plus a hidden environment (user cluster).
//! Planners query and sample this model; they never mutate it.
//!
//! ## Modules
//!
//! - [`history`] - window <-> dense id encoding, tree navigation
//! - [`transition`] - probability table and point queries
//! - [`loader`] - validated loading of `.summary` / `.rewards` / `.transitions`
//! - [`sampler`] - seedable draws consistent with the table
//! - [`model`] - [`RecoModel`] façade and the [`Memdp`] interface
//! - [`sanitize`] - summation and normalization helpers
//! - [`config`], [`logging`], [`error`], [`types`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use recomodel::{Memdp, ModelConfig, RecoModel};
//!
//! let config = ModelConfig::from_base_name("data/foodmart.u2.k3").with_seed(42);
//! let model = RecoModel::load(&config).unwrap();
//! let mut sampler = model.sampler();
//! let (next, reward) = sampler.sample_transition_reward(0, 1);
//! assert!(next < model.n_states());
//! assert!(reward >= 0.0);
//! ```

#![deny(clippy::all)]

pub mod config;
pub mod error;
pub mod history;
pub mod loader;
pub mod logging;
pub mod model;
pub mod sampler;
pub mod sanitize;
pub mod transition;
pub mod types;

pub use config::ModelConfig;
pub use error::{ConfigError, LoadError, ModelError, ModelFile};
pub use history::HistoryIndex;
pub use model::{Memdp, RecoModel};
pub use sampler::Sampler;
pub use transition::{TransitionModel, TransitionTable};
pub use types::*;
