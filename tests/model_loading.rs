//! End-to-end loading tests: files on disk -> RecoModel -> queries/sampling

mod common;

use common::{profile, profiles, rewards, summary, Fixture};
use recomodel::{
    HistoryIndex, LoadError, Memdp, ModelConfig, ModelError, ModelFile, Precision, RecoModel,
};

/// K = 2, H = 2, E = 1; action `a` is accepted with certainty
fn accepting_fixture() -> Fixture {
    let index = HistoryIndex::new(2, 2, 1, false).unwrap();
    Fixture::new(
        &summary(7, 2, 1, 2),
        "1 1.0\n2 0.5\n",
        &profile(&index, |_, a, link| if a == link { 1.0 } else { 0.0 }),
    )
}

fn load_err(fixture: &Fixture) -> LoadError {
    match RecoModel::load(&fixture.config()) {
        Err(ModelError::Load(err)) => err,
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("load should fail"),
    }
}

#[test]
fn test_concrete_scenario() {
    let fixture = accepting_fixture();
    let model = RecoModel::load(&fixture.config().with_seed(5)).expect("valid model");

    assert_eq!(model.n_observations(), 7);
    assert_eq!(model.n_actions(), 2);
    assert_eq!(model.n_states(), 7);
    assert_eq!(model.rewards(), &[1.0, 0.5]);
    assert!(model.is_row_stochastic());

    let index = model.index().clone();
    for s in 0..7 {
        for a in 0..2 {
            let target = index.next_state(s, a);
            for s2 in 0..7 {
                let p = model.transition_probability(s, a, s2);
                if s2 == target {
                    assert_eq!(p, 1.0);
                } else {
                    assert_eq!(p, 0.0);
                }
            }
        }
    }

    let mut sampler = model.sampler();
    for s in 0..7 {
        for a in 0..2 {
            let (s2, reward) = sampler.sample_transition_reward(s, a);
            assert_eq!(s2, index.next_state(s, a));
            assert_eq!(reward, model.rewards()[a]);
        }
    }
}

#[test]
fn test_environments_are_separate_profiles() {
    let index = HistoryIndex::new(2, 1, 2, false).unwrap();
    let accept = profile(&index, |_, a, link| if a == link { 1.0 } else { 0.0 });
    let contrarian = profile(&index, |_, a, link| if a != link { 3.0 } else { 1.0 });
    let fixture = Fixture::new(
        &summary(3, 2, 2, 1),
        &rewards(&[2.0, 4.0]),
        &profiles(&[accept, contrarian]),
    );

    let model = RecoModel::load(&fixture.config()).unwrap();
    assert_eq!(model.n_states(), 6);
    assert!(!model.environments_disabled());

    // env 0: accepted
    assert_eq!(model.transition_probability(0, 0, 1), 1.0);
    // env 1: 1/4 accepted, 3/4 the other item
    assert!((model.transition_probability(3, 0, 4) - 0.25).abs() < 1e-12);
    assert!((model.transition_probability(3, 0, 5) - 0.75).abs() < 1e-12);
    assert_eq!(model.expected_reward(3, 0, 4), 2.0);
    assert_eq!(model.expected_reward(3, 0, 5), 0.0);
    // no transitions across environments
    assert_eq!(model.transition_probability(0, 0, 4), 0.0);

    // plain MDP mode sums both profiles before normalizing: [1 + 1, 0 + 3]
    let mdp = RecoModel::load(&fixture.config().with_environments_disabled(true)).unwrap();
    assert_eq!(mdp.n_states(), 3);
    assert!((mdp.transition_probability(0, 0, 1) - 0.4).abs() < 1e-12);
    assert!((mdp.transition_probability(0, 0, 2) - 0.6).abs() < 1e-12);
}

#[test]
fn test_marker_lines_separate_profiles() {
    let index = HistoryIndex::new(2, 1, 2, false).unwrap();
    let accept = profile(&index, |_, a, link| if a == link { 1.0 } else { 0.0 });
    let reject = profile(&index, |_, a, link| if a != link { 1.0 } else { 0.0 });
    let text = format!("{}---\n{}---\n", accept, reject);
    let fixture = Fixture::new(&summary(3, 2, 2, 1), &rewards(&[1.0, 1.0]), &text);

    let model = RecoModel::load(&fixture.config()).expect("two profiles");
    assert_eq!(model.transition_probability(0, 0, 1), 1.0);
    assert_eq!(model.transition_probability(3, 0, 5), 1.0);
}

#[test]
fn test_tiny_row_mass_is_rescaled_not_flattened() {
    let index = HistoryIndex::new(2, 1, 1, false).unwrap();
    let text = profile(&index, |_, a, link| if a == link { 1e-12 } else { 0.0 });
    let fixture = Fixture::new(&summary(3, 2, 1, 1), &rewards(&[1.0, 1.0]), &text);

    let model = RecoModel::load(&fixture.config()).unwrap();
    assert_eq!(model.transitions().row(0, 0), Some(&[1.0, 0.0][..]));
    assert_eq!(model.transition_probability(0, 0, 2), 0.0);
}

#[test]
fn test_oversized_summary_fails_cleanly() {
    let fixture = Fixture::new(&summary(4194305, 4194304, 1, 1), "", "");
    assert!(matches!(load_err(&fixture), LoadError::TableTooLarge { .. }));
}

#[test]
fn test_precision_strategies_agree_on_simple_rows() {
    let index = HistoryIndex::new(3, 2, 1, false).unwrap();
    let text = profile(&index, |node, a, link| 0.1 + (node + a + link) as f64 * 0.01);
    let fixture = Fixture::new(&summary(13, 3, 1, 2), &rewards(&[1.0, 1.0, 1.0]), &text);

    let plain = RecoModel::load(&fixture.config()).unwrap();
    let kahan = RecoModel::load(&fixture.config().with_precision(Precision::Compensated)).unwrap();
    assert!(kahan.is_row_stochastic());
    for s in 0..13 {
        for a in 0..3 {
            for s2 in index.next_states(s) {
                let diff = plain.transition_probability(s, a, s2) - kahan.transition_probability(s, a, s2);
                assert!(diff.abs() < 1e-12);
            }
        }
    }
}

#[test]
fn test_missing_file() {
    let fixture = accepting_fixture();
    std::fs::remove_file(fixture.path("rewards")).unwrap();
    assert!(matches!(
        load_err(&fixture),
        LoadError::Io { file: ModelFile::Rewards, .. }
    ));
}

#[test]
fn test_rewards_missing_item() {
    let fixture = accepting_fixture();
    fixture.write("rewards", "1 1.0\n");
    assert!(matches!(load_err(&fixture), LoadError::MissingReward { item: 2 }));
}

#[test]
fn test_wrong_profile_count() {
    let fixture = accepting_fixture();
    let index = HistoryIndex::new(2, 2, 1, false).unwrap();
    let one = profile(&index, |_, a, link| if a == link { 1.0 } else { 0.0 });
    fixture.write("transitions", &profiles(&[one.clone(), one]));
    assert!(matches!(
        load_err(&fixture),
        LoadError::ProfileCount { expected: 1, found: 2 }
    ));
}

#[test]
fn test_unconnected_pair_with_mass() {
    let fixture = accepting_fixture();
    // node 1 = [0]; node 1 cannot reach node 6 = [1, 1]
    let index = HistoryIndex::new(2, 2, 1, false).unwrap();
    let text = profile(&index, |_, a, link| if a == link { 1.0 } else { 0.0 })
        .replacen("1 1 3 1", "1 1 6 1", 1);
    fixture.write("transitions", &text);
    assert!(matches!(
        load_err(&fixture),
        LoadError::Disconnected { s1: 1, s2: 6, .. }
    ));
}

#[test]
fn test_inconsistent_summary() {
    let fixture = accepting_fixture();
    fixture.write("summary", &summary(8, 2, 1, 2));
    assert!(matches!(
        load_err(&fixture),
        LoadError::InconsistentSummary { declared: 8, expected: 7, .. }
    ));
}

#[test]
fn test_invalid_discount_is_rejected_before_loading() {
    let fixture = accepting_fixture();
    let config: ModelConfig = fixture.config().with_discount(2.0);
    assert!(matches!(RecoModel::load(&config), Err(ModelError::Config(_))));
}

#[test]
fn test_config_from_json_file() {
    let fixture = accepting_fixture();
    let json = serde_json::json!({
        "summaryPath": fixture.path("summary"),
        "rewardsPath": fixture.path("rewards"),
        "transitionsPath": fixture.path("transitions"),
        "precision": "compensated",
        "discount": 0.5,
        "seed": 9
    });
    let config_path = fixture.dir.path().join("model.json");
    std::fs::write(&config_path, json.to_string()).unwrap();

    let config = ModelConfig::from_json_file(&config_path).unwrap();
    assert_eq!(config.seed, Some(9));
    let model = RecoModel::load(&config).unwrap();
    assert!((model.discount() - 0.5).abs() < 1e-12);
    assert_eq!(model.summary().n_observations, 7);
}

#[test]
fn test_model_is_shareable_across_threads() {
    let fixture = accepting_fixture();
    let model = RecoModel::load(&fixture.config()).unwrap();

    std::thread::scope(|scope| {
        for seed in 0..4u64 {
            let model = &model;
            scope.spawn(move || {
                let mut sampler = model.sampler_with_seed(seed);
                let mut s = 0;
                for step in 0..20 {
                    let (s2, _) = sampler.sample_transition_reward(s, step % 2);
                    model.record_bottleneck_call();
                    s = s2;
                }
            });
        }
    });
    assert_eq!(model.bottleneck_calls(), 80);
}
