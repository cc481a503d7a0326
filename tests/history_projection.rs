//! History map built from real comparisons

use simscope::embeddings::{HashingEmbedder, ModelRegistry};
use simscope::history::PointRole;
use simscope::projection::{fit_projection, project};
use simscope::providers::ProviderCache;
use simscope::session::build_history_map;
use simscope::{CompareConfig, EngineError, Session};

fn offline_session(capacity: usize) -> Session {
    let providers = ProviderCache::with_loader(ModelRegistry::load().unwrap(), |def| {
        Ok(Box::new(HashingEmbedder::new(&def.name, def.dimensions)))
    });
    Session::with_providers(providers, capacity)
}

fn config(model: &str) -> CompareConfig {
    CompareConfig {
        model: model.to_string(),
        ..CompareConfig::default()
    }
}

const PAIRS: [(&str, &str); 4] = [
    ("The cat sat on the mat.", "A cat is sitting on a mat."),
    ("Stock markets fell sharply today", "Shares dropped on the exchange"),
    ("Preheat the oven before baking bread", "Bread baking needs a hot oven"),
    ("The river flooded the valley", "Heavy rain caused flooding downstream"),
];

#[test]
fn test_projection_size_boundary() {
    let v: Vec<Vec<f32>> = (0..5)
        .map(|i| (0..8).map(|j| ((i + 1) * (j + 2) % 7) as f32).collect())
        .collect();

    for n in 0..3 {
        assert!(matches!(
            project(&v[..n]),
            Err(EngineError::InsufficientData { needed: 3, .. })
        ));
    }
    for n in 3..=5 {
        assert_eq!(project(&v[..n]).unwrap().len(), n);
    }
}

#[test]
fn test_map_pools_four_points_per_keyword_record() {
    let mut session = offline_session(50);
    for (s, q) in PAIRS {
        session.run_comparison(s, q, &config("hashing-bow-384")).unwrap();
    }

    let map = build_history_map(session.history(), 50).unwrap();
    assert_eq!(map.points.len(), 16);
    assert_eq!(map.points.iter().filter(|p| p.latest).count(), 4);
    assert!(map
        .points
        .iter()
        .filter(|p| p.latest)
        .all(|p| p.age == 0));

    let roles: Vec<PointRole> = map.points.iter().take(4).map(|p| p.role).collect();
    assert_eq!(
        roles,
        vec![
            PointRole::ScrapedFull,
            PointRole::QueryFull,
            PointRole::ScrapedKeyword,
            PointRole::QueryKeyword
        ]
    );

    let [pc1, pc2] = map.explained_variance_ratio;
    assert!(pc1 > 0.0 && pc2 >= 0.0 && pc1 + pc2 <= 1.0 + 1e-4);
}

#[test]
fn test_map_limit_and_determinism() {
    let mut session = offline_session(50);
    for (s, q) in PAIRS {
        session.run_comparison(s, q, &config("hashing-bow-384")).unwrap();
    }

    let limited = build_history_map(session.history(), 2).unwrap();
    assert_eq!(limited.points.len(), 8);
    assert!(limited.points.iter().all(|p| p.age < 2));

    let a = build_history_map(session.history(), 50).unwrap();
    let b = build_history_map(session.history(), 50).unwrap();
    let coords = |m: &simscope::session::HistoryMap| -> Vec<(f32, f32)> {
        m.points.iter().map(|p| (p.x, p.y)).collect()
    };
    assert_eq!(coords(&a), coords(&b));
}

#[test]
fn test_single_record_without_keywords_is_insufficient() {
    let mut session = offline_session(50);
    let mut cfg = config("hashing-bow-384");
    cfg.keywords.enabled = false;
    session.run_comparison(PAIRS[0].0, PAIRS[0].1, &cfg).unwrap();

    match session.history_map() {
        Err(e @ EngineError::InsufficientData { found: 2, .. }) => assert!(e.is_recoverable()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(map) => panic!("expected InsufficientData, got {} points", map.points.len()),
    }
}

#[test]
fn test_map_follows_newest_model() {
    let mut session = offline_session(50);
    session
        .run_comparison(PAIRS[0].0, PAIRS[0].1, &config("hashing-bow-384"))
        .unwrap();
    assert!(session.history_map().is_ok());

    // A different registry entry loaded through the same offline loader
    session
        .run_comparison(PAIRS[1].0, PAIRS[1].1, &config("all-mpnet-base-v2"))
        .unwrap();
    let map = session.history_map().unwrap();
    assert_eq!(map.model, "all-mpnet-base-v2");
    assert_eq!(map.points.len(), 4);
    assert!(map.points.iter().all(|p| p.latest));
}

#[test]
fn test_mixed_norms_project_like_unit_vectors() {
    let unit: Vec<Vec<f32>> = vec![
        vec![1.0, 0.0, 0.0, 0.0],
        vec![0.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, 1.0, 0.0],
        vec![0.6, 0.8, 0.0, 0.0],
    ];
    let scaled: Vec<Vec<f32>> = unit
        .iter()
        .enumerate()
        .map(|(i, v)| v.iter().map(|x| x * 2f32.powi(i as i32 * 3 - 4)).collect())
        .collect();

    let a = fit_projection(&unit).unwrap();
    let b = fit_projection(&scaled).unwrap();
    for (p, q) in a.points.iter().zip(b.points.iter()) {
        assert!((p.x - q.x).abs() < 1e-4 && (p.y - q.y).abs() < 1e-4);
    }
}
