//! Integration tests for the serving cache following registry promotions.

use std::path::Path;
use std::sync::Arc;
use std::thread;

use model_vault::pipeline::{publish_candidate, CandidateRun};
use model_vault::registry::{PromotionDecision, VersionRegistry};
use model_vault::serving::{LogisticModel, ModelSource, RefreshOutcome, ServingCache, ServingError};
use tempfile::TempDir;

/// One-feature model whose prediction sign follows `weight`.
fn artifact(weight: f64) -> Vec<u8> {
    let model = LogisticModel {
        means: vec![0.0; 5],
        scales: vec![1.0; 5],
        weights: vec![weight, 0.0, 0.0, 0.0, 0.0],
        intercept: 0.0,
    };
    serde_json::to_vec(&model).unwrap()
}

fn publish(reg: &VersionRegistry, weight: f64, score: f64) -> (String, PromotionDecision) {
    let bytes = artifact(weight);
    let run = CandidateRun {
        artifact: &bytes,
        metric_name: "f1",
        metric_value: score,
        training_data_file: Path::new("/data/train.csv"),
        trained_at: 1_700_000_000,
    };
    let outcome = publish_candidate(reg, &run).unwrap();
    (outcome.version, outcome.decision)
}

const FEATURES: [f64; 5] = [3.0, 0.0, 0.0, 0.0, 0.0];

#[test]
fn test_empty_registry_is_not_ready() {
    let dir = TempDir::new().unwrap();
    let cache = ServingCache::for_artifacts(dir.path(), None);

    assert!(!cache.is_ready());
    assert!(matches!(cache.predict(&FEATURES), Err(ServingError::NotReady)));
    assert!(cache.loaded_version().is_none());
}

#[test]
fn test_first_promotion_is_served() {
    let dir = TempDir::new().unwrap();
    let reg = VersionRegistry::open(dir.path());
    let cache = ServingCache::for_artifacts(dir.path(), None);

    let (v1, decision) = publish(&reg, 1.0, 0.9);
    assert_eq!(decision, PromotionDecision::Promoted);

    assert!(cache.is_ready());
    assert_eq!(cache.loaded_version(), Some(v1.clone()));
    assert_eq!(cache.loaded_ref().unwrap().source, ModelSource::Pointer);
    assert_eq!(cache.metadata().unwrap()["model_version_id"], v1.as_str());
    assert_eq!(cache.predict(&FEATURES).unwrap().label, 1);
}

#[test]
fn test_rejected_candidate_causes_no_reload() {
    let dir = TempDir::new().unwrap();
    let reg = VersionRegistry::open(dir.path());
    let cache = ServingCache::for_artifacts(dir.path(), None);

    let (v1, _) = publish(&reg, 1.0, 0.9);
    assert!(cache.is_ready());

    let (_, decision) = publish(&reg, -1.0, 0.4);
    assert_eq!(decision, PromotionDecision::Rejected);

    assert_eq!(cache.ensure_fresh(), RefreshOutcome::Unchanged);
    assert_eq!(cache.reload_count(), 1);
    assert_eq!(cache.loaded_version(), Some(v1));
    assert_eq!(cache.predict(&FEATURES).unwrap().label, 1);
}

#[test]
fn test_better_candidate_is_picked_up() {
    let dir = TempDir::new().unwrap();
    let reg = VersionRegistry::open(dir.path());
    let cache = ServingCache::for_artifacts(dir.path(), None);

    let (v1, _) = publish(&reg, 1.0, 0.9);
    assert_eq!(cache.predict(&FEATURES).unwrap().label, 1);

    let (v2, decision) = publish(&reg, -1.0, 0.95);
    assert_eq!(decision, PromotionDecision::Promoted);

    assert_eq!(cache.ensure_fresh(), RefreshOutcome::Reloaded);
    assert_eq!(cache.loaded_version(), Some(v2));
    assert_eq!(cache.predict(&FEATURES).unwrap().label, 0);
    reg.validate_artifacts(&v1).unwrap();
}

#[test]
fn test_ensure_fresh_without_promotion_reloads_once() {
    let dir = TempDir::new().unwrap();
    let reg = VersionRegistry::open(dir.path());
    publish(&reg, 1.0, 0.9);

    let cache = ServingCache::for_artifacts(dir.path(), None);
    for _ in 0..50 {
        cache.ensure_fresh();
    }
    assert_eq!(cache.reload_count(), 1);
}

#[test]
fn test_legacy_location_used_without_pointer() {
    let dir = TempDir::new().unwrap();
    let legacy = dir.path().join("models").join("production");
    std::fs::create_dir_all(&legacy).unwrap();
    std::fs::write(legacy.join("model.bin"), artifact(1.0)).unwrap();
    std::fs::write(legacy.join("metadata.json"), r#"{"note": "hand placed"}"#).unwrap();

    let cache = ServingCache::for_artifacts(dir.path(), None);
    assert!(cache.is_ready());
    assert_eq!(cache.loaded_ref().unwrap().source, ModelSource::Legacy);
    assert_eq!(cache.metadata().unwrap()["note"], "hand placed");

    // A promotion takes priority over the legacy directory.
    let reg = VersionRegistry::open(dir.path());
    let (v1, _) = publish(&reg, -1.0, 0.5);
    assert_eq!(cache.ensure_fresh(), RefreshOutcome::Reloaded);
    assert_eq!(cache.loaded_version(), Some(v1));
}

#[test]
fn test_predictions_continue_during_promotions() {
    let dir = TempDir::new().unwrap();
    let reg = Arc::new(VersionRegistry::open(dir.path()));
    publish(&reg, 1.0, 0.1);

    let cache = Arc::new(ServingCache::for_artifacts(dir.path(), None));
    assert!(cache.is_ready());

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..100 {
                    let p = cache.predict(&FEATURES).unwrap();
                    assert!((0.0..=1.0).contains(&p.probability));
                }
            })
        })
        .collect();

    for i in 1..=10 {
        let weight = if i % 2 == 0 { 1.0 } else { -1.0 };
        publish(&reg, weight, 0.1 + i as f64 * 0.05);
    }

    for w in workers {
        w.join().unwrap();
    }
    cache.ensure_fresh();
    assert_eq!(cache.loaded_version(), reg.read_current().unwrap());
}
