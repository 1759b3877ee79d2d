// Library-level tests for the stage engine against a real config file

use growstage::config::{ConfigStore, DEFAULT_CONFIG_NAME, KEY_CURRENT_STAGE, KEY_STAGE_ORDER};
use growstage::engine::StageEngine;
use growstage::models::{DetectionCounts, GrowthSignal};
use serde_json::json;
use tempfile::TempDir;

fn counts(flower: u64, fruit: u64) -> DetectionCounts {
    DetectionCounts::from_tokens(&[format!("flower={}", flower), format!("fruit={}", fruit)]).unwrap()
}

fn open(temp_dir: &TempDir) -> StageEngine {
    let _ = env_logger::builder().is_test(true).try_init();
    StageEngine::open(temp_dir.path(), DEFAULT_CONFIG_NAME)
}

#[test]
fn test_advance_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    
    let mut engine = open(&temp_dir);
    assert_eq!(engine.evaluate(&counts(5, 1)).unwrap(), "flowering-fruiting");
    assert_eq!(engine.reload(), "flowering-fruiting");
    drop(engine);
    
    let engine = open(&temp_dir);
    assert_eq!(engine.current_stage(), "flowering-fruiting");
}

#[test]
fn test_fruit_priority_from_second_stage() {
    let temp_dir = TempDir::new().unwrap();
    let mut engine = open(&temp_dir);
    engine.evaluate(&counts(1, 0)).unwrap();
    
    let eval = engine.evaluate_detailed(&counts(0, 10)).unwrap();
    assert_eq!(eval.signal, GrowthSignal::FruitAbundant);
    assert_eq!(eval.previous, "flowering-fruiting");
    assert_eq!(eval.current, "fruit-swelling");
    assert_eq!(eval.current_index, 2);
}

#[test]
fn test_terminal_stage_is_sticky_across_instances() {
    let temp_dir = TempDir::new().unwrap();
    open(&temp_dir).evaluate(&counts(0, 4)).unwrap();
    
    let mut engine = open(&temp_dir);
    for flower in 0..3 {
        for fruit in 0..6 {
            assert_eq!(engine.evaluate(&counts(flower, fruit)).unwrap(), "fruit-swelling");
        }
    }
}

#[test]
fn test_resolved_label_matches_clamped_offset() {
    let temp_dir = TempDir::new().unwrap();
    let labels = ["a", "b", "c", "d"];
    
    for offset in [-10i64, -1, 0, 1, 2, 3, 4, 100] {
        let mut store = ConfigStore::open(temp_dir.path(), DEFAULT_CONFIG_NAME);
        store.update_param(KEY_STAGE_ORDER, json!(labels));
        store.update_param(KEY_CURRENT_STAGE, offset);
        
        let engine = StageEngine::with_store(store);
        let expected = labels[offset.clamp(0, 3) as usize];
        assert_eq!(engine.current_stage(), expected, "offset {}", offset);
    }
}

#[test]
fn test_two_engines_last_writer_wins() {
    let temp_dir = TempDir::new().unwrap();
    let mut first = open(&temp_dir);
    let mut second = open(&temp_dir);
    
    first.evaluate(&counts(0, 9)).unwrap();
    second.evaluate(&counts(1, 0)).unwrap();
    
    // No locking: the second engine's stale view overwrites the first advance
    let fresh = open(&temp_dir);
    assert_eq!(fresh.current_stage(), "flowering-fruiting");
}

#[test]
fn test_advance_keeps_unparseable_keys_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(DEFAULT_CONFIG_NAME);
    std::fs::write(
        &path,
        r#"{"stage_order": "seedling,bloom,ripe", "current_stage": 0, "fruit_threshold": -2}"#,
    )
    .unwrap();

    let mut engine = open(&temp_dir);
    assert_eq!(engine.evaluate(&counts(1, 0)).unwrap(), "flowering-fruiting");

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"stage_order\": \"seedling,bloom,ripe\""));
    assert!(text.contains("\"fruit_threshold\": -2"));
    assert!(text.contains("\"current_stage\": 1"));
}
