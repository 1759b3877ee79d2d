//! Growth-stage decision engine
//!
//! Holds the stage order, fruit threshold and current stage loaded from a
//! [`ConfigStore`], classifies detection counts with [`GrowthSignal`], and
//! advances the stage when the signal points further along the lifecycle.
//! The stage never moves backwards on its own.

use crate::config::{ConfigStore, KEY_CURRENT_STAGE, KEY_STAGE_ORDER};
use crate::models::{DetectionCounts, GrowthSignal, StageOrder};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// The resolved current stage no longer appears in the stage order
    #[error("current stage '{stage}' is not in the stage order")]
    InvalidState { stage: String },
}

/// Outcome of one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub flower: u64,
    pub fruit: u64,
    pub signal: GrowthSignal,
    pub previous: String,
    pub candidate: String,
    pub current: String,
    pub current_index: usize,
    pub advanced: bool,
    /// False when an advance could not be written to disk
    pub persisted: bool,
}

pub struct StageEngine {
    store: ConfigStore,
    stage_order: StageOrder,
    current_stage: String,
    fruit_threshold: u64,
}

impl StageEngine {
    /// Load the named configuration file from `config_dir`
    pub fn open(config_dir: impl AsRef<Path>, config_name: &str) -> Self {
        Self::with_store(ConfigStore::open(config_dir, config_name))
    }

    pub fn with_store(store: ConfigStore) -> Self {
        let mut engine = StageEngine {
            store,
            stage_order: StageOrder::default(),
            current_stage: String::new(),
            fruit_threshold: 0,
        };
        engine.reload();
        engine
    }

    /// Re-read parameters from the store's in-memory document (not from disk)
    /// and return the current stage
    pub fn reload(&mut self) -> &str {
        let config = self.store.config();
        self.stage_order = match config.stage_order() {
            Some(order) => order,
            None => {
                if config.is_set(KEY_STAGE_ORDER) {
                    log::warn!("stage_order is empty or has duplicate/blank labels, using built-in lifecycle");
                }
                StageOrder::default()
            }
        };
        self.current_stage = self.stage_order.label(config.current_stage()).to_string();
        self.fruit_threshold = config.fruit_threshold();
        &self.current_stage
    }

    pub fn current_stage(&self) -> &str {
        &self.current_stage
    }

    /// Position of the current stage, or `InvalidState` if it is no longer in the order
    pub fn current_index(&self) -> Result<usize, EngineError> {
        self.stage_order
            .position(&self.current_stage)
            .ok_or_else(|| EngineError::InvalidState {
                stage: self.current_stage.clone(),
            })
    }

    pub fn stage_order(&self) -> &StageOrder {
        &self.stage_order
    }

    pub fn fruit_threshold(&self) -> u64 {
        self.fruit_threshold
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Direct access to the backing store. Call [`StageEngine::reload`] after
    /// mutating it.
    pub fn store_mut(&mut self) -> &mut ConfigStore {
        &mut self.store
    }

    /// Classify counts, advance if the candidate is further along, and
    /// return the current stage
    pub fn evaluate(&mut self, counts: &DetectionCounts) -> Result<&str, EngineError> {
        self.evaluate_detailed(counts)?;
        Ok(&self.current_stage)
    }

    pub fn evaluate_detailed(&mut self, counts: &DetectionCounts) -> Result<Evaluation, EngineError> {
        let flower = counts.flower();
        let fruit = counts.fruit();
        let signal = GrowthSignal::classify(flower, fruit, self.fruit_threshold);

        // Short orders saturate at their last stage
        let candidate_idx = signal.stage_index().min(self.stage_order.last_index());
        let current_idx = self.current_index()?;
        let previous = self.current_stage.clone();
        let candidate = self.stage_order.labels()[candidate_idx].clone();

        log::debug!(
            "flower={} fruit={} threshold={} signal={} candidate={}",
            flower,
            fruit,
            self.fruit_threshold,
            signal,
            candidate
        );

        let mut advanced = false;
        let mut persisted = true;
        if candidate_idx > current_idx {
            self.current_stage = candidate.clone();
            advanced = true;
            persisted = self.store.update_param(KEY_CURRENT_STAGE, candidate_idx);
            if !persisted {
                log::warn!("Stage advanced to '{}' but could not be saved", candidate);
            }
            log::info!("Growth stage advanced: {} -> {}", previous, self.current_stage);
        }

        Ok(Evaluation {
            flower,
            fruit,
            signal,
            previous,
            candidate,
            current: self.current_stage.clone(),
            current_index: if advanced { candidate_idx } else { current_idx },
            advanced,
            persisted,
        })
    }
}
