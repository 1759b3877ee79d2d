//! Growstage - growth-stage tracking from object-detection counts
//!
//! This library provides the core functionality for growstage, including:
//! - A JSON-backed configuration store with default fallback
//! - Stage order, detection count and decision-signal models
//! - The stage engine that advances a plant through its lifecycle
//! - CLI command parsing and execution
//!
//! # Example
//!
//! ```no_run
//! use growstage::engine::StageEngine;
//! use growstage::models::DetectionCounts;
//!
//! let mut engine = StageEngine::open("/var/lib/growstage", "config.json");
//! let counts = DetectionCounts::from_tokens(&["flower=4", "fruit=0"]).unwrap();
//! let stage = engine.evaluate(&counts).unwrap();
//! println!("{}", stage);
//! ```
//!
//! The backing file is not locked. Run a single writer per config file.

pub mod cli;
pub mod config;
pub mod engine;
pub mod models;
pub mod utils;
