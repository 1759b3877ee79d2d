// Output formatting for growstage commands

use crate::config::Config;
use crate::engine::{Evaluation, StageEngine};
use serde_json::{json, Value};
use std::io::IsTerminal;
use std::path::Path;

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Apply bold formatting if in TTY mode
fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Render the lifecycle with the current stage bracketed,
/// e.g. `seedling > [flowering-fruiting] > fruit-swelling`
pub fn format_lifecycle(engine: &StageEngine, is_tty: bool) -> String {
    let current = engine.current_stage();
    engine
        .stage_order()
        .iter()
        .map(|label| {
            if label == current {
                bold_if_tty(&format!("[{}]", label), is_tty)
            } else {
                label.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Human-readable result of an evaluation
pub fn format_evaluation(eval: &Evaluation, is_tty: bool) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Detections: flower={} fruit={} ({})\n",
        eval.flower, eval.fruit, eval.signal
    ));
    if eval.advanced {
        output.push_str(&format!("Stage advanced: {} -> {}\n", eval.previous, eval.current));
        if !eval.persisted {
            output.push_str("Warning: new stage could not be saved to the config file\n");
        }
    }
    output.push_str(&format!("Current stage: {}\n", bold_if_tty(&eval.current, is_tty)));
    output
}

pub fn evaluation_json(eval: &Evaluation) -> Value {
    serde_json::to_value(eval).unwrap_or(Value::Null)
}

/// Status dashboard for the engine
pub fn format_status(engine: &StageEngine, is_tty: bool) -> String {
    let mut output = String::new();
    output.push_str("=== Growth Stage ===\n");
    output.push_str(&format!(
        "Current stage: {}\n",
        bold_if_tty(engine.current_stage(), is_tty)
    ));
    output.push_str(&format!("Lifecycle: {}\n", format_lifecycle(engine, is_tty)));
    output.push_str(&format!("Fruit threshold: {}\n", engine.fruit_threshold()));
    output.push_str(&format!("Config: {}\n", engine.store().path().display()));
    output
}

pub fn status_json(engine: &StageEngine) -> Value {
    json!({
        "current_stage": engine.current_stage(),
        "current_index": engine.current_index().ok(),
        "stage_order": engine.stage_order(),
        "fruit_threshold": engine.fruit_threshold(),
        "config_path": engine.store().path().display().to_string(),
    })
}

/// `key: value` listing of a config document
pub fn format_config(config: &Config, path: &Path) -> String {
    let mut output = format!("# {}\n", path.display());
    for (key, val) in config.entries() {
        output.push_str(&format!("{}: {}\n", key, val));
    }
    output
}
