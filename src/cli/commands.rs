use clap::{Parser, Subcommand};
use crate::cli::abbrev;
use crate::cli::error::{user_error, validate_config_key, parse_param_value};
use crate::cli::output::{format_config, format_evaluation, evaluation_json, format_status, status_json, is_tty};
use crate::config::{resolve_config_dir, validate_param, ConfigStore, DEFAULT_CONFIG_NAME, RECOGNIZED_KEYS};
use crate::engine::StageEngine;
use crate::models::DetectionCounts;
use crate::utils::fuzzy;
use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "growstage")]
#[command(about = "Growth Stage Tracker - advance a plant's life-cycle stage from detection counts")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration directory (defaults to $GROWSTAGE_CONFIG_DIR, then the platform config dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
    /// Configuration file name inside the config directory
    #[arg(long, global = true, value_name = "NAME", default_value = DEFAULT_CONFIG_NAME)]
    pub config_name: String,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate detection counts and advance the stage if warranted
    Evaluate {
        /// Detection counts as CLASS=COUNT (e.g., "flower=5 fruit=1")
        counts: Vec<String>,
        /// Read counts from a JSON file ("-" for stdin); accepts a bare
        /// {class: count} object or a detector response with a "counts" field
        #[arg(long, value_name = "FILE")]
        from: Option<PathBuf>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Show the current stage and lifecycle
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Configuration management commands
    Config {
        #[command(subcommand)]
        subcommand: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the whole configuration document
    Show {
        /// Output the raw JSON document
        #[arg(long)]
        json: bool,
    },
    /// Print one configuration value
    Get {
        key: String,
    },
    /// Set a configuration value (VALUE is parsed as JSON, else taken as a string)
    Set {
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Restore the built-in defaults
    Reset,
    /// Print the configuration file path
    Path,
}

pub fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    
    // Expand command abbreviations before clap sees them
    let mut args = match abbrev::expand_command_abbreviations(args) {
        Ok(expanded) => expanded,
        Err(e) => user_error(&e),
    };
    args.insert(0, "growstage".to_string());
    
    let cli = Cli::parse_from(args);
    handle_command(cli)
}

pub fn handle_command(cli: Cli) -> Result<()> {
    let config_dir = resolve_config_dir(cli.config_dir);
    let config_name = cli.config_name;
    
    match cli.command {
        Commands::Evaluate { counts, from, json } => {
            handle_evaluate(&config_dir, &config_name, &counts, from.as_deref(), json)
        }
        Commands::Status { json } => handle_status(&config_dir, &config_name, json),
        Commands::Config { subcommand } => {
            handle_config(&config_dir, &config_name, subcommand)
        }
    }
}

/// Read counts JSON from a file, or stdin for "-"
fn read_counts_file(path: &Path) -> Result<DetectionCounts> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)
            .context("Could not read counts from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Could not read counts file: {}", path.display()))?
    };
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("Counts input is not valid JSON: {}", path.display()))?;
    Ok(DetectionCounts::from_json(&value)?)
}

fn handle_evaluate(
    config_dir: &Path,
    config_name: &str,
    tokens: &[String],
    from: Option<&Path>,
    json: bool,
) -> Result<()> {
    if tokens.is_empty() && from.is_none() {
        bail!("No detection counts given. Pass CLASS=COUNT arguments (e.g., flower=2 fruit=0) or --from FILE");
    }
    
    let mut counts = match from {
        Some(path) => read_counts_file(path)?,
        None => DetectionCounts::new(),
    };
    // Arguments override values from the file
    counts.merge(DetectionCounts::from_tokens(tokens)?);
    
    let mut engine = StageEngine::open(config_dir, config_name);
    let eval = engine.evaluate_detailed(&counts)?;
    
    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation_json(&eval))?);
    } else {
        print!("{}", format_evaluation(&eval, is_tty()));
    }
    Ok(())
}

fn handle_status(config_dir: &Path, config_name: &str, json: bool) -> Result<()> {
    let engine = StageEngine::open(config_dir, config_name);

    if json {
        println!("{}", serde_json::to_string_pretty(&status_json(&engine))?);
    } else {
        print!("{}", format_status(&engine, is_tty()));
    }
    Ok(())
}

fn handle_config(config_dir: &Path, config_name: &str, subcommand: ConfigCommands) -> Result<()> {
    let mut store = ConfigStore::open(config_dir, config_name);
    
    match subcommand {
        ConfigCommands::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(store.config())?);
            } else {
                print!("{}", format_config(store.config(), store.path()));
            }
        }
        ConfigCommands::Get { key } => {
            match store.config().get(&key) {
                Some(serde_json::Value::String(s)) => println!("{}", s),
                Some(value) => println!("{}", value),
                None => bail!("Config key '{}' is not set", key),
            }
        }
        ConfigCommands::Set { key, value } => {
            if let Err(e) = validate_config_key(&key) {
                bail!(e);
            }
            let value = parse_param_value(&value);
            
            if RECOGNIZED_KEYS.contains(&key.as_str()) {
                validate_param(&key, &value)?;
            } else if let Some(suggestion) = fuzzy::suggest(&key, RECOGNIZED_KEYS, 2) {
                eprintln!(
                    "Note: '{}' is not a recognized key and will be stored as-is. Did you mean '{}'?",
                    key, suggestion
                );
            }
            
            if !store.update_param(&key, value.clone()) {
                bail!("Failed to save config: {}", store.path().display());
            }
            println!("Set {} = {}", key, value);
        }
        ConfigCommands::Reset => {
            store.reset();
            println!("Configuration reset to defaults ({})", store.path().display());
        }
        ConfigCommands::Path => {
            println!("{}", store.path().display());
        }
    }
    Ok(())
}
