use crate::models::{StageOrder, DEFAULT_STAGES};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const KEY_STAGE_ORDER: &str = "stage_order";
pub const KEY_CURRENT_STAGE: &str = "current_stage";
pub const KEY_FRUIT_THRESHOLD: &str = "fruit_threshold";

/// Keys the engine interprets; anything else is passed through untouched
pub const RECOGNIZED_KEYS: &[&str] = &[KEY_STAGE_ORDER, KEY_CURRENT_STAGE, KEY_FRUIT_THRESHOLD];

pub const DEFAULT_FRUIT_THRESHOLD: u64 = 3;

/// A recognized key was given a value of the wrong shape
#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("'stage_order' must be a non-empty list of unique, non-blank stage names")]
    InvalidStageOrder,
    #[error("'current_stage' must be an integer stage offset, got {0}")]
    InvalidStageIndex(String),
    #[error("'fruit_threshold' must be a non-negative integer, got {0}")]
    InvalidThreshold(String),
}

/// The persisted configuration document.
///
/// Entries are kept exactly as read, recognized keys included, and
/// written back in file order. Recognized keys are parsed leniently on
/// read only, so an update to one key never rewrites another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    entries: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        let mut entries = Map::new();
        entries.insert(KEY_STAGE_ORDER.to_string(), Value::from(DEFAULT_STAGES.to_vec()));
        entries.insert(KEY_CURRENT_STAGE.to_string(), Value::from(0));
        entries.insert(KEY_FRUIT_THRESHOLD.to_string(), Value::from(DEFAULT_FRUIT_THRESHOLD));
        Config { entries }
    }
}

impl Config {
    /// Parse a document from JSON text; the top level must be an object
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Serialize with 4-space indentation; non-ASCII is written literally
    pub fn to_json_pretty(&self) -> serde_json::Result<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        Ok(buf)
    }

    /// Raw value of a top-level key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Set a top-level key, leaving every other entry untouched
    pub fn set(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    pub fn entries(&self) -> &Map<String, Value> {
        &self.entries
    }

    /// Whether a recognized key holds something other than null
    pub fn is_set(&self, key: &str) -> bool {
        !matches!(self.entries.get(key), None | Some(Value::Null))
    }

    /// Stage labels if `stage_order` is a list of strings
    pub fn stage_labels(&self) -> Option<Vec<String>> {
        self.entries.get(KEY_STAGE_ORDER).and_then(lenient::string_list)
    }

    /// Stage order if present and valid
    pub fn stage_order(&self) -> Option<StageOrder> {
        self.stage_labels().and_then(StageOrder::new)
    }

    /// Stored offset, 0 when absent or non-numeric
    pub fn current_stage(&self) -> i64 {
        self.entries
            .get(KEY_CURRENT_STAGE)
            .and_then(lenient::index)
            .unwrap_or(0)
    }

    pub fn fruit_threshold(&self) -> u64 {
        self.entries
            .get(KEY_FRUIT_THRESHOLD)
            .and_then(lenient::threshold)
            .unwrap_or(DEFAULT_FRUIT_THRESHOLD)
    }
}

/// Strict check for values headed to a recognized key
pub fn validate_param(key: &str, value: &Value) -> Result<(), ParamError> {
    match key {
        KEY_STAGE_ORDER => {
            let labels: Vec<String> =
                serde_json::from_value(value.clone()).map_err(|_| ParamError::InvalidStageOrder)?;
            StageOrder::new(labels).map(|_| ()).ok_or(ParamError::InvalidStageOrder)
        }
        KEY_CURRENT_STAGE => match value.as_i64() {
            Some(_) => Ok(()),
            None => Err(ParamError::InvalidStageIndex(value.to_string())),
        },
        KEY_FRUIT_THRESHOLD => match value.as_u64() {
            Some(_) => Ok(()),
            None => Err(ParamError::InvalidThreshold(value.to_string())),
        },
        _ => Ok(()),
    }
}

mod lenient {
    use serde_json::Value;

    pub fn string_list(value: &Value) -> Option<Vec<String>> {
        match value {
            Value::Null => None,
            Value::Array(items) => {
                let labels: Option<Vec<String>> =
                    items.iter().map(|v| v.as_str().map(str::to_string)).collect();
                if labels.is_none() {
                    log::warn!("ignoring stage_order: entries must be strings");
                }
                labels
            }
            other => {
                log::warn!("ignoring stage_order: expected a list, got {}", other);
                None
            }
        }
    }

    /// Integers pass through, floats truncate, numeric strings parse,
    /// booleans read as 0/1. Anything else is treated as absent.
    pub fn index(value: &Value) -> Option<i64> {
        let parsed = match value {
            Value::Null => return None,
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_u64().map(|_| i64::MAX))
                .or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            Value::Bool(b) => Some(*b as i64),
            _ => None,
        };
        if parsed.is_none() {
            log::warn!("ignoring non-numeric value {}", value);
        }
        parsed
    }

    pub fn threshold(value: &Value) -> Option<u64> {
        let parsed = index(value)?;
        if parsed < 0 {
            log::warn!("fruit_threshold {} is negative, using 0", parsed);
            return Some(0);
        }
        Some(parsed as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_document_shape() {
        let text = String::from_utf8(Config::default().to_json_pretty().unwrap()).unwrap();
        let expected = "{\n    \"stage_order\": [\n        \"seedling\",\n        \"flowering-fruiting\",\n        \"fruit-swelling\"\n    ],\n    \"current_stage\": 0,\n    \"fruit_threshold\": 3\n}";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_non_ascii_written_literally() {
        let mut config = Config::default();
        config.set(KEY_STAGE_ORDER, json!(["苗期", "开花结果期", "果实膨大期"]));
        let text = String::from_utf8(config.to_json_pretty().unwrap()).unwrap();
        assert!(text.contains("\"苗期\""));
        assert!(!text.contains("\\u"));
    }

    #[test]
    fn test_unknown_keys_round_trip() {
        let text = r#"{"stage_order": ["a", "b"], "current_stage": 1, "fruit_threshold": 5, "camera": {"id": 7}, "note": "x"}"#;
        let config = Config::from_json(text).unwrap();
        assert_eq!(config.entries().len(), 5);
        let reparsed = Config::from_json(
            std::str::from_utf8(&config.to_json_pretty().unwrap()).unwrap(),
        )
        .unwrap();
        assert_eq!(reparsed, config);
        assert_eq!(reparsed.get("camera"), Some(&json!({"id": 7})));
    }

    #[test]
    fn test_lenient_current_stage() {
        let config = Config::from_json(r#"{"current_stage": "abc"}"#).unwrap();
        assert_eq!(config.current_stage(), 0);
        assert_eq!(config.get(KEY_CURRENT_STAGE), Some(&json!("abc")));

        let config = Config::from_json(r#"{"current_stage": "2"}"#).unwrap();
        assert_eq!(config.current_stage(), 2);

        let config = Config::from_json(r#"{"current_stage": 1.9}"#).unwrap();
        assert_eq!(config.current_stage(), 1);

        let config = Config::from_json(r#"{"current_stage": -4}"#).unwrap();
        assert_eq!(config.current_stage(), -4);
    }

    #[test]
    fn test_lenient_threshold() {
        assert_eq!(Config::from_json(r#"{"fruit_threshold": -2}"#).unwrap().fruit_threshold(), 0);
        assert_eq!(Config::from_json(r#"{"fruit_threshold": "x"}"#).unwrap().fruit_threshold(), 3);
        assert_eq!(Config::from_json("{}").unwrap().fruit_threshold(), 3);
    }

    #[test]
    fn test_stage_order_validation() {
        let config = Config::from_json(r#"{"stage_order": []}"#).unwrap();
        assert_eq!(config.stage_labels(), Some(vec![]));
        assert!(config.stage_order().is_none());
        assert!(config.is_set(KEY_STAGE_ORDER));

        let config = Config::from_json(r#"{"stage_order": "seedling"}"#).unwrap();
        assert!(config.stage_labels().is_none());

        let config = Config::from_json(r#"{"stage_order": ["a", 1]}"#).unwrap();
        assert!(config.stage_labels().is_none());

        let config = Config::from_json(r#"{"stage_order": null}"#).unwrap();
        assert!(!config.is_set(KEY_STAGE_ORDER));
    }

    #[test]
    fn test_get_and_set() {
        let mut config = Config::default();
        config.set(KEY_CURRENT_STAGE, json!(2));
        config.set("operator", json!("greenhouse-3"));
        assert_eq!(config.get(KEY_CURRENT_STAGE), Some(&json!(2)));
        assert_eq!(config.get("operator"), Some(&json!("greenhouse-3")));
        assert_eq!(config.get("missing"), None);
    }

    #[test]
    fn test_set_leaves_unparseable_keys_alone() {
        let text = r#"{"stage_order": "seedling,bloom,ripe", "current_stage": 0, "fruit_threshold": -2}"#;
        let mut config = Config::from_json(text).unwrap();
        config.set(KEY_CURRENT_STAGE, json!(1));

        let written = String::from_utf8(config.to_json_pretty().unwrap()).unwrap();
        let expected = "{\n    \"stage_order\": \"seedling,bloom,ripe\",\n    \"current_stage\": 1,\n    \"fruit_threshold\": -2\n}";
        assert_eq!(written, expected);
    }

    #[test]
    fn test_not_an_object_is_rejected() {
        assert!(Config::from_json("[1, 2]").is_err());
        assert!(Config::from_json("null").is_err());
    }

    #[test]
    fn test_validate_param() {
        assert!(validate_param(KEY_STAGE_ORDER, &json!(["a", "b"])).is_ok());
        assert_eq!(validate_param(KEY_STAGE_ORDER, &json!([])), Err(ParamError::InvalidStageOrder));
        assert_eq!(validate_param(KEY_STAGE_ORDER, &json!("a")), Err(ParamError::InvalidStageOrder));
        assert!(validate_param(KEY_CURRENT_STAGE, &json!(-1)).is_ok());
        assert!(validate_param(KEY_CURRENT_STAGE, &json!("one")).is_err());
        assert!(validate_param(KEY_FRUIT_THRESHOLD, &json!(0)).is_ok());
        assert!(validate_param(KEY_FRUIT_THRESHOLD, &json!(-1)).is_err());
        assert!(validate_param("anything", &json!(null)).is_ok());
    }
}
