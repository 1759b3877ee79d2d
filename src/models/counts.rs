use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

pub const FLOWER: &str = "flower";
pub const FRUIT: &str = "fruit";

/// Errors from malformed detection-count input
#[derive(Debug, Error, PartialEq)]
pub enum CountsError {
    #[error("detection counts must be a JSON object mapping class names to counts")]
    NotAnObject,
    #[error("invalid count for class '{class}': {value} (counts must be non-negative integers)")]
    InvalidCount { class: String, value: String },
    #[error("invalid count token '{0}': expected CLASS=COUNT (e.g. flower=3)")]
    InvalidToken(String),
    #[error("invalid detections: {0}")]
    InvalidDetections(String),
}

/// Per-image detection counts keyed by class name.
///
/// A `null` count is kept as `None` and reads as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionCounts(BTreeMap<String, Option<u64>>);

impl DetectionCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count for a class; missing and null both read as 0
    pub fn get(&self, class: &str) -> u64 {
        self.0.get(class).copied().flatten().unwrap_or(0)
    }

    pub fn set(&mut self, class: impl Into<String>, count: u64) {
        self.0.insert(class.into(), Some(count));
    }

    pub fn flower(&self) -> u64 {
        self.get(FLOWER)
    }

    pub fn fruit(&self) -> u64 {
        self.get(FRUIT)
    }

    /// Merge another set of counts in; entries from `other` replace ours
    pub fn merge(&mut self, other: DetectionCounts) {
        self.0.extend(other.0);
    }

    /// Tally per-box class ids from one detector run.
    ///
    /// Ids without a name in `names` are counted as `class_<id>`.
    pub fn tally(class_ids: &[u32], names: &HashMap<u32, String>) -> Self {
        let mut counts = DetectionCounts::new();
        for id in class_ids {
            let name = names
                .get(id)
                .cloned()
                .unwrap_or_else(|| format!("class_{}", id));
            let entry = counts.0.entry(name).or_insert(Some(0));
            *entry = Some(entry.unwrap_or(0).saturating_add(1));
        }
        counts
    }

    /// Parse counts from JSON.
    ///
    /// Accepts a bare `{class: count}` object, a detector response
    /// carrying the map under `"counts"`, or raw detections as
    /// `{"classes": [id, ...], "names": {"0": "flower", ...}}`.
    pub fn from_json(value: &Value) -> Result<Self, CountsError> {
        let map = match value {
            Value::Object(map) => match (map.get("counts"), map.get("classes")) {
                (Some(Value::Object(inner)), _) => inner,
                (_, Some(classes)) => return Self::from_detections(classes, map.get("names")),
                _ => map,
            },
            _ => return Err(CountsError::NotAnObject),
        };

        let mut counts = DetectionCounts::new();
        for (class, raw) in map {
            let count = match raw {
                Value::Null => None,
                Value::Number(n) => match n.as_u64() {
                    Some(c) => Some(c),
                    None => {
                        return Err(CountsError::InvalidCount {
                            class: class.clone(),
                            value: n.to_string(),
                        })
                    }
                },
                other => {
                    return Err(CountsError::InvalidCount {
                        class: class.clone(),
                        value: other.to_string(),
                    })
                }
            };
            counts.0.insert(class.clone(), count);
        }
        Ok(counts)
    }

    fn from_detections(classes: &Value, names: Option<&Value>) -> Result<Self, CountsError> {
        let ids = classes
            .as_array()
            .ok_or_else(|| CountsError::InvalidDetections("\"classes\" must be an array of class ids".to_string()))?
            .iter()
            .map(|id| {
                id.as_u64()
                    .and_then(|id| u32::try_from(id).ok())
                    .ok_or_else(|| CountsError::InvalidDetections(format!("bad class id {}", id)))
            })
            .collect::<Result<Vec<u32>, _>>()?;

        let mut labels = HashMap::new();
        match names {
            None | Some(Value::Null) => {}
            Some(Value::Object(entries)) => {
                for (id, name) in entries {
                    let id = id
                        .parse::<u32>()
                        .map_err(|_| CountsError::InvalidDetections(format!("bad class id '{}' in names", id)))?;
                    let name = name
                        .as_str()
                        .ok_or_else(|| CountsError::InvalidDetections(format!("name for class {} must be a string", id)))?;
                    labels.insert(id, name.to_string());
                }
            }
            Some(_) => {
                return Err(CountsError::InvalidDetections(
                    "\"names\" must map class ids to names".to_string(),
                ))
            }
        }
        Ok(Self::tally(&ids, &labels))
    }

    /// Parse `CLASS=COUNT` tokens (e.g. `flower=5 fruit=1`)
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, CountsError> {
        let mut counts = DetectionCounts::new();
        for token in tokens {
            let token = token.as_ref();
            let (class, value) = token
                .split_once('=')
                .ok_or_else(|| CountsError::InvalidToken(token.to_string()))?;
            let class = class.trim();
            if class.is_empty() {
                return Err(CountsError::InvalidToken(token.to_string()));
            }
            let count = value.trim().parse::<u64>().map_err(|_| CountsError::InvalidCount {
                class: class.to_string(),
                value: value.to_string(),
            })?;
            counts.set(class, count);
        }
        Ok(counts)
    }
}
