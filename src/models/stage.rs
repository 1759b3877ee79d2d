use serde::Serialize;

/// Built-in lifecycle used when the configuration has no usable stage order
pub const DEFAULT_STAGES: &[&str] = &["seedling", "flowering-fruiting", "fruit-swelling"];

/// Ordered stage labels, earliest stage first.
///
/// Invariants: at least one label, no blank labels, no duplicates.
/// Index 0 is the initial stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StageOrder(Vec<String>);

impl StageOrder {
    /// Build a stage order, rejecting empty lists, blank labels and duplicates
    pub fn new(labels: Vec<String>) -> Option<Self> {
        if labels.is_empty() {
            return None;
        }
        for (i, label) in labels.iter().enumerate() {
            if label.trim().is_empty() || labels[..i].contains(label) {
                return None;
            }
        }
        Some(StageOrder(labels))
    }

    pub fn last_index(&self) -> usize {
        self.0.len() - 1
    }

    /// Clamp a stored offset into `[0, len - 1]`
    pub fn clamp_index(&self, index: i64) -> usize {
        if index <= 0 {
            0
        } else {
            (index as u64).min(self.last_index() as u64) as usize
        }
    }

    /// Label at `index`, clamped into range
    pub fn label(&self, index: i64) -> &str {
        &self.0[self.clamp_index(index)]
    }

    /// Position of a label in the lifecycle
    pub fn position(&self, label: &str) -> Option<usize> {
        self.0.iter().position(|s| s == label)
    }

    pub fn labels(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }
}

impl Default for StageOrder {
    fn default() -> Self {
        StageOrder(DEFAULT_STAGES.iter().map(|s| s.to_string()).collect())
    }
}

/// Which branch of the stage decision fired for a set of counts.
///
/// The partition is fixed: any fruit at all lands in stage 1 or 2
/// regardless of the flower count, and `Flowering` and `FruitSetting`
/// both resolve to stage 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthSignal {
    /// No flowers, no fruit
    Dormant,
    /// Flowers present, fruit at or below threshold
    Flowering,
    /// Fruit above threshold (flowers not required)
    FruitAbundant,
    /// No flowers, fruit present but at or below threshold
    FruitSetting,
}

impl GrowthSignal {
    pub fn classify(flower: u64, fruit: u64, threshold: u64) -> Self {
        if flower == 0 && fruit == 0 {
            GrowthSignal::Dormant
        } else if flower > 0 && fruit <= threshold {
            GrowthSignal::Flowering
        } else if fruit > threshold {
            GrowthSignal::FruitAbundant
        } else {
            GrowthSignal::FruitSetting
        }
    }

    /// Lifecycle position this signal points at (before clamping to the order length)
    pub fn stage_index(&self) -> usize {
        match self {
            GrowthSignal::Dormant => 0,
            GrowthSignal::Flowering | GrowthSignal::FruitSetting => 1,
            GrowthSignal::FruitAbundant => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GrowthSignal::Dormant => "dormant",
            GrowthSignal::Flowering => "flowering",
            GrowthSignal::FruitAbundant => "fruit_abundant",
            GrowthSignal::FruitSetting => "fruit_setting",
        }
    }
}

impl std::fmt::Display for GrowthSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
