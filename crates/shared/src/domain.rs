use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

/// Lower bound (inclusive) of the moderate tier.
pub const MODERATE_STRESS_THRESHOLD: f64 = 0.3;
/// Lower bound (inclusive) of the high tier.
pub const HIGH_STRESS_THRESHOLD: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressTier {
    Low,
    Moderate,
    High,
}

impl StressTier {
    /// `[0, 0.3)` low, `[0.3, 0.6)` moderate, everything from 0.6 up is high.
    pub fn classify(score: f64) -> Self {
        if score < MODERATE_STRESS_THRESHOLD {
            Self::Low
        } else if score < HIGH_STRESS_THRESHOLD {
            Self::Moderate
        } else {
            Self::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Stress",
            Self::Moderate => "Moderate Stress",
            Self::High => "High Stress",
        }
    }
}

impl fmt::Display for StressTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureContribution {
    pub name: String,
    pub value: f64,
}

impl FeatureContribution {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Feature contributions in the order the server sent them.
///
/// Serialized as a JSON object. Values are independent magnitudes: they are
/// neither normalized nor clamped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureContributions(Vec<FeatureContribution>);

impl FeatureContributions {
    pub fn new(entries: Vec<FeatureContribution>) -> Self {
        Self(entries)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FeatureContribution> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value)
    }
}

impl<'a> IntoIterator for &'a FeatureContributions {
    type Item = &'a FeatureContribution;
    type IntoIter = std::slice::Iter<'a, FeatureContribution>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, f64)> for FeatureContributions {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| FeatureContribution { name, value })
                .collect(),
        )
    }
}

impl Serialize for FeatureContributions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for entry in &self.0 {
            map.serialize_entry(&entry.name, &entry.value)?;
        }
        map.end()
    }
}

struct FeatureContributionsVisitor;

impl<'de> Visitor<'de> for FeatureContributionsVisitor {
    type Value = FeatureContributions;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of feature name to numeric contribution")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((name, value)) = access.next_entry::<String, f64>()? {
            entries.push(FeatureContribution { name, value });
        }
        Ok(FeatureContributions(entries))
    }
}

impl<'de> Deserialize<'de> for FeatureContributions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(FeatureContributionsVisitor)
    }
}

/// One successful analysis. Replaced wholesale by the next success.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: f64,
    pub features: FeatureContributions,
}

impl ScoreResult {
    pub fn tier(&self) -> StressTier {
        StressTier::classify(self.score)
    }
}
