//! Engine configuration: paging, ranking, category rules, range policy and
//! source column names.
//!
//! Everything here has a default matching the Washington State EV population
//! dataset, and the whole structure can be overridden from a JSON file.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{EvError, Result};
use crate::models::ElectricRange;

/// Default number of rows shown per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default number of manufacturers kept in the ranked view.
pub const DEFAULT_TOP_N: usize = 10;

// ── FieldNames ────────────────────────────────────────────────────────────────

/// Source column header for each field the dashboard reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub vin: String,
    pub make: String,
    pub model: String,
    pub model_year: String,
    pub county: String,
    pub city: String,
    pub ev_type: String,
    pub electric_range: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            vin: "VIN (1-10)".to_string(),
            make: "Make".to_string(),
            model: "Model".to_string(),
            model_year: "Model Year".to_string(),
            county: "County".to_string(),
            city: "City".to_string(),
            ev_type: "Electric Vehicle Type".to_string(),
            electric_range: "Electric Range".to_string(),
        }
    }
}

// ── RangePolicy ───────────────────────────────────────────────────────────────

/// How raw electric-range cells are interpreted.
///
/// The source dataset writes `0` when the range has not been researched, so
/// `"0"` is an "unknown" sentinel by default. The sentinel list is matched
/// against the trimmed cell text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangePolicy {
    pub unknown_values: Vec<String>,
}

impl Default for RangePolicy {
    fn default() -> Self {
        Self {
            unknown_values: vec!["0".to_string()],
        }
    }
}

impl RangePolicy {
    /// Classify a raw range cell.
    ///
    /// Numeric text is read the way a lenient integer parser would: `"215"`
    /// and `"215.7"` both yield 215 miles.
    pub fn classify(&self, raw: Option<&str>) -> ElectricRange {
        let Some(raw) = raw else {
            return ElectricRange::Unknown;
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() || self.unknown_values.iter().any(|v| v.trim() == trimmed) {
            return ElectricRange::Unknown;
        }
        match parse_miles(trimmed) {
            Some(miles) if self.is_numeric_sentinel(miles) => ElectricRange::Unknown,
            Some(miles) => ElectricRange::Known(miles),
            None => ElectricRange::Invalid,
        }
    }

    /// Spellings such as `"00"` or `"0.0"` match a numeric sentinel like `"0"`.
    fn is_numeric_sentinel(&self, miles: u32) -> bool {
        self.unknown_values
            .iter()
            .any(|v| parse_miles(v.trim()) == Some(miles))
    }
}

fn parse_miles(text: &str) -> Option<u32> {
    if let Ok(miles) = text.parse::<u32>() {
        return Some(miles);
    }
    let value: f64 = text.parse().ok()?;
    if value.is_finite() && value >= 0.0 && value <= f64::from(u32::MAX) {
        Some(value.trunc() as u32)
    } else {
        None
    }
}

// ── Category rules ────────────────────────────────────────────────────────────

/// How a category rule tests a powertrain tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMatcher {
    /// Case-sensitive substring containment.
    Contains(String),
    /// Regular expression searched anywhere in the tag.
    Pattern(String),
}

/// One labelled category of the distribution view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    #[serde(flatten)]
    pub matcher: TagMatcher,
}

impl CategoryRule {
    pub fn contains(label: impl Into<String>, needle: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            matcher: TagMatcher::Contains(needle.into()),
        }
    }

    pub fn pattern(label: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            matcher: TagMatcher::Pattern(pattern.into()),
        }
    }
}

/// BEV then PHEV, each matched by its own abbreviation.
pub fn default_categories() -> Vec<CategoryRule> {
    vec![
        CategoryRule::contains("BEV", "BEV"),
        CategoryRule::contains("PHEV", "PHEV"),
    ]
}

// ── EngineConfig ──────────────────────────────────────────────────────────────

/// Settings recognised when a dashboard is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub page_size: usize,
    pub top_n: usize,
    pub categories: Vec<CategoryRule>,
    pub range_policy: RangePolicy,
    pub fields: FieldNames,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            top_n: DEFAULT_TOP_N,
            categories: default_categories(),
            range_policy: RangePolicy::default(),
            fields: FieldNames::default(),
        }
    }
}

impl EngineConfig {
    /// Read a JSON config file. Keys that are absent keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| EvError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(EvError::Config("page_size must be positive".to_string()));
        }
        if self.top_n == 0 {
            return Err(EvError::Config("top_n must be positive".to_string()));
        }
        for (i, rule) in self.categories.iter().enumerate() {
            if rule.label.trim().is_empty() {
                return Err(EvError::Config(format!("category rule {i} has an empty label")));
            }
            if self.categories[..i].iter().any(|r| r.label == rule.label) {
                return Err(EvError::Config(format!(
                    "duplicate category label: {}",
                    rule.label
                )));
            }
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
