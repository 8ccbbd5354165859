use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{FieldNames, RangePolicy};
use crate::error::{EvError, Result};

/// Selector value meaning "no group filter".
pub const ALL_GROUPS: &str = "All";

// ── VehicleRecord ─────────────────────────────────────────────────────────────

/// A single registration row read from the source table.
///
/// Every field is optional: an empty or whitespace-only cell is stored as
/// `None`. Values are kept verbatim otherwise, so the listing can show exactly
/// what the source contained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    /// Truncated vehicle identification number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
    /// Manufacturer, e.g. `"TESLA"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Model year as it appeared in the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_year: Option<String>,
    /// Registration county; the group key used for filtering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Powertrain tag, e.g. `"Battery Electric Vehicle (BEV)"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ev_type: Option<String>,
    /// Electric range in miles as it appeared in the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub electric_range: Option<String>,
}

impl VehicleRecord {
    /// Build a record from `(column, value)` pairs, picking out the columns
    /// named in `names`. Unrecognised columns are ignored.
    pub fn from_fields<'a, I>(fields: I, names: &FieldNames) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut record = VehicleRecord::default();
        for (column, value) in fields {
            let slot = if column == names.vin {
                &mut record.vin
            } else if column == names.make {
                &mut record.make
            } else if column == names.model {
                &mut record.model
            } else if column == names.model_year {
                &mut record.model_year
            } else if column == names.county {
                &mut record.county
            } else if column == names.city {
                &mut record.city
            } else if column == names.ev_type {
                &mut record.ev_type
            } else if column == names.electric_range {
                &mut record.electric_range
            } else {
                continue;
            };
            *slot = present(value);
        }
        record
    }

    /// Model year parsed as an integer, or `None` when absent or not numeric.
    pub fn model_year(&self) -> Option<i32> {
        self.model_year.as_deref()?.trim().parse().ok()
    }

    /// Manufacturer name, if present.
    pub fn manufacturer(&self) -> Option<&str> {
        self.make.as_deref()
    }

    /// Registration group (county), if present.
    pub fn group_key(&self) -> Option<&str> {
        self.county.as_deref()
    }

    /// Powertrain tag, if present.
    pub fn powertrain(&self) -> Option<&str> {
        self.ev_type.as_deref()
    }

    /// Classify the electric range under `policy`.
    pub fn electric_range(&self, policy: &RangePolicy) -> ElectricRange {
        policy.classify(self.electric_range.as_deref())
    }
}

fn present(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// ── ElectricRange ─────────────────────────────────────────────────────────────

/// Interpretation of a record's electric-range cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "miles")]
pub enum ElectricRange {
    /// A numeric range in miles.
    Known(u32),
    /// Missing, or one of the policy's "unknown" sentinels (`"0"` by default).
    Unknown,
    /// Present but not a usable positive number.
    Invalid,
}

impl ElectricRange {
    /// The range in miles when it can take part in an average: known and
    /// strictly positive.
    pub fn qualifying_miles(self) -> Option<u32> {
        match self {
            ElectricRange::Known(miles) if miles > 0 => Some(miles),
            _ => None,
        }
    }
}

// ── GroupSelector ─────────────────────────────────────────────────────────────

/// The active group filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupSelector {
    #[default]
    All,
    Group(String),
}

impl GroupSelector {
    /// Resolve a user-supplied name against the groups present in the data.
    ///
    /// `available` is the list produced by the filter stage, including the
    /// leading `"All"`. Names outside it are rejected.
    pub fn resolve(name: &str, available: &[String]) -> Result<Self> {
        if name == ALL_GROUPS {
            return Ok(GroupSelector::All);
        }
        if available.iter().any(|g| g == name) {
            Ok(GroupSelector::Group(name.to_string()))
        } else {
            Err(EvError::UnknownGroup(name.to_string()))
        }
    }

    /// `true` when `record` belongs to the selected group.
    pub fn matches(&self, record: &VehicleRecord) -> bool {
        match self {
            GroupSelector::All => true,
            GroupSelector::Group(name) => record.group_key() == Some(name.as_str()),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, GroupSelector::All)
    }
}

impl fmt::Display for GroupSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupSelector::All => write!(f, "{ALL_GROUPS}"),
            GroupSelector::Group(name) => write!(f, "{name}"),
        }
    }
}

// ── Derived views ─────────────────────────────────────────────────────────────

/// Number of registrations for one model year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: i32,
    pub count: u64,
}

/// Number of registrations falling into one powertrain category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionSlice {
    pub label: String,
    pub count: u64,
}

/// Rounded mean electric range for one manufacturer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedAverage {
    pub label: String,
    pub average_range: u32,
}

/// The three summary views computed from one filtered record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardViews {
    pub trend: Vec<TrendPoint>,
    pub distribution: Vec<DistributionSlice>,
    pub ranked: Vec<RankedAverage>,
}

impl DashboardViews {
    pub fn is_empty(&self) -> bool {
        self.trend.is_empty() && self.distribution.is_empty() && self.ranked.is_empty()
    }
}

/// One window of a paged listing. `current_page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn is_first(&self) -> bool {
        self.current_page <= 1
    }

    pub fn is_last(&self) -> bool {
        self.current_page >= self.total_pages
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
