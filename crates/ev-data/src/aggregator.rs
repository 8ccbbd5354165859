//! Trend, distribution and ranked-average views over a record set.

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};

use ev_core::config::{EngineConfig, RangePolicy, DEFAULT_TOP_N};
use ev_core::error::Result;
use ev_core::models::{DashboardViews, DistributionSlice, RankedAverage, TrendPoint, VehicleRecord};
use tracing::debug;

use crate::classifier::Classifier;

// ── RangeAccumulator ──────────────────────────────────────────────────────────

/// Running range total for one manufacturer.
#[derive(Debug, Clone, Default)]
struct RangeAccumulator {
    sum: u64,
    count: u64,
}

impl RangeAccumulator {
    fn add(&mut self, miles: u32) {
        self.sum += u64::from(miles);
        self.count += 1;
    }

    /// Mean rounded half away from zero.
    fn rounded_mean(&self) -> u32 {
        (self.sum as f64 / self.count as f64).round() as u32
    }
}

// ── ViewAggregator ────────────────────────────────────────────────────────────

/// Computes the three dashboard views. Holds only configuration; every call
/// is a pure function of its input slice.
#[derive(Debug, Clone)]
pub struct ViewAggregator {
    classifier: Classifier,
    range_policy: RangePolicy,
    top_n: usize,
}

impl Default for ViewAggregator {
    fn default() -> Self {
        Self {
            classifier: Classifier::default(),
            range_policy: RangePolicy::default(),
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl ViewAggregator {
    pub fn new(classifier: Classifier, range_policy: RangePolicy, top_n: usize) -> Self {
        Self {
            classifier,
            range_policy,
            top_n,
        }
    }

    /// Build from an engine config, compiling its category rules.
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        Ok(Self::new(
            Classifier::new(&config.categories)?,
            config.range_policy.clone(),
            config.top_n,
        ))
    }

    pub fn range_policy(&self) -> &RangePolicy {
        &self.range_policy
    }

    /// Compute all three views.
    pub fn aggregate<R: Borrow<VehicleRecord>>(&self, records: &[R]) -> DashboardViews {
        let views = DashboardViews {
            trend: self.trend(records),
            distribution: self.distribution(records),
            ranked: self.ranked_averages(records),
        };
        debug!(
            records = records.len(),
            periods = views.trend.len(),
            categories = views.distribution.len(),
            ranked = views.ranked.len(),
            "views aggregated"
        );
        views
    }

    /// Registrations per model year, ascending by year.
    ///
    /// Records without a parseable year are skipped.
    pub fn trend<R: Borrow<VehicleRecord>>(&self, records: &[R]) -> Vec<TrendPoint> {
        let mut counts: BTreeMap<i32, u64> = BTreeMap::new();
        for record in records {
            let record: &VehicleRecord = record.borrow();
            if let Some(year) = record.model_year() {
                *counts.entry(year).or_default() += 1;
            }
        }
        counts
            .into_iter()
            .map(|(period, count)| TrendPoint { period, count })
            .collect()
    }

    /// Registrations per powertrain category, in rule order.
    ///
    /// Categories with no match are omitted; records matching no rule are
    /// dropped from this view only.
    pub fn distribution<R: Borrow<VehicleRecord>>(&self, records: &[R]) -> Vec<DistributionSlice> {
        let mut counts = vec![0u64; self.classifier.len()];
        for record in records {
            let record: &VehicleRecord = record.borrow();
            let Some(tag) = record.powertrain() else {
                continue;
            };
            for i in self.classifier.matching(tag) {
                counts[i] += 1;
            }
        }
        self.classifier
            .labels()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(label, count)| DistributionSlice {
                label: label.to_string(),
                count,
            })
            .collect()
    }

    /// Top manufacturers by mean electric range, highest first.
    ///
    /// Only records with a manufacturer and a positive known range count.
    /// Equal means keep the order in which manufacturers were first seen.
    pub fn ranked_averages<R: Borrow<VehicleRecord>>(&self, records: &[R]) -> Vec<RankedAverage> {
        let mut order: Vec<(&str, RangeAccumulator)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for record in records {
            let record: &VehicleRecord = record.borrow();
            let (Some(make), Some(miles)) = (
                record.manufacturer(),
                record.electric_range(&self.range_policy).qualifying_miles(),
            ) else {
                continue;
            };
            let slot = *index.entry(make).or_insert_with(|| {
                order.push((make, RangeAccumulator::default()));
                order.len() - 1
            });
            order[slot].1.add(miles);
        }

        let mut ranked: Vec<RankedAverage> = order
            .into_iter()
            .map(|(make, acc)| RankedAverage {
                label: make.to_string(),
                average_range: acc.rounded_mean(),
            })
            .collect();
        ranked.sort_by(|a, b| b.average_range.cmp(&a.average_range));
        ranked.truncate(self.top_n);
        ranked
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
