//! Interactive dashboard session.
//!
//! Owns the materialized records together with the only mutable state of the
//! pipeline: the active group selector and the listing position. Changing the
//! selector or the records always sends the listing back to page 1.

use serde::Serialize;
use tracing::{debug, warn};

use ev_core::config::{EngineConfig, RangePolicy};
use ev_core::error::Result;
use ev_core::models::{DashboardViews, GroupSelector, Page, VehicleRecord};
use ev_data::aggregator::ViewAggregator;
use ev_data::analysis::DashboardSummary;
use ev_data::filter::{available_groups, filter_records};
use ev_data::pager::{total_pages, Pager};

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot<'a> {
    pub group: String,
    pub summary: DashboardSummary,
    pub views: DashboardViews,
    pub page: Page<&'a VehicleRecord>,
}

pub struct Dashboard {
    records: Vec<VehicleRecord>,
    groups: Vec<String>,
    aggregator: ViewAggregator,
    selector: GroupSelector,
    pager: Pager,
    /// Views of the filtered set for the selector they were computed under.
    memo: Option<(GroupSelector, DashboardViews)>,
}

impl Dashboard {
    /// Build a session over `records` with `config`.
    pub fn new(records: Vec<VehicleRecord>, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let groups = available_groups(&records);
        debug!(records = records.len(), groups = groups.len() - 1, "dashboard created");
        Ok(Self {
            records,
            groups,
            aggregator: ViewAggregator::from_config(config)?,
            selector: GroupSelector::All,
            pager: Pager::new(config.page_size),
            memo: None,
        })
    }

    pub fn records(&self) -> &[VehicleRecord] {
        &self.records
    }

    /// `"All"` followed by every county present in the records.
    pub fn available_groups(&self) -> &[String] {
        &self.groups
    }

    pub fn selector(&self) -> &GroupSelector {
        &self.selector
    }

    pub fn range_policy(&self) -> &RangePolicy {
        self.aggregator.range_policy()
    }

    /// Switch to the group called `name`.
    ///
    /// Returns `Ok(true)` when the selection changed (and the listing went
    /// back to page 1), `Ok(false)` when `name` was already selected. Unknown
    /// names are rejected and leave the session untouched.
    pub fn select_group(&mut self, name: &str) -> Result<bool> {
        let selector = GroupSelector::resolve(name, &self.groups).map_err(|e| {
            warn!(error = %e, "group selection rejected");
            e
        })?;
        if selector == self.selector {
            return Ok(false);
        }
        debug!(from = %self.selector, to = %selector, "group selected");
        self.selector = selector;
        self.on_filtered_set_changed();
        Ok(true)
    }

    /// Swap in a freshly loaded record set.
    ///
    /// A selected group that no longer exists falls back to `All`.
    pub fn replace_records(&mut self, records: Vec<VehicleRecord>) {
        self.records = records;
        self.groups = available_groups(&self.records);
        if let GroupSelector::Group(name) = &self.selector {
            if !self.groups.contains(name) {
                debug!(group = %name, "selected group vanished; showing all");
                self.selector = GroupSelector::All;
            }
        }
        self.on_filtered_set_changed();
    }

    /// Records passing the current selector, in source order.
    pub fn filtered(&self) -> Vec<&VehicleRecord> {
        filter_records(&self.records, &self.selector)
    }

    pub fn filtered_len(&self) -> usize {
        if self.selector.is_all() {
            self.records.len()
        } else {
            self.records.iter().filter(|r| self.selector.matches(r)).count()
        }
    }

    /// Views of the current filtered set, computed once per selection.
    pub fn views(&mut self) -> &DashboardViews {
        if self
            .memo
            .as_ref()
            .is_some_and(|(key, _)| *key != self.selector)
        {
            self.memo = None;
        }
        let (records, selector, aggregator) = (&self.records, &self.selector, &self.aggregator);
        &self
            .memo
            .get_or_insert_with(|| {
                let filtered = filter_records(records, selector);
                (selector.clone(), aggregator.aggregate(&filtered))
            })
            .1
    }

    pub fn summary(&mut self) -> DashboardSummary {
        let total = self.filtered_len();
        DashboardSummary::from_views(total, self.views())
    }

    pub fn current_page(&self) -> usize {
        self.pager.current_page()
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered_len(), self.pager.page_size())
    }

    /// The listing page at the current position.
    pub fn page(&mut self) -> Page<&VehicleRecord> {
        let filtered = filter_records(&self.records, &self.selector);
        self.pager.page(&filtered)
    }

    pub fn next_page(&mut self) {
        let total = self.total_pages();
        self.pager.advance(total);
    }

    pub fn previous_page(&mut self) {
        self.pager.retreat();
    }

    /// Jump to `page`; clamped when the page is taken.
    pub fn go_to_page(&mut self, page: usize) {
        self.pager.go_to(page);
    }

    /// Summary, views and current page in one value.
    pub fn snapshot(&mut self) -> DashboardSnapshot<'_> {
        let summary = self.summary();
        let views = self.views().clone();
        let group = self.selector.to_string();
        DashboardSnapshot {
            group,
            summary,
            views,
            page: self.page(),
        }
    }

    fn on_filtered_set_changed(&mut self) {
        self.pager.on_filter_changed();
        self.memo = None;
    }

    #[cfg(test)]
    fn is_memoized(&self) -> bool {
        self.memo.is_some()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
