// ── Results store ──
//
// Owner of the full result set and its derived filtered/sorted/paginated
// view, plus the selection set. All mutation goes through the methods
// below; rendering reads the view model from `view()` and never writes.

mod view;

pub use view::{PagerItem, RowView, TableView};

use std::collections::{BTreeSet, HashMap};

use crate::model::{EndpointResult, SortField, SortOrder};

/// Fixed page size for the result table.
pub const PAGE_SIZE: usize = 50;

/// Client-side store for endpoint results.
///
/// Invariants held after every operation:
/// - the filtered view is a subset of the full set,
/// - the page index is within `[1, page_count()]`,
/// - the selection only contains domains from the current full set.
#[derive(Debug)]
pub struct ResultsStore {
    all: Vec<EndpointResult>,
    filtered: Vec<EndpointResult>,
    query: String,
    /// Per-column remembered sort direction. Toggling one column does not
    /// reset the direction another column last used.
    column_order: HashMap<SortField, SortOrder>,
    sort: (SortField, SortOrder),
    /// Current page, 1-based.
    page: usize,
    selection: BTreeSet<String>,
}

impl ResultsStore {
    pub fn new() -> Self {
        Self {
            all: Vec::new(),
            filtered: Vec::new(),
            query: String::new(),
            column_order: HashMap::new(),
            sort: (SortField::Latency, SortOrder::Asc),
            page: 1,
            selection: BTreeSet::new(),
        }
    }

    // ── Ingestion ────────────────────────────────────────────────────

    /// Replace the full result set with a freshly fetched snapshot.
    ///
    /// Clears any active filter, restores the default ascending-latency
    /// sort, resets to page 1, and prunes the selection to domains still
    /// present.
    pub fn replace_all(&mut self, results: Vec<EndpointResult>) {
        self.all = results;
        self.query.clear();
        self.sort = (SortField::Latency, SortOrder::Asc);
        self.filtered = self.all.clone();
        self.apply_sort();
        self.page = 1;

        let domains: BTreeSet<&str> = self.all.iter().map(|r| r.domain.as_str()).collect();
        self.selection.retain(|d| domains.contains(d.as_str()));
    }

    // ── Filtering ────────────────────────────────────────────────────

    /// Filter by a case-insensitive substring of domain, country, or city.
    /// An empty query matches everything. Always resets to page 1.
    pub fn set_filter(&mut self, query: &str) {
        self.query = query.to_lowercase();
        self.refilter();
        self.page = 1;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    fn refilter(&mut self) {
        let query = self.query.clone();
        self.filtered = self
            .all
            .iter()
            .filter(|r| Self::matches(r, &query))
            .cloned()
            .collect();
        self.apply_sort();
        self.clamp_page();
    }

    fn matches(result: &EndpointResult, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        result.domain.to_lowercase().contains(query)
            || result.country.to_lowercase().contains(query)
            || result.city.to_lowercase().contains(query)
    }

    // ── Sorting ──────────────────────────────────────────────────────

    /// Sort by a column, toggling that column's remembered direction.
    ///
    /// The first sort on a column is ascending; repeated sorts on the
    /// same column alternate. Other columns keep their own remembered
    /// direction. Sorting operates on the filtered set and resets to
    /// page 1.
    pub fn sort_by_column(&mut self, field: SortField) {
        let next = self
            .column_order
            .get(&field)
            .map_or(SortOrder::Asc, |o| o.toggled());
        self.column_order.insert(field, next);
        self.sort = (field, next);
        self.apply_sort();
        self.page = 1;
    }

    /// The currently applied (field, order) pair.
    pub fn sort(&self) -> (SortField, SortOrder) {
        self.sort
    }

    fn apply_sort(&mut self) {
        let (field, order) = self.sort;
        // Stable sort: equal keys keep their relative order.
        self.filtered.sort_by(|a, b| {
            let ord = match field {
                SortField::Domain => a.domain.to_lowercase().cmp(&b.domain.to_lowercase()),
                SortField::Latency => a.latency_ms.total_cmp(&b.latency_ms),
                SortField::Ip => a.ip.to_lowercase().cmp(&b.ip.to_lowercase()),
                SortField::Country => a.country.to_lowercase().cmp(&b.country.to_lowercase()),
                SortField::City => a.city.to_lowercase().cmp(&b.city.to_lowercase()),
            };
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
    }

    // ── Pagination ───────────────────────────────────────────────────

    /// Number of pages. An empty filtered set still has one (empty) page
    /// so the page index is never out of range.
    pub fn page_count(&self) -> usize {
        self.filtered.len().div_ceil(PAGE_SIZE).max(1)
    }

    /// Current page, 1-based.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Jump to a page; out-of-range targets are clamped.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.page_count());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    fn clamp_page(&mut self) {
        self.page = self.page.clamp(1, self.page_count());
    }

    /// The slice of filtered results on the current page.
    pub fn page_rows(&self) -> &[EndpointResult] {
        let start = (self.page - 1) * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.filtered.len());
        if start >= self.filtered.len() {
            return &[];
        }
        &self.filtered[start..end]
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Toggle one domain's membership in the selection set. Unknown
    /// domains are ignored, keeping the selection a subset of fetched
    /// results.
    pub fn toggle_selected(&mut self, domain: &str) {
        if !self.all.iter().any(|r| r.domain == domain) {
            return;
        }
        if !self.selection.remove(domain) {
            self.selection.insert(domain.to_owned());
        }
    }

    /// Local toggle: set or clear only the rows on the current page.
    /// If every row on the page is already selected, deselect them;
    /// otherwise select them all.
    pub fn toggle_page_selection(&mut self) {
        let domains: Vec<String> = self.page_rows().iter().map(|r| r.domain.clone()).collect();
        if domains.is_empty() {
            return;
        }
        let all_selected = domains.iter().all(|d| self.selection.contains(d));
        if all_selected {
            for d in &domains {
                self.selection.remove(d);
            }
        } else {
            self.selection.extend(domains);
        }
    }

    /// Global toggle over the entire filtered set (all pages). Clears the
    /// selection when it already equals the filtered set, otherwise adds
    /// every filtered domain.
    pub fn toggle_global_selection(&mut self) {
        let filtered: BTreeSet<String> = self.filtered.iter().map(|r| r.domain.clone()).collect();
        if self.selection == filtered {
            self.selection.clear();
        } else {
            self.selection.extend(filtered);
        }
    }

    pub fn is_selected(&self, domain: &str) -> bool {
        self.selection.contains(domain)
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    /// Selected domains that are also in the current filtered view —
    /// what the speedtest trigger label reflects.
    pub fn selected_in_filtered(&self) -> usize {
        self.filtered
            .iter()
            .filter(|r| self.selection.contains(&r.domain))
            .count()
    }

    /// The selection as an ordered domain list, for speedtest dispatch.
    pub fn selected_domains(&self) -> Vec<String> {
        self.selection.iter().cloned().collect()
    }

    // ── Counts ───────────────────────────────────────────────────────

    pub fn total_count(&self) -> usize {
        self.all.len()
    }

    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }
}

impl Default for ResultsStore {
    fn default() -> Self {
        Self::new()
    }
}
