// ── View-model layer ──
//
// Pure (state → view-model) transformation. The presentation side turns
// a TableView into widgets; nothing here touches the store mutably, so
// the whole rendering contract is testable without a terminal.

use crate::model::{LatencyClass, SortField, SortOrder};

use super::ResultsStore;

/// One rendered table row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub domain: String,
    pub latency_ms: f64,
    pub latency_class: LatencyClass,
    pub ip: String,
    pub country: String,
    pub city: String,
    pub rx_speed_mbps: Option<f64>,
    pub tx_speed_mbps: Option<f64>,
    pub selected: bool,
}

/// One pagination control: a page number or a gap marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerItem {
    Page { number: usize, current: bool },
    Ellipsis,
}

/// Everything the render layer needs for one paint of the results table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub rows: Vec<RowView>,
    pub total_count: usize,
    pub filtered_count: usize,
    pub page: usize,
    pub page_count: usize,
    pub pager: Vec<PagerItem>,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    /// Shown iff the filtered set is empty.
    pub no_results: bool,
    pub selected_count: usize,
    /// Selection count within the current filtered view, for the
    /// speedtest trigger label.
    pub selected_in_view: usize,
    pub sort: (SortField, SortOrder),
}

impl ResultsStore {
    /// Compute the current view-model. Identical state yields identical
    /// output; calling this never mutates the store.
    pub fn view(&self) -> TableView {
        let rows = self
            .page_rows()
            .iter()
            .map(|r| RowView {
                domain: r.domain.clone(),
                latency_ms: r.latency_ms,
                latency_class: r.latency_class(),
                ip: r.ip.clone(),
                country: r.country.clone(),
                city: r.city.clone(),
                rx_speed_mbps: r.rx_speed_mbps,
                tx_speed_mbps: r.tx_speed_mbps,
                selected: self.is_selected(&r.domain),
            })
            .collect();

        let page = self.page();
        let page_count = self.page_count();

        TableView {
            rows,
            total_count: self.total_count(),
            filtered_count: self.filtered_count(),
            page,
            page_count,
            pager: pager_items(page, page_count),
            prev_enabled: page > 1,
            next_enabled: page < page_count,
            no_results: self.filtered_count() == 0,
            selected_count: self.selected_count(),
            selected_in_view: self.selected_in_filtered(),
            sort: self.sort(),
        }
    }
}

/// Page numbers shown: first, last, current ± 2, with ellipsis markers
/// for the gaps.
pub fn pager_items(page: usize, page_count: usize) -> Vec<PagerItem> {
    let mut items = Vec::new();
    let mut last_shown = 0usize;

    for number in 1..=page_count {
        let near_current = number + 2 >= page && number <= page + 2;
        if number != 1 && number != page_count && !near_current {
            continue;
        }
        if last_shown != 0 && number > last_shown + 1 {
            items.push(PagerItem::Ellipsis);
        }
        items.push(PagerItem::Page {
            number,
            current: number == page,
        });
        last_shown = number;
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EndpointResult;
    use pretty_assertions::assert_eq;

    fn result(domain: &str, latency: f64) -> EndpointResult {
        EndpointResult {
            domain: domain.to_owned(),
            latency_ms: latency,
            ip: "1.1.1.1".to_owned(),
            country: "US".to_owned(),
            city: "NY".to_owned(),
            rx_speed_mbps: None,
            tx_speed_mbps: None,
        }
    }

    fn pages(items: &[PagerItem]) -> Vec<i64> {
        // Ellipsis encoded as -1 for compact assertions.
        items
            .iter()
            .map(|i| match i {
                PagerItem::Page { number, .. } => i64::try_from(*number).unwrap_or(0),
                PagerItem::Ellipsis => -1,
            })
            .collect()
    }

    #[test]
    fn pager_small_count_shows_all_pages() {
        assert_eq!(pages(&pager_items(1, 1)), vec![1]);
        assert_eq!(pages(&pager_items(2, 3)), vec![1, 2, 3]);
    }

    #[test]
    fn pager_windows_around_current_with_ellipsis() {
        assert_eq!(pages(&pager_items(5, 10)), vec![1, -1, 3, 4, 5, 6, 7, -1, 10]);
        assert_eq!(pages(&pager_items(1, 10)), vec![1, 2, 3, -1, 10]);
        assert_eq!(pages(&pager_items(10, 10)), vec![1, -1, 8, 9, 10]);
    }

    #[test]
    fn pager_no_ellipsis_when_window_touches_edges() {
        assert_eq!(pages(&pager_items(3, 5)), vec![1, 2, 3, 4, 5]);
        assert_eq!(pages(&pager_items(4, 6)), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn pager_marks_current_page() {
        let items = pager_items(2, 3);
        assert_eq!(
            items[1],
            PagerItem::Page {
                number: 2,
                current: true
            }
        );
    }

    #[test]
    fn view_flags_boundaries_and_placeholder() {
        let mut store = ResultsStore::new();
        let view = store.view();
        assert!(view.no_results);
        assert!(!view.prev_enabled);
        assert!(!view.next_enabled);

        store.replace_all((0..60).map(|i| result(&format!("h{i}.net"), f64::from(i))).collect());
        let view = store.view();
        assert!(!view.no_results);
        assert!(!view.prev_enabled);
        assert!(view.next_enabled);

        store.next_page();
        let view = store.view();
        assert!(view.prev_enabled);
        assert!(!view.next_enabled);
    }

    #[test]
    fn view_rows_carry_latency_class_and_selection() {
        let mut store = ResultsStore::new();
        store.replace_all(vec![result("a.com", 10.0), result("b.com", 200.0)]);
        store.toggle_selected("b.com");

        let view = store.view();
        assert_eq!(view.rows[0].latency_class, LatencyClass::Good);
        assert!(!view.rows[0].selected);
        assert_eq!(view.rows[1].latency_class, LatencyClass::Bad);
        assert!(view.rows[1].selected);
    }

    #[test]
    fn view_is_idempotent() {
        let mut store = ResultsStore::new();
        store.replace_all((0..75).map(|i| result(&format!("h{i}.net"), f64::from(i))).collect());
        store.set_filter("h1");
        store.toggle_page_selection();

        let first = store.view();
        let second = store.view();
        assert_eq!(first, second);
    }
}
