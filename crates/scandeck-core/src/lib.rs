// scandeck-core: domain model, results store, and polling lifecycle
// between scandeck-api and the dashboard UI.

pub mod error;
pub mod model;
pub mod monitor;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use model::{EndpointResult, LatencyClass, SortField, SortOrder};
pub use monitor::{Monitor, PollIntervals};
pub use store::{PAGE_SIZE, PagerItem, ResultsStore, RowView, TableView};

// Re-export the wire types consumers handle directly.
pub use scandeck_api::{LogEntry, ScanParams, ScanProgress, ScanStatus};
