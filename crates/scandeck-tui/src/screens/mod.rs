//! Screen implementations. Each screen is a Component owning its own state.

pub mod logs;
pub mod results;

pub use logs::LogsScreen;
pub use results::ResultsScreen;
