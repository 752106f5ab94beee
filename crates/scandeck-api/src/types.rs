//! Wire types for the scanner service API.
//!
//! The `/api/results` endpoint serves two generations of the result record:
//! a legacy 4-element tuple and a keyed object that adds optional VPN
//! throughput fields. Both are captured by [`ResultEntry`] and resolved to
//! a single canonical shape in `scandeck-core` at ingestion, so nothing
//! downstream ever branches on wire shape.

use serde::{Deserialize, Serialize};

// ── Scan status ─────────────────────────────────────────────────────

/// Progress counters for an in-flight scan or speedtest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScanProgress {
    pub done: u64,
    pub total: u64,
}

impl ScanProgress {
    /// Completion percentage, rounded. Zero when `total` is zero.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = ((self.done as f64 / self.total as f64) * 100.0).round() as u8;
        pct
    }
}

/// Transient scan state, re-fetched on every status poll.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ScanStatus {
    pub active: bool,
    #[serde(default)]
    pub stopping: bool,
    #[serde(default)]
    pub progress: ScanProgress,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ── Scan parameters ─────────────────────────────────────────────────

/// Parameters posted to `/api/scan/start`.
///
/// `timeout` is the per-probe timeout in milliseconds (the wire name is
/// bare `timeout`, kept as-is for compatibility).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanParams {
    pub pings: u32,
    pub timeout: u64,
    pub workers: u32,
    pub vpn_speedtest: bool,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            pings: 1,
            timeout: 1000,
            workers: 20,
            vpn_speedtest: false,
        }
    }
}

// ── Results ─────────────────────────────────────────────────────────

/// One result record as served by `/api/results`, either wire shape.
///
/// Detection follows the service contract: a JSON object is the keyed
/// shape, a JSON array is the legacy ordered tuple.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ResultEntry {
    Keyed(KeyedResult),
    Tuple(TupleResult),
}

/// Keyed result shape, present in newer service versions. Speed fields
/// appear only after a VPN speedtest has run for the endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyedResult {
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub rx_speed_mbps: Option<f64>,
    #[serde(default)]
    pub tx_speed_mbps: Option<f64>,
}

/// Legacy ordered tuple: `[latency, ip, country, city]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TupleResult(
    pub Option<f64>,
    pub Option<String>,
    pub Option<String>,
    pub Option<String>,
);

// ── Logs ────────────────────────────────────────────────────────────

/// One entry of the server-side log feed, oldest-to-newest as delivered.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn progress_percent_rounds() {
        let p = ScanProgress { done: 40, total: 200 };
        assert_eq!(p.percent(), 20);
        let p = ScanProgress { done: 1, total: 3 };
        assert_eq!(p.percent(), 33);
        let p = ScanProgress { done: 2, total: 3 };
        assert_eq!(p.percent(), 67);
    }

    #[test]
    fn progress_percent_zero_total() {
        let p = ScanProgress { done: 0, total: 0 };
        assert_eq!(p.percent(), 0);
    }

    #[test]
    fn status_defaults_for_missing_fields() {
        let status: ScanStatus =
            serde_json::from_str(r#"{"active": true, "progress": {"done": 3, "total": 9}}"#)
                .expect("valid status");
        assert!(status.active);
        assert!(!status.stopping);
        assert_eq!(status.error, None);
    }

    #[test]
    fn result_entry_detects_tuple_shape() {
        let entry: ResultEntry =
            serde_json::from_str(r#"[12.5, "1.1.1.1", "US", "NY"]"#).expect("valid tuple");
        let ResultEntry::Tuple(t) = entry else {
            panic!("expected tuple shape");
        };
        assert_eq!(t.0, Some(12.5));
        assert_eq!(t.1.as_deref(), Some("1.1.1.1"));
    }

    #[test]
    fn result_entry_detects_keyed_shape() {
        let entry: ResultEntry = serde_json::from_str(
            r#"{"latency_ms": 200.0, "ip": "2.2.2.2", "country": "DE", "city": "Berlin",
                "rx_speed_mbps": 93.1, "tx_speed_mbps": 41.0}"#,
        )
        .expect("valid keyed record");
        let ResultEntry::Keyed(k) = entry else {
            panic!("expected keyed shape");
        };
        assert_eq!(k.latency_ms, Some(200.0));
        assert_eq!(k.rx_speed_mbps, Some(93.1));
    }

    #[test]
    fn keyed_shape_speed_fields_optional() {
        let entry: ResultEntry =
            serde_json::from_str(r#"{"latency_ms": 5.0, "ip": "1.2.3.4"}"#).expect("valid");
        let ResultEntry::Keyed(k) = entry else {
            panic!("expected keyed shape");
        };
        assert_eq!(k.rx_speed_mbps, None);
        assert_eq!(k.country, None);
    }
}
