//! Canonical domain types, normalized from either wire shape.
//!
//! The tuple-vs-object compatibility shim lives entirely in
//! [`EndpointResult::from_wire`]; internal code never branches on wire
//! shape again.

use scandeck_api::{KeyedResult, ResultEntry, TupleResult};
use strum::Display;

/// Placeholder for a missing IP address.
const UNKNOWN_IP: &str = "N/A";
/// Placeholder for missing geolocation fields.
const UNKNOWN_GEO: &str = "Unknown";

/// One measured endpoint. Identity is the domain name; display order is
/// always a derived sort, never insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointResult {
    pub domain: String,
    pub latency_ms: f64,
    pub ip: String,
    pub country: String,
    pub city: String,
    /// Download throughput in Mbit/s, present only after a VPN speedtest.
    pub rx_speed_mbps: Option<f64>,
    /// Upload throughput in Mbit/s, present only after a VPN speedtest.
    pub tx_speed_mbps: Option<f64>,
}

impl EndpointResult {
    /// Normalize a wire entry into the canonical record.
    ///
    /// Missing latency becomes 0, missing IP becomes `"N/A"`, missing
    /// geolocation becomes `"Unknown"`.
    pub fn from_wire(domain: String, entry: ResultEntry) -> Self {
        match entry {
            ResultEntry::Keyed(KeyedResult {
                latency_ms,
                ip,
                country,
                city,
                rx_speed_mbps,
                tx_speed_mbps,
            }) => Self {
                domain,
                latency_ms: latency_ms.unwrap_or(0.0),
                ip: ip.unwrap_or_else(|| UNKNOWN_IP.to_owned()),
                country: country.unwrap_or_else(|| UNKNOWN_GEO.to_owned()),
                city: city.unwrap_or_else(|| UNKNOWN_GEO.to_owned()),
                rx_speed_mbps,
                tx_speed_mbps,
            },
            ResultEntry::Tuple(TupleResult(latency, ip, country, city)) => Self {
                domain,
                latency_ms: latency.unwrap_or(0.0),
                ip: ip.unwrap_or_else(|| UNKNOWN_IP.to_owned()),
                country: country.unwrap_or_else(|| UNKNOWN_GEO.to_owned()),
                city: city.unwrap_or_else(|| UNKNOWN_GEO.to_owned()),
                rx_speed_mbps: None,
                tx_speed_mbps: None,
            },
        }
    }

    /// Severity class for this endpoint's latency.
    pub fn latency_class(&self) -> LatencyClass {
        LatencyClass::for_latency(self.latency_ms)
    }
}

/// Latency severity buckets used for result styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyClass {
    /// Below 50 ms.
    Good,
    /// 50 ms to below 150 ms.
    Medium,
    /// 150 ms and above.
    Bad,
}

impl LatencyClass {
    pub fn for_latency(latency_ms: f64) -> Self {
        if latency_ms < 50.0 {
            Self::Good
        } else if latency_ms < 150.0 {
            Self::Medium
        } else {
            Self::Bad
        }
    }
}

/// Sortable result table columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub enum SortField {
    Domain,
    #[default]
    Latency,
    #[strum(serialize = "IP")]
    Ip,
    Country,
    City,
}

impl SortField {
    /// Columns in display order.
    pub const ALL: [SortField; 5] = [
        Self::Domain,
        Self::Latency,
        Self::Ip,
        Self::Country,
        Self::City,
    ];
}

/// Sort direction, toggled per column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(json: &str) -> ResultEntry {
        serde_json::from_str(json).expect("valid wire entry")
    }

    #[test]
    fn tuple_shape_normalizes() {
        let entry = parse(r#"[10.0, "1.1.1.1", "US", "NY"]"#);
        let result = EndpointResult::from_wire("a.com".into(), entry);
        assert_eq!(result.domain, "a.com");
        assert_eq!(result.latency_ms, 10.0);
        assert_eq!(result.ip, "1.1.1.1");
        assert_eq!(result.country, "US");
        assert_eq!(result.city, "NY");
        assert_eq!(result.rx_speed_mbps, None);
        assert_eq!(result.latency_class(), LatencyClass::Good);
    }

    #[test]
    fn keyed_shape_normalizes() {
        let entry = parse(
            r#"{"latency_ms": 200.0, "ip": "2.2.2.2", "country": "DE", "city": "Berlin"}"#,
        );
        let result = EndpointResult::from_wire("b.com".into(), entry);
        assert_eq!(result.latency_ms, 200.0);
        assert_eq!(result.city, "Berlin");
        assert_eq!(result.latency_class(), LatencyClass::Bad);
    }

    #[test]
    fn missing_fields_get_defaults() {
        let entry = parse(r#"{"ip": null}"#);
        let result = EndpointResult::from_wire("c.com".into(), entry);
        assert_eq!(result.latency_ms, 0.0);
        assert_eq!(result.ip, "N/A");
        assert_eq!(result.country, "Unknown");
        assert_eq!(result.city, "Unknown");

        let entry = parse(r#"[null, null, null, null]"#);
        let result = EndpointResult::from_wire("d.com".into(), entry);
        assert_eq!(result.latency_ms, 0.0);
        assert_eq!(result.ip, "N/A");
    }

    #[test]
    fn latency_class_boundaries() {
        assert_eq!(LatencyClass::for_latency(0.0), LatencyClass::Good);
        assert_eq!(LatencyClass::for_latency(49.9), LatencyClass::Good);
        assert_eq!(LatencyClass::for_latency(50.0), LatencyClass::Medium);
        assert_eq!(LatencyClass::for_latency(149.9), LatencyClass::Medium);
        assert_eq!(LatencyClass::for_latency(150.0), LatencyClass::Bad);
    }

    #[test]
    fn sort_order_toggles() {
        assert_eq!(SortOrder::Asc.toggled(), SortOrder::Desc);
        assert_eq!(SortOrder::Desc.toggled(), SortOrder::Asc);
    }

    #[test]
    fn sort_field_display_names() {
        let labels: Vec<String> = SortField::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(labels, vec!["Domain", "Latency", "IP", "Country", "City"]);
    }
}
