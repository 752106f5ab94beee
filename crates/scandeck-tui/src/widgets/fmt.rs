//! Cell formatting helpers for the results table.

/// Latency in milliseconds, two decimals, matching the service's own
/// display precision.
pub fn fmt_latency(latency_ms: f64) -> String {
    format!("{latency_ms:.2}")
}

/// Optional throughput in Mbit/s; a dash until a speedtest has run.
pub fn fmt_speed(mbps: Option<f64>) -> String {
    match mbps {
        Some(v) => format!("{v:.1}"),
        None => "─".to_owned(),
    }
}

/// Strip control characters from server-provided text before painting
/// it into the terminal (the terminal analogue of HTML escaping).
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn latency_two_decimals() {
        assert_eq!(fmt_latency(10.0), "10.00");
        assert_eq!(fmt_latency(3.456), "3.46");
    }

    #[test]
    fn speed_dash_when_absent() {
        assert_eq!(fmt_speed(None), "─");
        assert_eq!(fmt_speed(Some(93.14)), "93.1");
    }

    #[test]
    fn sanitize_strips_control_characters() {
        assert_eq!(sanitize("ok\x1b[31m"), "ok [31m");
        assert_eq!(sanitize("a\nb\tc"), "a b c");
        assert_eq!(sanitize("plain"), "plain");
    }
}
