// Scanner service HTTP client
//
// Wraps `reqwest::Client` with URL construction and the service's error
// contract: write endpoints answer non-2xx with a `{message}` body that
// must reach the user verbatim.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;
use crate::types::{LogEntry, ResultEntry, ScanParams, ScanStatus};

/// Body of a non-2xx response from a write endpoint.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Request body for `/api/vpn-speedtest`.
#[derive(Debug, serde::Serialize)]
struct SpeedtestRequest<'a> {
    domains: &'a [String],
}

/// Async client for the scanner service API.
///
/// All methods map the response according to the service contract:
/// 2xx bodies are decoded as JSON, non-2xx bodies are parsed for the
/// structured `{message}` and become [`Error::Server`].
pub struct ScannerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ScannerClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a full URL for an API path relative to the base.
    fn url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    // ── Scan lifecycle ───────────────────────────────────────────────

    /// GET `/api/scan/status` — current scan progress.
    pub async fn scan_status(&self) -> Result<ScanStatus, Error> {
        self.get("api/scan/status").await
    }

    /// POST `/api/scan/start` — begin a scan with the given parameters.
    pub async fn start_scan(&self, params: &ScanParams) -> Result<(), Error> {
        self.post_accepted("api/scan/start", Some(params)).await
    }

    /// POST `/api/scan/stop` — request cancellation of the running scan.
    pub async fn stop_scan(&self) -> Result<(), Error> {
        self.post_accepted::<ScanParams>("api/scan/stop", None).await
    }

    // ── Results ──────────────────────────────────────────────────────

    /// GET `/api/results` — the full accumulated result mapping,
    /// keyed by domain. Entries may be either wire shape.
    pub async fn results(&self) -> Result<BTreeMap<String, ResultEntry>, Error> {
        self.get("api/results").await
    }

    /// POST `/api/vpn-speedtest` — run a VPN throughput test against the
    /// given domains. Progress is reported through the scan status channel.
    pub async fn run_speedtest(&self, domains: &[String]) -> Result<(), Error> {
        self.post_accepted("api/vpn-speedtest", Some(&SpeedtestRequest { domains }))
            .await
    }

    // ── Logs ─────────────────────────────────────────────────────────

    /// GET `/api/logs` — the bounded server-side log feed, oldest first.
    pub async fn logs(&self) -> Result<Vec<LogEntry>, Error> {
        self.get("api/logs").await
    }

    /// POST `/api/logs/clear` — clear the server log buffer.
    pub async fn clear_logs(&self) -> Result<(), Error> {
        self.post_accepted::<ScanParams>("api/logs/clear", None).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and decode the JSON response.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        Self::decode(resp).await
    }

    /// Send a POST request whose success case carries no payload the
    /// caller needs. `body` is serialized as JSON when present.
    async fn post_accepted<B: serde::Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {}", url);

        let mut req = self.http.post(url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await.map_err(Error::Transport)?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        Err(Self::server_error(status, resp).await)
    }

    /// Decode a 2xx JSON body, or map a non-2xx response to the
    /// structured server error.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(Self::server_error(status, resp).await);
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }

    /// Parse the `{message}` body of a failed request, falling back to
    /// the HTTP reason phrase when the body is not the structured shape.
    async fn server_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let fallback = status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_owned();
        let message = match resp.text().await {
            Ok(body) => serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(fallback),
            Err(_) => fallback,
        };
        Error::Server {
            status: status.as_u16(),
            message,
        }
    }
}
