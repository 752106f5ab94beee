//! `scandeck-api` — async Rust client for the endpoint scanner service.
//!
//! The scanner service exposes a small HTTP JSON API: scan lifecycle
//! (`/api/scan/*`), accumulated results (`/api/results`), VPN speedtest
//! dispatch (`/api/vpn-speedtest`), and a bounded log feed (`/api/logs`).
//! This crate owns the wire types and the error taxonomy; domain
//! normalization lives in `scandeck-core`.

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::ScannerClient;
pub use error::Error;
pub use transport::TransportConfig;
pub use types::{
    KeyedResult, LogEntry, ResultEntry, ScanParams, ScanProgress, ScanStatus, TupleResult,
};
