//! Blocking client SDK for the SMSGuard SMS-fraud-detection API.
//!
//! # Overview
//! `Client` turns typed calls (`check`, `report`, `override_decision`,
//! `get_geo_rules`, `update_geo_rules`) into JSON requests against the
//! SMSGuard REST API and decodes the `{success, data | error}` envelope into
//! typed results or an `ApiError`.
//!
//! # Design
//! - One synchronous HTTP call per operation, bounded by the configured
//!   timeout. No retries.
//! - The HTTP stack sits behind the `Transport` trait; `UreqTransport` is the
//!   default and tests substitute a recording fake.
//! - Failures before the network (bad config, invalid override action) are
//!   `Error::Config` / `Error::Validation`; failures of the call itself are
//!   `Error::Api`.
//!
//! ```no_run
//! use smsguard_core::{CheckRequest, Client, Decision};
//!
//! let client = Client::new("sk_test_...")?;
//! let check = client.check(&CheckRequest::new("+15551234567", "203.0.113.42"))?;
//! if check.decision == Decision::Allow {
//!     client.report(&check.id, true, false)?;
//! }
//! # Ok::<(), smsguard_core::Error>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use client::Client;
pub use config::{ClientConfig, KeyMode, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{ApiError, Error, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError, UreqTransport};
pub use types::{
    CheckRequest, CheckResponse, Decision, GeoAction, GeoRule, OverrideAction, PhoneInfo,
    PhoneType, RiskLevel, SignalBreakdown,
};
