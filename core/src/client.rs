//! Blocking client for the SMSGuard fraud-detection API.
//!
//! # Design
//! Every public operation goes through one private primitive: build an
//! `HttpRequest` carrying the fixed headers, execute it on the transport, and
//! unwrap the `{success, data}` / `{success, error}` envelope. Typed results
//! are decoded from `data` with serde; a missing field is reported as
//! `ApiError::MalformedResponse` instead of being defaulted.
//!
//! `Client` exclusively owns its transport. Dropping the client (or calling
//! `close`) releases the underlying connections; values already returned are
//! plain owned data and stay valid.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ApiError, Error, Result, DEFAULT_ERROR_CODE, DEFAULT_ERROR_MESSAGE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::types::{
    CheckRequest, CheckResponse, GeoRule, GeoRulesUpdate, OverrideAction, OverrideRequest,
    ReportRequest,
};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Client for the SMSGuard API.
///
/// Operations block until the response arrives or the configured timeout
/// fires. No retries are attempted. All methods take `&self`; with the
/// default `UreqTransport` a client may be shared across threads.
pub struct Client<T = UreqTransport> {
    config: ClientConfig,
    headers: Vec<(String, String)>,
    transport: T,
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client<UreqTransport> {
    /// Client with the default base URL and timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self::from_config(ClientConfig::new(api_key)?))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout());
        Self::with_transport(config, transport)
    }

    /// Client configured from `SMSGUARD_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_config(ClientConfig::from_env()?))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            (API_KEY_HEADER.to_string(), config.api_key().to_string()),
        ];
        tracing::debug!(
            base_url = %config.base_url(),
            mode = ?config.key_mode(),
            "smsguard client created"
        );
        Self {
            config,
            headers,
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Check an SMS request for fraud before sending it.
    pub fn check(&self, request: &CheckRequest) -> Result<CheckResponse> {
        let data = self.request(HttpMethod::Post, "/sms/check", Some(request))?;
        let check: CheckResponse = decode(data.value, data.status)?;
        tracing::debug!(
            check_id = %check.id,
            decision = ?check.decision,
            fraud_score = check.fraud_score,
            "check completed"
        );
        Ok(check)
    }

    /// Report whether the SMS for `check_id` was sent and whether the code
    /// was verified.
    pub fn report(&self, check_id: &str, sent: bool, verified: bool) -> Result<()> {
        let body = ReportRequest {
            check_id,
            sms_sent: sent,
            code_verified: verified,
        };
        self.request(HttpMethod::Post, "/sms/report", Some(&body))?;
        Ok(())
    }

    /// Override the decision of a previous check. `action` must be
    /// `"allow"` or `"deny"`; anything else fails with `Error::Validation`
    /// without touching the network.
    pub fn override_decision(&self, check_id: &str, action: &str) -> Result<()> {
        let action: OverrideAction = action.parse()?;
        let body = OverrideRequest { check_id, action };
        self.request(HttpMethod::Post, "/sms/override", Some(&body))?;
        Ok(())
    }

    /// Current geographic rules, in server order.
    pub fn get_geo_rules(&self) -> Result<Vec<GeoRule>> {
        let data = self.request::<()>(HttpMethod::Get, "/config/geo-rules", None)?;
        decode(data.value, data.status)
    }

    /// Replace the whole rule set with `rules`, order preserved.
    pub fn update_geo_rules(&self, rules: &[GeoRule]) -> Result<()> {
        let body = GeoRulesUpdate { rules };
        self.request(HttpMethod::Put, "/config/geo-rules", Some(&body))?;
        Ok(())
    }

    /// Release the transport and its connections.
    pub fn close(self) {
        tracing::debug!(base_url = %self.config.base_url(), "smsguard client closed");
    }

    fn build_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        payload: Option<&B>,
    ) -> Result<HttpRequest> {
        let body = payload.map(serde_json::to_string).transpose()?;
        Ok(HttpRequest {
            method,
            url: format!("{}{}", self.config.base_url(), endpoint),
            headers: self.headers.clone(),
            body,
        })
    }

    fn request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        payload: Option<&B>,
    ) -> Result<Payload> {
        let request = self.build_request(method, endpoint, payload)?;
        tracing::debug!(method = method.as_str(), url = %request.url, "sending request");

        let response = self.transport.execute(&request).map_err(|e| {
            let err = ApiError::from(e);
            tracing::warn!(method = method.as_str(), endpoint, error = %err, "transport failure");
            err
        })?;
        tracing::debug!(status = response.status, endpoint, "response received");

        parse_envelope(&response).map_err(|err| {
            tracing::warn!(
                endpoint,
                status = err.status(),
                code = err.code(),
                "request failed"
            );
            Error::Api(err)
        })
    }
}

/// Success payload together with the HTTP status it arrived with.
#[derive(Debug)]
struct Payload {
    value: Value,
    status: u16,
}

/// Unwrap the response envelope. A falsy `success` becomes
/// `ApiError::Service` with the embedded error fields, defaulted when absent.
fn parse_envelope(response: &HttpResponse) -> std::result::Result<Payload, ApiError> {
    let status = response.status;
    let envelope: Value = serde_json::from_str(&response.body).map_err(|e| {
        ApiError::MalformedResponse {
            message: format!("response body is not JSON: {e}"),
            status,
        }
    })?;
    let Value::Object(mut envelope) = envelope else {
        return Err(ApiError::MalformedResponse {
            message: "response body is not a JSON object".to_string(),
            status,
        });
    };

    if !envelope.get("success").is_some_and(is_truthy) {
        let error = envelope.get("error");
        let field = |name: &str| {
            error
                .and_then(|e| e.get(name))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        return Err(ApiError::Service {
            message: field("message").unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
            code: field("code").unwrap_or_else(|| DEFAULT_ERROR_CODE.to_string()),
            status,
        });
    }

    Ok(Payload {
        value: envelope.remove("data").unwrap_or(Value::Null),
        status,
    })
}

fn decode<R: DeserializeOwned>(value: Value, status: u16) -> Result<R> {
    serde_json::from_value(value).map_err(|e| {
        Error::Api(ApiError::MalformedResponse {
            message: format!("unexpected response data: {e}"),
            status,
        })
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
