//! In-memory fake of the SMSGuard `/v1` API.
//!
//! Scoring is a stand-in: the country comes from the dialing prefix and a
//! country blocked by a geo rule is blocked, everything else is allowed.
//! Only keys starting with `sk_test_` are accepted.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRule {
    pub country_code: String,
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct CheckInput {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub session_id: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct ReportInput {
    pub check_id: String,
    #[serde(default)]
    pub sms_sent: bool,
    #[serde(default)]
    pub code_verified: bool,
}

#[derive(Debug, Deserialize)]
pub struct OverrideInput {
    pub check_id: String,
    pub action: String,
}

#[derive(Debug, Deserialize)]
pub struct GeoRulesInput {
    pub rules: Vec<GeoRule>,
}

/// A stored check with the outcome reported for it.
#[derive(Clone, Debug, Default)]
pub struct StoredCheck {
    pub phone_number: String,
    pub ip_address: String,
    pub session_id: Option<String>,
    pub metadata: Option<HashMap<String, String>>,
    pub decision: String,
    pub sms_sent: bool,
    pub code_verified: bool,
    pub human_override: Option<String>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub checks: HashMap<String, StoredCheck>,
    pub geo_rules: Vec<GeoRule>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with_store(Db::default())
}

/// Router over a caller-provided store, so tests can inspect server state.
pub fn app_with_store(db: Db) -> Router {
    let v1 = Router::new()
        .route("/sms/check", post(check))
        .route("/sms/report", post(report))
        .route("/sms/override", post(override_decision))
        .route("/config/geo-rules", get(get_geo_rules).put(put_geo_rules))
        .route_layer(middleware::from_fn(require_api_key));

    Router::new()
        .route("/health", get(health))
        .nest("/v1", v1)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_store(listener, Db::default()).await
}

pub async fn run_with_store(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_store(db)).await
}

fn failure(status: StatusCode, code: &str, message: &str) -> Response {
    let body = json!({"success": false, "error": {"code": code, "message": message}});
    (status, Json(body)).into_response()
}

fn success(data: Value) -> Response {
    Json(json!({"success": true, "data": data})).into_response()
}

/// Geo-rule endpoints answer a missing key the same way as a wrong one.
async fn require_api_key(request: Request, next: Next) -> Response {
    let missing_message = if request.uri().path().ends_with("/config/geo-rules") {
        "Invalid API key"
    } else {
        "Missing API key"
    };
    let key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    match key {
        None => failure(StatusCode::UNAUTHORIZED, "authentication_error", missing_message),
        Some(k) if !k.starts_with("sk_test_") => {
            tracing::warn!("rejected API key");
            failure(StatusCode::UNAUTHORIZED, "authentication_error", "Invalid API key")
        }
        Some(_) => next.run(request).await,
    }
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// ISO country for the longest dialing prefix of `phone` in the table.
pub fn country_for(phone: &str) -> &'static str {
    const PREFIXES: &[(&str, &str)] = &[
        ("+1", "US"),
        ("+7", "RU"),
        ("+44", "GB"),
        ("+49", "DE"),
        ("+91", "IN"),
        ("+234", "NG"),
        ("+1242", "BS"),
    ];
    PREFIXES
        .iter()
        .filter(|(prefix, _)| phone.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, country)| *country)
        .unwrap_or("XX")
}

async fn check(State(db): State<Db>, Json(input): Json<CheckInput>) -> Response {
    if input.phone_number.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "invalid_request", "phone_number is required");
    }

    let country = country_for(&input.phone_number);
    let mut store = db.write().await;
    let blocked = store
        .geo_rules
        .iter()
        .any(|r| r.country_code == country && r.action == "block");
    let (decision, score, geo_risk, risk_level) = if blocked {
        ("block", 95, 80, "high")
    } else {
        ("allow", 10, 0, "low")
    };

    let behavior_risk = if input.user_agent.is_some() { 0 } else { 10 };
    let velocity_risk = if store
        .checks
        .values()
        .any(|c| c.ip_address == input.ip_address)
    {
        25
    } else {
        5
    };

    let id = format!("chk_{}", Uuid::new_v4().simple());
    store.checks.insert(
        id.clone(),
        StoredCheck {
            phone_number: input.phone_number,
            ip_address: input.ip_address,
            session_id: input.session_id,
            metadata: input.metadata,
            decision: decision.to_string(),
            ..StoredCheck::default()
        },
    );
    tracing::info!(check_id = %id, decision, country, "check stored");

    success(json!({
        "id": id,
        "decision": decision,
        "fraud_score": score,
        "signals": {
            "geo_risk": geo_risk,
            "velocity_risk": velocity_risk,
            "carrier_risk": 5,
            "behavior_risk": behavior_risk,
        },
        "phone_info": {
            "country": country,
            "carrier": null,
            "type": "mobile",
            "risk_level": risk_level,
        },
        "created_at": "2024-01-01T00:00:00.000Z",
    }))
}

async fn report(State(db): State<Db>, Json(input): Json<ReportInput>) -> Response {
    let mut store = db.write().await;
    let Some(stored) = store.checks.get_mut(&input.check_id) else {
        return failure(StatusCode::NOT_FOUND, "not_found", "Check not found");
    };
    stored.sms_sent = input.sms_sent;
    stored.code_verified = input.code_verified;
    success(json!({"updated": true}))
}

async fn override_decision(State(db): State<Db>, Json(input): Json<OverrideInput>) -> Response {
    if input.action != "allow" && input.action != "deny" {
        return failure(StatusCode::BAD_REQUEST, "invalid_request", "action must be allow or deny");
    }
    let mut store = db.write().await;
    let Some(stored) = store.checks.get_mut(&input.check_id) else {
        return failure(StatusCode::NOT_FOUND, "not_found", "Check not found");
    };
    stored.human_override = Some(input.action);
    success(json!({"overridden": true}))
}

async fn get_geo_rules(State(db): State<Db>) -> Response {
    let store = db.read().await;
    success(json!(store.geo_rules))
}

async fn put_geo_rules(State(db): State<Db>, Json(input): Json<GeoRulesInput>) -> Response {
    let mut store = db.write().await;
    store.geo_rules = input.rules;
    success(json!({"updated": true}))
}
