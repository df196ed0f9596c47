//! Wire types for the SMSGuard API.
//!
//! # Design
//! Field names match the JSON the service speaks, so serde derives do the
//! field-by-field mapping. String enums are closed sets with an untagged
//! `Other` fallback: a value the service adds later still parses, and
//! serializes back unchanged.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Fraud decision for a checked SMS request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Block,
    Review,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhoneType {
    Mobile,
    Voip,
    Landline,
    TollFree,
    Unknown,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[serde(untagged)]
    Other(String),
}

/// Action a geographic rule applies to a country.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoAction {
    Allow,
    Block,
    #[serde(untagged)]
    Other(String),
}

/// Manual decision applied to a previous check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideAction {
    Allow,
    Deny,
}

impl OverrideAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideAction::Allow => "allow",
            OverrideAction::Deny => "deny",
        }
    }
}

impl FromStr for OverrideAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow" => Ok(OverrideAction::Allow),
            "deny" => Ok(OverrideAction::Deny),
            other => Err(Error::Validation(format!(
                "action must be 'allow' or 'deny', got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for OverrideAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload for `POST /sms/check`. Unset optional fields are sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    /// E.164 number, e.g. `+15551234567`. Not validated locally.
    pub phone_number: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub session_id: Option<String>,
    pub metadata: Option<BTreeMap<String, String>>,
}

impl CheckRequest {
    pub fn new(phone_number: impl Into<String>, ip_address: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            ip_address: ip_address.into(),
            user_agent: None,
            session_id: None,
            metadata: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Per-signal risk components behind a fraud score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalBreakdown {
    pub geo_risk: u32,
    pub velocity_risk: u32,
    pub carrier_risk: u32,
    pub behavior_risk: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneInfo {
    pub country: String,
    /// `null` on the wire when the carrier is unknown; the key itself must be
    /// present.
    #[serde(deserialize_with = "required_nullable")]
    pub carrier: Option<String>,
    #[serde(rename = "type")]
    pub phone_type: PhoneType,
    pub risk_level: RiskLevel,
}

/// Result of a fraud check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub id: String,
    pub decision: Decision,
    pub fraud_score: u32,
    pub signals: SignalBreakdown,
    pub phone_info: PhoneInfo,
    /// Server timestamp, kept verbatim.
    pub created_at: String,
}

/// A country paired with the action applied to SMS requests from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRule {
    pub country_code: String,
    pub action: GeoAction,
}

impl GeoRule {
    pub fn new(country_code: impl Into<String>, action: GeoAction) -> Self {
        Self {
            country_code: country_code.into(),
            action,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportRequest<'a> {
    pub check_id: &'a str,
    pub sms_sent: bool,
    pub code_verified: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct OverrideRequest<'a> {
    pub check_id: &'a str,
    pub action: OverrideAction,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeoRulesUpdate<'a> {
    pub rules: &'a [GeoRule],
}

/// Like the default `Option` handling, but a missing key is an error.
fn required_nullable<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}
