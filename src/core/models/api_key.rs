//! API key domain types

use crate::utils::error::GatewayError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subscription tier bound to a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Partner,
    /// Reserved for the master credential
    Admin,
}

impl Plan {
    pub const ALL: [Plan; 4] = [Plan::Free, Plan::Pro, Plan::Partner, Plan::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
            Plan::Partner => "partner",
            Plan::Admin => "admin",
        }
    }

    /// Whether keys on this plan may be issued and persisted
    pub fn is_issuable(&self) -> bool {
        !matches!(self, Plan::Admin)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "pro" => Ok(Plan::Pro),
            "partner" => Ok(Plan::Partner),
            "admin" => Ok(Plan::Admin),
            other => Err(GatewayError::Validation(format!("Unknown plan: {}", other))),
        }
    }
}

/// Lifecycle state of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    Active,
    Disabled,
    Expired,
}

impl KeyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStatus::Active => "active",
            KeyStatus::Disabled => "disabled",
            KeyStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyStatus {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(KeyStatus::Active),
            "disabled" => Ok(KeyStatus::Disabled),
            "expired" => Ok(KeyStatus::Expired),
            other => Err(GatewayError::Validation(format!("Unknown key status: {}", other))),
        }
    }
}

/// Where a verified credential was resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeySource {
    Master,
    Legacy,
    Store,
}

/// Persisted API key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub id: i64,
    /// Salted digest of the raw key, never exposed over the wire
    #[serde(skip_serializing, default)]
    pub key_hash: String,
    pub key_prefix: String,
    pub name: String,
    pub plan: Plan,
    pub status: KeyStatus,
    pub user_id: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub request_count: i64,
    pub rate_limit_hits: i64,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl KeyRecord {
    /// A key whose expiry lies strictly before `now` is expired
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at < now)
    }
}

/// Insert payload for a new key
#[derive(Debug, Clone, PartialEq)]
pub struct NewKeyRecord {
    pub key_hash: String,
    pub key_prefix: String,
    pub name: String,
    pub plan: Plan,
    pub user_id: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Identity attached to a request once its credential has been verified
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    /// Record id, absent for master and legacy credentials
    pub id: Option<i64>,
    pub name: String,
    pub plan: Plan,
    pub status: KeyStatus,
    pub user_id: String,
    pub source: KeySource,
}

impl KeyInfo {
    pub fn master() -> Self {
        Self {
            id: None,
            name: "Master Key".to_string(),
            plan: Plan::Admin,
            status: KeyStatus::Active,
            user_id: "admin".to_string(),
            source: KeySource::Master,
        }
    }

    pub fn legacy(name: impl Into<String>, plan: Plan) -> Self {
        Self {
            id: None,
            name: name.into(),
            plan,
            status: KeyStatus::Active,
            user_id: "legacy".to_string(),
            source: KeySource::Legacy,
        }
    }

    /// Limiter identity: stable per verified principal, never the raw credential
    pub fn identity(&self) -> String {
        match (self.source, self.id) {
            (KeySource::Master, _) => "master".to_string(),
            (KeySource::Legacy, _) => format!("legacy:{}", self.name),
            (KeySource::Store, Some(id)) => format!("key:{}", id),
            (KeySource::Store, None) => format!("user:{}", self.user_id),
        }
    }
}

impl From<&KeyRecord> for KeyInfo {
    fn from(record: &KeyRecord) -> Self {
        Self {
            id: Some(record.id),
            name: record.name.clone(),
            plan: record.plan,
            status: record.status,
            user_id: record.user_id.clone(),
            source: KeySource::Store,
        }
    }
}
