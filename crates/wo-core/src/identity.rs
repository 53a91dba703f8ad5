//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers a work order carries. You cannot
//! pass a `CostCenterId` where a `WorkOrderId` is expected, and an issued
//! `WorkOrderNumber` is never confused with free text.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WoError;

/// Store-assigned unique identifier of a work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkOrderId(pub Uuid);

/// Cost center ("CCA") a work order is charged to. Scopes number issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CostCenterId(pub i64);

/// Work-order number issued by the numbering authority, unique within its
/// cost center.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkOrderNumber(String);

/// Reference to a person (requester, responsible engineer).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl WorkOrderId {
    /// Generate a new random work-order identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for WorkOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for WorkOrderId {
    type Err = WoError;

    /// Accepts both the bare UUID and the `wo:`-prefixed display form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let raw = raw.strip_prefix("wo:").unwrap_or(raw);
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|e| WoError::InvalidIdentifier(format!("work order id {s:?}: {e}")))
    }
}

impl CostCenterId {
    /// The raw integer reference.
    pub fn value(&self) -> i64 {
        self.0
    }
}

impl WorkOrderNumber {
    /// Wrap an issued number. Blank numbers are rejected.
    pub fn new(number: impl Into<String>) -> Result<Self, WoError> {
        let number = number.into();
        if number.trim().is_empty() {
            return Err(WoError::InvalidIdentifier(
                "work order number must not be blank".to_string(),
            ));
        }
        Ok(Self(number))
    }

    /// The number as issued.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkOrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "wo:{}", self.0)
    }
}

impl std::fmt::Display for CostCenterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cca:{}", self.0)
    }
}

impl std::fmt::Display for WorkOrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
