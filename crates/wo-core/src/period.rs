//! # Accounting Period ("competência")
//!
//! The `MM/YYYY` token identifying the financial period a settled work
//! order is booked to. Derived from the UTC calendar month of the delivery
//! timestamp. Serialized as the token string.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WoError;
use crate::temporal::Timestamp;

/// A month/year booking period, rendered as `MM/YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountingPeriod {
    // Field order gives chronological `Ord`.
    year: i32,
    month: u32,
}

impl AccountingPeriod {
    /// Build a period from its parts.
    ///
    /// # Errors
    ///
    /// Rejects months outside 1-12 and years outside 0-9999 (the token is
    /// always four year digits).
    pub fn new(month: u32, year: i32) -> Result<Self, WoError> {
        if !(1..=12).contains(&month) {
            return Err(WoError::InvalidPeriod(format!("month {month} out of range")));
        }
        if !(0..=9999).contains(&year) {
            return Err(WoError::InvalidPeriod(format!("year {year} out of range")));
        }
        Ok(Self { year, month })
    }

    /// The period containing `ts` (UTC calendar).
    ///
    /// Years beyond 9999 cannot be represented by the token; they are
    /// clamped rather than failing a settlement.
    pub fn containing(ts: &Timestamp) -> Self {
        Self {
            year: ts.year().clamp(0, 9999),
            month: ts.month(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

impl std::fmt::Display for AccountingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

impl FromStr for AccountingPeriod {
    type Err = WoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mm, yyyy) = s
            .split_once('/')
            .ok_or_else(|| WoError::InvalidPeriod(format!("{s:?}: expected MM/YYYY")))?;
        if mm.len() != 2 || yyyy.len() != 4 {
            return Err(WoError::InvalidPeriod(format!("{s:?}: expected MM/YYYY")));
        }
        let month = mm
            .parse::<u32>()
            .map_err(|e| WoError::InvalidPeriod(format!("{s:?}: month: {e}")))?;
        let year = yyyy
            .parse::<i32>()
            .map_err(|e| WoError::InvalidPeriod(format!("{s:?}: year: {e}")))?;
        Self::new(month, year)
    }
}

impl TryFrom<String> for AccountingPeriod {
    type Error = WoError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccountingPeriod> for String {
    fn from(value: AccountingPeriod) -> Self {
        value.to_string()
    }
}
