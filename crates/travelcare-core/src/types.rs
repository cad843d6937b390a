//! Shared value types used across the TravelCare crates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// Newtype Wrappers
// =============================================================================

/// Unix timestamp in seconds. Display only; never used for ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }
}

/// Identifier of a chat message, assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A price in euro cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Euros(pub u32);

impl Euros {
    pub fn whole(amount: u32) -> Self {
        Self(amount * 100)
    }
}

impl fmt::Display for Euros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "€{}", self.0 / 100)
        } else {
            write!(f, "€{}.{:02}", self.0 / 100, self.0 % 100)
        }
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Assistant => write!(f, "assistant"),
        }
    }
}

// =============================================================================
// Domain Structs
// =============================================================================

/// Policy holder profile as served by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub policy_number: String,
    pub dependents: u32,
    pub policy_start_date: NaiveDate,
    pub policy_end_date: NaiveDate,
}

impl Profile {
    /// Whether the policy covers the given day (inclusive on both ends).
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.policy_start_date <= day && day <= self.policy_end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_euros_display() {
        assert_eq!(Euros::whole(45).to_string(), "€45");
        assert_eq!(Euros(2550).to_string(), "€25.50");
        assert_eq!(Euros(5).to_string(), "€0.05");
    }

    #[test]
    fn test_message_id_ordering() {
        assert!(MessageId(1) < MessageId(2));
        assert_eq!(MessageId(7).to_string(), "#7");
    }

    #[test]
    fn test_sender_serde() {
        let json = serde_json::to_string(&Sender::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let back: Sender = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(back, Sender::User);
    }

    #[test]
    fn test_timestamp_round_trip() {
        let ts = Timestamp(1_700_000_000);
        assert_eq!(Timestamp::from_datetime(ts.to_datetime()), ts);
    }

    #[test]
    fn test_profile_active_window() {
        let profile = Profile {
            id: Uuid::new_v4(),
            name: "John Traveler".to_string(),
            email: "john@example.com".to_string(),
            policy_number: "TI-2024-001234".to_string(),
            dependents: 2,
            policy_start_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            policy_end_date: NaiveDate::from_ymd_opt(2024, 12, 15).unwrap(),
        };
        assert!(profile.is_active_on(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()));
        assert!(profile.is_active_on(NaiveDate::from_ymd_opt(2024, 12, 15).unwrap()));
        assert!(!profile.is_active_on(NaiveDate::from_ymd_opt(2024, 12, 16).unwrap()));
    }
}
