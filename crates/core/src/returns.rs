use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DomainError, Order, OrderId, ReturnId, UserId};

/// Return request status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReturnStatus {
    Requested,
    Approved,
    Rejected,
    Completed,
}

impl ReturnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Requested => "REQUESTED",
            ReturnStatus::Approved => "APPROVED",
            ReturnStatus::Rejected => "REJECTED",
            ReturnStatus::Completed => "COMPLETED",
        }
    }

    /// Requests still waiting on a decision; counted as "pending returns".
    pub fn is_pending(&self) -> bool {
        matches!(self, ReturnStatus::Requested)
    }
}

impl core::fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for ReturnStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "REQUESTED" => Ok(ReturnStatus::Requested),
            "APPROVED" => Ok(ReturnStatus::Approved),
            "REJECTED" => Ok(ReturnStatus::Rejected),
            "COMPLETED" => Ok(ReturnStatus::Completed),
            _ => Err(DomainError::unknown_variant("return status", s)),
        }
    }
}

/// Return request as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnRequest {
    pub id: ReturnId,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub reason: String,
    pub status: ReturnStatus,
    pub refund_amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
}

/// Payload for `POST /returns`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnDraft {
    pub order_id: OrderId,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_amount: Option<f64>,
}

impl ReturnDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.reason.trim().is_empty() {
            return Err(DomainError::validation("reason: must not be empty"));
        }
        match self.refund_amount {
            Some(amount) if !amount.is_finite() || amount < 0.0 => Err(DomainError::validation(
                "refundAmount: must be a non-negative number",
            )),
            _ => Ok(()),
        }
    }
}
