use thiserror::Error;

use crate::model::order::OrderSide;
use crate::solvency::RejectionReasonCode;

/// Generic fallback shown when a failure carries no user-presentable message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("broker API error (HTTP {status}): {msg}")]
    BrokerApi { status: u16, msg: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Locally detected problems with the ticket. These never reach the network.
///
/// `Display` yields the exact text shown to the user.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Increase quantity")]
    ZeroQuantity,

    #[error("Insufficient balance for required margin")]
    MarginExceedsCeiling,

    #[error("Insufficient balance for this trade size")]
    TradeSizeExceedsBalance,

    #[error("Please enter a limit price")]
    MissingLimitPrice,

    #[error("No pair selected")]
    NoPairSelected,

    #[error("Deposit funds required. Cannot trade on credit alone.")]
    CreditOnlyFunding,

    #[error("Insufficient balance")]
    NoBuyingPower,

    #[error("Price feed is loading")]
    FeedLoading,

    #[error("Price unavailable")]
    PriceUnavailable,

    #[error("An order is already being submitted")]
    SubmissionInFlight,
}

impl ValidationError {
    pub fn reason_code(self) -> RejectionReasonCode {
        match self {
            Self::ZeroQuantity => RejectionReasonCode::ZeroQuantity,
            Self::MarginExceedsCeiling => RejectionReasonCode::MarginExceedsCeiling,
            Self::TradeSizeExceedsBalance => RejectionReasonCode::TradeSizeExceedsBalance,
            Self::MissingLimitPrice => RejectionReasonCode::MissingLimitPrice,
            Self::NoPairSelected => RejectionReasonCode::NoPairSelected,
            Self::CreditOnlyFunding => RejectionReasonCode::NonPositiveBalance,
            Self::NoBuyingPower => RejectionReasonCode::NonPositiveCeiling,
            Self::FeedLoading => RejectionReasonCode::FeedLoading,
            Self::PriceUnavailable => RejectionReasonCode::PriceUnavailable,
            Self::SubmissionInFlight => RejectionReasonCode::SubmissionInFlight,
        }
    }
}

/// Failure of a submission attempt, covering all three layers: local
/// validation, backend rejection, and transport.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("broker rejected {side} order (HTTP {status})")]
    Backend {
        side: OrderSide,
        status: u16,
        message: Option<String>,
    },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("submission ended without a result")]
    Interrupted,
}

impl SubmitError {
    /// Text for the ticket's error feedback.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Backend {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            Self::Backend { side, .. } => {
                format!("Failed to {} trade", side.as_path_str())
            }
            Self::Transport(_) | Self::Interrupted => UNKNOWN_ERROR_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_message_is_surfaced_verbatim() {
        let err = SubmitError::Backend {
            side: OrderSide::Buy,
            status: 400,
            message: Some("Market closed".to_string()),
        };
        assert_eq!(err.user_message(), "Market closed");
    }

    #[test]
    fn backend_without_message_falls_back_to_action() {
        let err = SubmitError::Backend {
            side: OrderSide::Sell,
            status: 502,
            message: None,
        };
        assert_eq!(err.user_message(), "Failed to sell trade");
    }

    #[test]
    fn transport_failures_use_generic_text() {
        let err = SubmitError::Transport("connection refused".to_string());
        assert_eq!(err.user_message(), UNKNOWN_ERROR_MESSAGE);
        assert_eq!(SubmitError::Interrupted.user_message(), UNKNOWN_ERROR_MESSAGE);
    }
}
