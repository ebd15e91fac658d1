use crate::model::account::AccountSnapshot;

/// Standing notice shown while the cash balance is not positive.
pub const CREDIT_ONLY_ADVISORY: &str = "Deposit funds required. Cannot trade on credit alone.";

/// Stable taxonomy for ticket rejection reasons, used in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReasonCode {
    FeedLoading,
    SubmissionInFlight,
    MarginExceedsCeiling,
    NonPositiveBalance,
    NonPositiveCeiling,
    ZeroQuantity,
    TradeSizeExceedsBalance,
    MissingLimitPrice,
    NoPairSelected,
    PriceUnavailable,
}

impl RejectionReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FeedLoading => "market.feed_loading",
            Self::SubmissionInFlight => "submit.in_flight",
            Self::MarginExceedsCeiling => "solvency.margin_exceeds_ceiling",
            Self::NonPositiveBalance => "solvency.non_positive_balance",
            Self::NonPositiveCeiling => "solvency.non_positive_ceiling",
            Self::ZeroQuantity => "validation.zero_quantity",
            Self::TradeSizeExceedsBalance => "validation.trade_size_exceeds_balance",
            Self::MissingLimitPrice => "validation.missing_limit_price",
            Self::NoPairSelected => "market.no_pair_selected",
            Self::PriceUnavailable => "market.price_unavailable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolvencyInputs {
    pub loading: bool,
    pub submitting: bool,
    pub margin: f64,
    pub account: AccountSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolvencyDecision {
    /// `true` if buy/sell may be pressed.
    pub approved: bool,
    /// First failing clause when not approved.
    pub reason_code: Option<RejectionReasonCode>,
}

impl SolvencyDecision {
    fn approve() -> Self {
        Self {
            approved: true,
            reason_code: None,
        }
    }

    fn reject(code: RejectionReasonCode) -> Self {
        Self {
            approved: false,
            reason_code: Some(code),
        }
    }
}

pub fn is_affordable(margin: f64, account: &AccountSnapshot) -> bool {
    margin <= account.solvency_ceiling()
}

/// Evaluate the submit-enabled predicate.
///
/// A strictly positive cash balance is required on its own: credit can fund
/// margin but cannot open a trade by itself.
pub fn evaluate(inputs: &SolvencyInputs) -> SolvencyDecision {
    if inputs.loading {
        return SolvencyDecision::reject(RejectionReasonCode::FeedLoading);
    }
    if inputs.submitting {
        return SolvencyDecision::reject(RejectionReasonCode::SubmissionInFlight);
    }
    if !is_affordable(inputs.margin, &inputs.account) {
        return SolvencyDecision::reject(RejectionReasonCode::MarginExceedsCeiling);
    }
    if inputs.account.balance <= 0.0 {
        return SolvencyDecision::reject(RejectionReasonCode::NonPositiveBalance);
    }
    if inputs.account.solvency_ceiling() <= 0.0 {
        return SolvencyDecision::reject(RejectionReasonCode::NonPositiveCeiling);
    }
    SolvencyDecision::approve()
}

pub fn submit_enabled(inputs: &SolvencyInputs) -> bool {
    evaluate(inputs).approved
}

pub fn funding_advisory(account: &AccountSnapshot) -> Option<&'static str> {
    (account.balance <= 0.0).then_some(CREDIT_ONLY_ADVISORY)
}
