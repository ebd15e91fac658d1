use std::time::Duration;

use uuid::Uuid;

use crate::error::{SubmitError, ValidationError};
use crate::feedback::{Feedback, FeedbackKind, FeedbackSlot, ScheduledClear};
use crate::model::account::AccountSnapshot;
use crate::model::order::{OrderSide, OrderType};
use crate::model::quote::MarketSnapshot;
use crate::payload::{build_trade_request, resolve_entry_price, TradeAck, TradeRequest};
use crate::sizing::{PositionSizer, SizingOutcome};
use crate::solvency::{self, SolvencyInputs};

pub const DEFAULT_LEVERAGE: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting {
        submission_id: Uuid,
        side: OrderSide,
        order_type: OrderType,
    },
}

/// An order that passed local validation and is ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    pub submission_id: Uuid,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub request: TradeRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Refused locally; no request was made.
    Rejected(ValidationError),
    Succeeded {
        submission_id: Uuid,
        side: OrderSide,
        order_type: OrderType,
        ack: TradeAck,
    },
    Failed {
        submission_id: Uuid,
        side: OrderSide,
        error: SubmitError,
    },
    /// Completion arrived for a submission that is no longer in flight.
    Stale { submission_id: Uuid },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Succeeded { .. })
    }
}

/// Transient order-construction state for one ticket session.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    order_type: OrderType,
    sizer: PositionSizer,
    limit_price: String,
    submission: SubmissionState,
    feedback: FeedbackSlot,
}

impl OrderDraft {
    /// Seed a draft from the account at mount: quantity starts at the full
    /// solvency ceiling.
    pub fn new(account: &AccountSnapshot, leverage: u32, clear_after: Duration) -> Self {
        Self {
            order_type: OrderType::Market,
            sizer: PositionSizer::new(account.solvency_ceiling().max(0.0), leverage),
            limit_price: String::new(),
            submission: SubmissionState::Idle,
            feedback: FeedbackSlot::new(clear_after),
        }
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn sizer(&self) -> &PositionSizer {
        &self.sizer
    }

    pub fn quantity(&self) -> f64 {
        self.sizer.quantity()
    }

    pub fn leverage(&self) -> u32 {
        self.sizer.leverage()
    }

    pub fn margin(&self) -> f64 {
        self.sizer.margin()
    }

    pub fn limit_price(&self) -> &str {
        &self.limit_price
    }

    pub fn submission(&self) -> SubmissionState {
        self.submission
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.submission, SubmissionState::Submitting { .. })
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.current()
    }

    pub fn feedback_slot(&self) -> &FeedbackSlot {
        &self.feedback
    }

    /// Switch between the open and limit tabs. Sizing is kept; messages go.
    pub fn switch_tab(&mut self, order_type: OrderType) {
        self.order_type = order_type;
        self.feedback.clear();
    }

    pub fn set_limit_price(&mut self, text: impl Into<String>) {
        self.limit_price = text.into();
    }

    pub fn set_leverage(&mut self, leverage: u32) {
        self.sizer.set_leverage(leverage);
    }

    /// Returns the clear to schedule when the increase was refused.
    pub fn increase_quantity(&mut self, account: &AccountSnapshot) -> Option<ScheduledClear> {
        match self.sizer.increase(account.solvency_ceiling()) {
            SizingOutcome::Rejected { candidate, margin } => {
                tracing::debug!(
                    candidate,
                    margin,
                    ceiling = account.solvency_ceiling(),
                    "Quantity increase rejected"
                );
                Some(self.feedback.show_transient(
                    FeedbackKind::Error,
                    ValidationError::TradeSizeExceedsBalance.to_string(),
                ))
            }
            _ => None,
        }
    }

    pub fn decrease_quantity(&mut self, account: &AccountSnapshot) -> SizingOutcome {
        self.sizer.decrease(account.solvency_ceiling())
    }

    pub fn enter_quantity(&mut self, raw: &str, account: &AccountSnapshot) -> SizingOutcome {
        self.sizer.enter_quantity(raw, account.solvency_ceiling())
    }

    pub fn expire_feedback(&mut self, generation: u64) -> bool {
        self.feedback.expire(generation)
    }

    pub fn solvency_inputs(&self, account: &AccountSnapshot, market: &MarketSnapshot) -> SolvencyInputs {
        SolvencyInputs {
            loading: market.loading,
            submitting: self.is_submitting(),
            margin: self.margin(),
            account: *account,
        }
    }

    /// Whether the buy/sell controls are live.
    pub fn submit_enabled(&self, account: &AccountSnapshot, market: &MarketSnapshot) -> bool {
        market.has_pair() && solvency::submit_enabled(&self.solvency_inputs(account, market))
    }

    /// Validate and move to `Submitting`. On a validation failure the draft
    /// stays idle and shows the error; a call while another submission is
    /// in flight is refused without touching feedback.
    pub fn begin_submission(
        &mut self,
        side: OrderSide,
        account: &AccountSnapshot,
        market: &MarketSnapshot,
    ) -> Result<PendingSubmission, ValidationError> {
        if let SubmissionState::Submitting { submission_id, .. } = self.submission {
            tracing::warn!(%submission_id, side = %side, "Order ignored: submission already in flight");
            return Err(ValidationError::SubmissionInFlight);
        }
        self.feedback.clear();

        match self.prepare(side, account, market) {
            Ok(pending) => {
                self.submission = SubmissionState::Submitting {
                    submission_id: pending.submission_id,
                    side,
                    order_type: pending.order_type,
                };
                tracing::info!(
                    submission_id = %pending.submission_id,
                    side = %side,
                    order_type = %pending.order_type,
                    pair = %pending.request.meta_data.pair,
                    quantity = pending.request.meta_data.quantity,
                    margin = pending.request.meta_data.margin,
                    leverage = pending.request.meta_data.leverage,
                    "Submission started"
                );
                Ok(pending)
            }
            Err(err) => {
                tracing::info!(
                    side = %side,
                    reason_code = err.reason_code().as_str(),
                    "Order rejected before submission"
                );
                self.feedback.show(FeedbackKind::Error, err.to_string());
                Err(err)
            }
        }
    }

    fn prepare(
        &self,
        side: OrderSide,
        account: &AccountSnapshot,
        market: &MarketSnapshot,
    ) -> Result<PendingSubmission, ValidationError> {
        if self.quantity() == 0.0 {
            return Err(ValidationError::ZeroQuantity);
        }
        if !solvency::is_affordable(self.margin(), account) {
            return Err(ValidationError::MarginExceedsCeiling);
        }
        let instrument = market
            .instrument
            .as_ref()
            .ok_or(ValidationError::NoPairSelected)?;
        if account.balance <= 0.0 {
            return Err(ValidationError::CreditOnlyFunding);
        }
        if account.solvency_ceiling() <= 0.0 {
            return Err(ValidationError::NoBuyingPower);
        }
        if market.loading {
            return Err(ValidationError::FeedLoading);
        }

        let entry_price =
            resolve_entry_price(self.order_type, side, market.quote.as_ref(), &self.limit_price)?;
        let request = build_trade_request(
            instrument,
            self.order_type,
            self.leverage(),
            self.quantity(),
            self.margin(),
            entry_price,
        );
        Ok(PendingSubmission {
            submission_id: Uuid::new_v4(),
            side,
            order_type: self.order_type,
            request,
        })
    }

    /// Apply the result of the in-flight submission and return to idle.
    /// Sizing is never touched, so a failed order can be resent as is.
    pub fn complete_submission(
        &mut self,
        submission_id: Uuid,
        result: Result<TradeAck, SubmitError>,
    ) -> SubmissionOutcome {
        let (side, order_type) = match self.submission {
            SubmissionState::Submitting {
                submission_id: active,
                side,
                order_type,
            } if active == submission_id => (side, order_type),
            _ => {
                tracing::warn!(%submission_id, "Completion ignored: submission not in flight");
                return SubmissionOutcome::Stale { submission_id };
            }
        };
        self.submission = SubmissionState::Idle;

        match result {
            Ok(ack) => {
                self.feedback.show(
                    FeedbackKind::Success,
                    format!("{} order submitted successfully!", side),
                );
                if order_type == OrderType::Limit {
                    self.limit_price.clear();
                }
                tracing::info!(%submission_id, side = %side, "Order accepted by broker");
                SubmissionOutcome::Succeeded {
                    submission_id,
                    side,
                    order_type,
                    ack,
                }
            }
            Err(error) => {
                tracing::warn!(%submission_id, side = %side, error = %error, "Order submission failed");
                self.feedback.show(FeedbackKind::Error, error.user_message());
                SubmissionOutcome::Failed {
                    submission_id,
                    side,
                    error,
                }
            }
        }
    }
}
