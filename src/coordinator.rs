use std::future::Future;
use std::sync::Arc;

use uuid::Uuid;

use crate::draft::{OrderDraft, PendingSubmission, SubmissionOutcome};
use crate::error::SubmitError;
use crate::model::account::AccountSnapshot;
use crate::model::order::OrderSide;
use crate::model::quote::MarketSnapshot;
use crate::payload::{TradeAck, TradeRequest};

pub type SubmitResult = Result<TradeAck, SubmitError>;

/// Backend that accepts trade orders.
pub trait TradeGateway: Send + Sync {
    fn place_trade(
        &self,
        side: OrderSide,
        request: &TradeRequest,
    ) -> impl Future<Output = SubmitResult> + Send;
}

/// Fire-and-forget refreshes requested after an accepted order.
pub trait RefreshHooks {
    fn refresh_profile(&self);
    fn refresh_transactions(&self, page: u32);
}

/// Receiver of a submission's final result.
pub trait CompletionSink {
    type Output;

    fn deliver(&mut self, submission_id: Uuid, result: SubmitResult) -> Self::Output;
}

impl CompletionSink for &mut OrderDraft {
    type Output = SubmissionOutcome;

    fn deliver(&mut self, submission_id: Uuid, result: SubmitResult) -> SubmissionOutcome {
        self.complete_submission(submission_id, result)
    }
}

/// Owns the obligation to report a submission's result exactly once.
///
/// If the guard is dropped unsettled (the network future panicked or was
/// cancelled) it reports [`SubmitError::Interrupted`], so the ticket always
/// leaves the submitting state.
pub struct SubmissionGuard<S: CompletionSink> {
    sink: S,
    submission_id: Uuid,
    settled: bool,
}

impl<S: CompletionSink> SubmissionGuard<S> {
    pub fn new(sink: S, submission_id: Uuid) -> Self {
        Self {
            sink,
            submission_id,
            settled: false,
        }
    }

    pub fn settle(mut self, result: SubmitResult) -> S::Output {
        self.settled = true;
        self.sink.deliver(self.submission_id, result)
    }
}

impl<S: CompletionSink> Drop for SubmissionGuard<S> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.settled = true;
        tracing::warn!(submission_id = %self.submission_id, "Submission dropped before completion");
        let _ = self.sink.deliver(self.submission_id, Err(SubmitError::Interrupted));
    }
}

/// Send a prepared order through the gateway.
pub async fn execute<G: TradeGateway>(
    gateway: &G,
    pending: &PendingSubmission,
) -> SubmitResult {
    tracing::info!(
        submission_id = %pending.submission_id,
        side = %pending.side,
        pair = %pending.request.meta_data.pair,
        "Sending order to broker"
    );
    gateway.place_trade(pending.side, &pending.request).await
}

pub struct SubmissionCoordinator<G, H> {
    gateway: Arc<G>,
    hooks: H,
}

impl<G: TradeGateway, H: RefreshHooks> SubmissionCoordinator<G, H> {
    pub fn new(gateway: Arc<G>, hooks: H) -> Self {
        Self { gateway, hooks }
    }

    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// Validate, send and settle one order. On success the profile and the
    /// transaction list for `current_page` are refreshed once each.
    pub async fn submit(
        &self,
        draft: &mut OrderDraft,
        side: OrderSide,
        account: &AccountSnapshot,
        market: &MarketSnapshot,
        current_page: u32,
    ) -> SubmissionOutcome {
        let pending = match draft.begin_submission(side, account, market) {
            Ok(pending) => pending,
            Err(err) => return SubmissionOutcome::Rejected(err),
        };

        let guard = SubmissionGuard::new(&mut *draft, pending.submission_id);
        let result = execute(self.gateway.as_ref(), &pending).await;
        let outcome = guard.settle(result);

        if outcome.is_success() {
            self.request_refresh(current_page);
        }
        outcome
    }

    pub fn request_refresh(&self, current_page: u32) {
        tracing::debug!(page = current_page, "Requesting profile and transaction refresh");
        self.hooks.refresh_profile();
        self.hooks.refresh_transactions(current_page);
    }
}
