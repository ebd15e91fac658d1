use tokio::sync::mpsc;
use uuid::Uuid;

use crate::coordinator::{CompletionSink, SubmitResult};
use crate::model::account::AccountSnapshot;
use crate::model::quote::PricedPair;
use crate::model::transaction::TransactionPage;

#[derive(Debug, Clone)]
pub enum AppEvent {
    AccountUpdate(AccountSnapshot),
    QuoteUpdate {
        pair: String,
        quote: PricedPair,
    },
    TransactionsUpdate(TransactionPage),
    SubmissionFinished {
        submission_id: Uuid,
        result: SubmitResult,
    },
    FeedbackExpired {
        generation: u64,
    },
    LogMessage(String),
    Error(String),
}

/// Channels background tasks report on.
///
/// Submission results get their own unbounded queue: a burst of quotes or
/// refreshes filling `app_tx` must never cost a completion, or the ticket
/// would stay in the submitting state.
#[derive(Clone)]
pub struct EventSenders {
    pub app_tx: mpsc::Sender<AppEvent>,
    pub completion_tx: mpsc::UnboundedSender<AppEvent>,
}

pub struct EventReceivers {
    pub app_rx: mpsc::Receiver<AppEvent>,
    pub completion_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventReceivers {
    /// Next pending event, completions first.
    pub fn try_next(&mut self) -> Option<AppEvent> {
        self.completion_rx
            .try_recv()
            .or_else(|_| self.app_rx.try_recv())
            .ok()
    }
}

pub fn event_channels(capacity: usize) -> (EventSenders, EventReceivers) {
    let (app_tx, app_rx) = mpsc::channel(capacity);
    let (completion_tx, completion_rx) = mpsc::unbounded_channel();
    (
        EventSenders {
            app_tx,
            completion_tx,
        },
        EventReceivers {
            app_rx,
            completion_rx,
        },
    )
}

/// Reports a spawned submission's result back to the UI loop.
impl CompletionSink for mpsc::UnboundedSender<AppEvent> {
    type Output = ();

    fn deliver(&mut self, submission_id: Uuid, result: SubmitResult) {
        if self
            .send(AppEvent::SubmissionFinished {
                submission_id,
                result,
            })
            .is_err()
        {
            tracing::error!(%submission_id, "Submission result dropped: UI loop has exited");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::SubmissionGuard;
    use crate::payload::TradeAck;

    #[test]
    fn completion_survives_full_app_queue() {
        let (senders, mut receivers) = event_channels(1);
        senders
            .app_tx
            .try_send(AppEvent::LogMessage("quote burst".to_string()))
            .expect("first slot free");
        assert!(senders
            .app_tx
            .try_send(AppEvent::LogMessage("overflow".to_string()))
            .is_err());

        let id = Uuid::new_v4();
        SubmissionGuard::new(senders.completion_tx.clone(), id).settle(Ok(TradeAck::default()));

        match receivers.try_next() {
            Some(AppEvent::SubmissionFinished { submission_id, result }) => {
                assert_eq!(submission_id, id);
                assert!(result.is_ok());
            }
            other => panic!("expected completion first, got {:?}", other),
        }
        assert!(matches!(receivers.try_next(), Some(AppEvent::LogMessage(_))));
        assert!(receivers.try_next().is_none());
    }

    #[test]
    fn dropped_guard_reports_through_completion_queue() {
        let (senders, mut receivers) = event_channels(1);
        let id = Uuid::new_v4();
        drop(SubmissionGuard::new(senders.completion_tx.clone(), id));
        assert!(matches!(
            receivers.try_next(),
            Some(AppEvent::SubmissionFinished { result: Err(crate::error::SubmitError::Interrupted), .. })
        ));
    }
}
