use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use order_ticket::config::TicketConfig;
use order_ticket::coordinator::{RefreshHooks, SubmissionCoordinator, SubmitResult, TradeGateway};
use order_ticket::error::SubmitError;
use order_ticket::event::{event_channels, AppEvent};
use order_ticket::input::{EditCommand, UiCommand};
use order_ticket::model::account::AccountSnapshot;
use order_ticket::model::order::{OrderSide, OrderType};
use order_ticket::model::quote::{FeedCategory, Instrument, PricedPair};
use order_ticket::model::transaction::TransactionPage;
use order_ticket::payload::{TradeAck, TradeRequest};
use order_ticket::ui::{AppState, InputFocus};
use order_ticket::ui_handlers::{dispatch_effect, handle_edit_command, handle_main_command, Effect};

struct StaticGateway(SubmitResult);

impl TradeGateway for StaticGateway {
    async fn place_trade(&self, _side: OrderSide, _request: &TradeRequest) -> SubmitResult {
        self.0.clone()
    }
}

#[derive(Default, Clone)]
struct CountingHooks {
    profile: Arc<AtomicUsize>,
    transactions: Arc<AtomicUsize>,
}

impl RefreshHooks for CountingHooks {
    fn refresh_profile(&self) {
        self.profile.fetch_add(1, Ordering::SeqCst);
    }

    fn refresh_transactions(&self, _page: u32) {
        self.transactions.fetch_add(1, Ordering::SeqCst);
    }
}

fn state(balance: f64) -> AppState {
    let mut state = AppState::new(
        AccountSnapshot::new(balance, 0.0),
        Some(Instrument::new("EUR/USD", FeedCategory::Forex)),
        &TicketConfig {
            default_leverage: 30,
            max_leverage: 50,
            feedback_clear_ms: 3000,
        },
    );
    state.apply(AppEvent::QuoteUpdate {
        pair: "EUR/USD".to_string(),
        quote: PricedPair::new(1.0840, 1.0850),
    });
    state
}

#[test]
fn leverage_keys_stay_within_widget_range() {
    let mut s = state(1000.0);
    for _ in 0..40 {
        handle_main_command(UiCommand::LeverageUp, &mut s);
    }
    assert_eq!(s.draft.leverage(), 50);
    for _ in 0..80 {
        handle_main_command(UiCommand::LeverageDown, &mut s);
    }
    assert_eq!(s.draft.leverage(), 1);
    assert!((s.draft.margin() - s.draft.quantity()).abs() < 1e-9);
}

#[test]
fn rejected_increase_schedules_feedback_clear() {
    let mut s = state(100.0);
    s.draft.set_leverage(1);
    let effects = handle_main_command(UiCommand::IncreaseQuantity, &mut s);
    assert!(matches!(
        effects.as_slice(),
        [Effect::ScheduleFeedbackClear(clear)] if clear.delay == Duration::from_secs(3)
    ));
    assert_eq!(
        s.draft.feedback_slot().error(),
        Some("Insufficient balance for this trade size")
    );
}

#[test]
fn quantity_edit_commits_on_enter() {
    let mut s = state(1000.0);
    handle_main_command(UiCommand::EditQuantity, &mut s);
    assert_eq!(s.focus, InputFocus::Quantity);
    assert_eq!(s.quantity_input, "1000.00");

    for _ in 0..7 {
        handle_edit_command(EditCommand::Pop, &mut s);
    }
    for c in "250".chars() {
        handle_edit_command(EditCommand::Push(c), &mut s);
    }
    handle_edit_command(EditCommand::Commit, &mut s);

    assert_eq!(s.focus, InputFocus::None);
    assert!((s.draft.quantity() - 250.0).abs() < 1e-9);
}

#[test]
fn quantity_edit_cancel_keeps_quantity() {
    let mut s = state(1000.0);
    handle_main_command(UiCommand::EditQuantity, &mut s);
    handle_edit_command(EditCommand::Push('9'), &mut s);
    handle_edit_command(EditCommand::Cancel, &mut s);
    assert_eq!(s.focus, InputFocus::None);
    assert!((s.draft.quantity() - 1000.0).abs() < 1e-9);
}

#[test]
fn limit_price_editing_only_on_limit_tab() {
    let mut s = state(1000.0);
    handle_main_command(UiCommand::EditLimitPrice, &mut s);
    assert_eq!(s.focus, InputFocus::None);

    handle_main_command(UiCommand::SwitchTab(OrderType::Limit), &mut s);
    handle_main_command(UiCommand::EditLimitPrice, &mut s);
    assert_eq!(s.focus, InputFocus::LimitPrice);
    for c in "1.07x".chars() {
        handle_edit_command(EditCommand::Push(c), &mut s);
    }
    handle_edit_command(EditCommand::Pop, &mut s);
    assert_eq!(s.draft.limit_price(), "1.07");

    handle_main_command(UiCommand::SwitchTab(OrderType::Market), &mut s);
    assert_eq!(s.focus, InputFocus::None);
}

#[test]
fn disabled_buttons_do_nothing() {
    let mut s = state(0.0);
    let effects = handle_main_command(UiCommand::Buy, &mut s);
    assert!(effects.is_empty());
    assert!(!s.draft.is_submitting());
    assert!(s.draft.feedback().is_none());
}

#[test]
fn live_button_with_missing_limit_price_shows_error() {
    let mut s = state(1000.0);
    handle_main_command(UiCommand::SwitchTab(OrderType::Limit), &mut s);
    let effects = handle_main_command(UiCommand::Sell, &mut s);
    assert!(effects.is_empty());
    assert_eq!(s.draft.feedback_slot().error(), Some("Please enter a limit price"));
}

#[test]
fn paging_requests_transactions() {
    let mut s = state(1000.0);
    assert!(handle_main_command(UiCommand::PrevPage, &mut s).is_empty());
    assert!(handle_main_command(UiCommand::NextPage, &mut s).is_empty());

    s.apply(AppEvent::TransactionsUpdate(TransactionPage {
        page: 1,
        total_pages: 3,
        rows: Vec::new(),
    }));
    let effects = handle_main_command(UiCommand::NextPage, &mut s);
    assert!(matches!(effects.as_slice(), [Effect::FetchTransactions { page: 2 }]));
    assert_eq!(s.current_page, 2);

    let effects = handle_main_command(UiCommand::Refresh, &mut s);
    assert!(matches!(effects.as_slice(), [Effect::Refresh { page: 2 }]));
}

#[tokio::test]
/// Verifies the spawned submission path end to end:
/// the result comes back on the completion queue and success triggers one refresh.
async fn dispatched_submission_reports_back() {
    let (senders, mut receivers) = event_channels(16);
    let hooks = CountingHooks::default();
    let coordinator = SubmissionCoordinator::new(
        Arc::new(StaticGateway(Ok(TradeAck::default()))),
        hooks.clone(),
    );
    let mut s = state(1000.0);

    let effects = handle_main_command(UiCommand::Buy, &mut s);
    assert!(s.draft.is_submitting());
    assert_eq!(effects.len(), 1);
    for effect in effects {
        dispatch_effect(effect, &coordinator, &senders);
    }

    // A second press while in flight is refused.
    let again = handle_main_command(UiCommand::Buy, &mut s);
    assert!(again.is_empty());

    let event = tokio::time::timeout(Duration::from_secs(1), receivers.completion_rx.recv())
        .await
        .expect("result within timeout")
        .expect("channel open");
    let follow_up = s.apply(event);
    assert!(!s.draft.is_submitting());
    assert_eq!(
        s.draft.feedback_slot().success(),
        Some("BUY order submitted successfully!")
    );

    for effect in follow_up {
        dispatch_effect(effect, &coordinator, &senders);
    }
    assert_eq!(hooks.profile.load(Ordering::SeqCst), 1);
    assert_eq!(hooks.transactions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn dispatched_failure_shows_backend_message() {
    let (senders, mut receivers) = event_channels(16);
    let hooks = CountingHooks::default();
    let coordinator = SubmissionCoordinator::new(
        Arc::new(StaticGateway(Err(SubmitError::Backend {
            side: OrderSide::Sell,
            status: 422,
            message: Some("Leverage not allowed".to_string()),
        }))),
        hooks.clone(),
    );
    let mut s = state(1000.0);

    for effect in handle_main_command(UiCommand::Sell, &mut s) {
        dispatch_effect(effect, &coordinator, &senders);
    }
    let event = tokio::time::timeout(Duration::from_secs(1), receivers.completion_rx.recv())
        .await
        .expect("result within timeout")
        .expect("channel open");
    assert!(s.apply(event).is_empty());
    assert_eq!(s.draft.feedback_slot().error(), Some("Leverage not allowed"));
    assert_eq!(hooks.profile.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn scheduled_clear_fires_after_delay() {
    let (senders, mut receivers) = event_channels(16);
    let coordinator = SubmissionCoordinator::new(
        Arc::new(StaticGateway(Ok(TradeAck::default()))),
        CountingHooks::default(),
    );
    let mut s = state(100.0);
    s.draft.set_leverage(1);

    for effect in handle_main_command(UiCommand::IncreaseQuantity, &mut s) {
        dispatch_effect(effect, &coordinator, &senders);
    }
    assert!(s.draft.feedback().is_some());

    let event = receivers.app_rx.recv().await.expect("expiry event");
    assert!(matches!(event, AppEvent::FeedbackExpired { .. }));
    s.apply(event);
    assert!(s.draft.feedback().is_none());
}

#[tokio::test]
/// Verifies a saturated event queue cannot strand the ticket in submitting.
async fn completion_arrives_while_app_queue_is_full() {
    let (senders, mut receivers) = event_channels(1);
    let coordinator = SubmissionCoordinator::new(
        Arc::new(StaticGateway(Ok(TradeAck::default()))),
        CountingHooks::default(),
    );
    let mut s = state(1000.0);

    senders
        .app_tx
        .try_send(AppEvent::QuoteUpdate {
            pair: "EUR/USD".to_string(),
            quote: PricedPair::new(1.0841, 1.0851),
        })
        .expect("queue has one slot");
    assert!(senders
        .app_tx
        .try_send(AppEvent::LogMessage("backlog".to_string()))
        .is_err());

    for effect in handle_main_command(UiCommand::Buy, &mut s) {
        dispatch_effect(effect, &coordinator, &senders);
    }
    let event = tokio::time::timeout(Duration::from_secs(1), receivers.completion_rx.recv())
        .await
        .expect("result within timeout")
        .expect("channel open");
    s.apply(event);

    assert!(!s.draft.is_submitting());
    assert!(matches!(receivers.try_next(), Some(AppEvent::QuoteUpdate { .. })));
}
