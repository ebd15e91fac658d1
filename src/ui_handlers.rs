use std::sync::Arc;

use crate::coordinator::{execute, RefreshHooks, SubmissionCoordinator, SubmissionGuard, TradeGateway};
use crate::draft::PendingSubmission;
use crate::event::{AppEvent, EventSenders};
use crate::feedback::ScheduledClear;
use crate::input::{EditCommand, UiCommand};
use crate::model::order::{OrderSide, OrderType};
use crate::ui::{AppState, InputFocus};

/// Side effects requested by state transitions. The main loop runs them.
#[derive(Debug, Clone)]
pub enum Effect {
    ScheduleFeedbackClear(ScheduledClear),
    Submit(PendingSubmission),
    /// Profile plus the given transaction page.
    Refresh { page: u32 },
    FetchTransactions { page: u32 },
}

pub fn handle_main_command(cmd: UiCommand, state: &mut AppState) -> Vec<Effect> {
    match cmd {
        UiCommand::SwitchTab(order_type) => {
            state.draft.switch_tab(order_type);
            if order_type == OrderType::Market && state.focus == InputFocus::LimitPrice {
                state.focus = InputFocus::None;
            }
            Vec::new()
        }
        UiCommand::IncreaseQuantity => state
            .draft
            .increase_quantity(&state.account)
            .map(Effect::ScheduleFeedbackClear)
            .into_iter()
            .collect(),
        UiCommand::DecreaseQuantity => {
            state.draft.decrease_quantity(&state.account);
            Vec::new()
        }
        UiCommand::LeverageUp => {
            let next = (state.draft.leverage() + 1).min(state.max_leverage.max(1));
            state.draft.set_leverage(next);
            Vec::new()
        }
        UiCommand::LeverageDown => {
            let next = state.draft.leverage().saturating_sub(1).max(1);
            state.draft.set_leverage(next);
            Vec::new()
        }
        UiCommand::Buy => submit(state, OrderSide::Buy),
        UiCommand::Sell => submit(state, OrderSide::Sell),
        UiCommand::EditQuantity => {
            state.quantity_input = format!("{:.2}", state.draft.quantity());
            state.focus = InputFocus::Quantity;
            Vec::new()
        }
        UiCommand::EditLimitPrice => {
            if state.draft.order_type() == OrderType::Limit {
                state.focus = InputFocus::LimitPrice;
            }
            Vec::new()
        }
        UiCommand::NextPage => {
            if state.transactions.has_next() {
                state.current_page += 1;
                vec![Effect::FetchTransactions {
                    page: state.current_page,
                }]
            } else {
                Vec::new()
            }
        }
        UiCommand::PrevPage => {
            if state.current_page > 1 {
                state.current_page -= 1;
                vec![Effect::FetchTransactions {
                    page: state.current_page,
                }]
            } else {
                Vec::new()
            }
        }
        UiCommand::Refresh => vec![Effect::Refresh {
            page: state.current_page,
        }],
    }
}

/// Buttons are inert while disabled; validation only runs on a live button.
fn submit(state: &mut AppState, side: OrderSide) -> Vec<Effect> {
    if !state.market.has_pair() {
        return Vec::new();
    }
    let decision = crate::solvency::evaluate(&state.draft.solvency_inputs(&state.account, &state.market));
    if !decision.approved {
        if let Some(code) = decision.reason_code {
            tracing::debug!(side = %side, reason = code.as_str(), "Order button disabled");
        }
        return Vec::new();
    }

    match state.draft.begin_submission(side, &state.account, &state.market) {
        Ok(pending) => {
            state.push_log(format!("{} {} submitted", side, pending.request.meta_data.pair));
            vec![Effect::Submit(pending)]
        }
        Err(err) => {
            state.push_log(format!("[WARN] {} refused: {}", side, err));
            Vec::new()
        }
    }
}

pub fn handle_edit_command(cmd: EditCommand, state: &mut AppState) -> Vec<Effect> {
    match state.focus {
        InputFocus::None => {}
        InputFocus::Quantity => match cmd {
            EditCommand::Push(c) => state.quantity_input.push(c),
            EditCommand::Pop => {
                state.quantity_input.pop();
            }
            EditCommand::Commit => {
                let raw = std::mem::take(&mut state.quantity_input);
                state.draft.enter_quantity(&raw, &state.account);
                state.focus = InputFocus::None;
            }
            EditCommand::Cancel => {
                state.quantity_input.clear();
                state.focus = InputFocus::None;
            }
        },
        InputFocus::LimitPrice => match cmd {
            EditCommand::Push(c) => {
                let mut text = state.draft.limit_price().to_string();
                text.push(c);
                state.draft.set_limit_price(text);
            }
            EditCommand::Pop => {
                let mut text = state.draft.limit_price().to_string();
                text.pop();
                state.draft.set_limit_price(text);
            }
            EditCommand::Commit | EditCommand::Cancel => state.focus = InputFocus::None,
        },
    }
    Vec::new()
}

/// Run one effect on the tokio runtime. Results come back as [`AppEvent`]s.
pub fn dispatch_effect<G, H>(
    effect: Effect,
    coordinator: &SubmissionCoordinator<G, H>,
    senders: &EventSenders,
) where
    G: TradeGateway + 'static,
    H: RefreshHooks,
{
    match effect {
        Effect::ScheduleFeedbackClear(clear) => {
            let tx = senders.app_tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(clear.delay).await;
                let _ = tx
                    .send(AppEvent::FeedbackExpired {
                        generation: clear.generation,
                    })
                    .await;
            });
        }
        Effect::Submit(pending) => {
            let gateway: Arc<G> = coordinator.gateway().clone();
            let guard = SubmissionGuard::new(senders.completion_tx.clone(), pending.submission_id);
            tokio::spawn(async move {
                let result = execute(gateway.as_ref(), &pending).await;
                guard.settle(result);
            });
        }
        Effect::Refresh { page } => coordinator.request_refresh(page),
        Effect::FetchTransactions { page } => coordinator.hooks().refresh_transactions(page),
    }
}
