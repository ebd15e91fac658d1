pub mod ticket;

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::config::TicketConfig;
use crate::draft::{OrderDraft, SubmissionOutcome};
use crate::event::AppEvent;
use crate::model::account::AccountSnapshot;
use crate::model::quote::{Instrument, MarketSnapshot};
use crate::model::transaction::TransactionPage;
use crate::payload::wire_pair;
use crate::ui_handlers::Effect;

use ticket::{KeybindBar, LogPanel, StatusBar, TicketPanel, TransactionsPanel};

const MAX_LOG_MESSAGES: usize = 200;

/// Which text field receives typed characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFocus {
    #[default]
    None,
    Quantity,
    LimitPrice,
}

pub struct AppState {
    pub draft: OrderDraft,
    pub account: AccountSnapshot,
    pub market: MarketSnapshot,
    pub transactions: TransactionPage,
    pub current_page: u32,
    pub max_leverage: u32,
    pub focus: InputFocus,
    pub quantity_input: String,
    pub log_messages: Vec<String>,
}

impl AppState {
    /// Quantity is seeded at the account's ceiling; the feed counts as
    /// loading until the first quote for the instrument arrives.
    pub fn new(account: AccountSnapshot, instrument: Option<Instrument>, ticket: &TicketConfig) -> Self {
        let leverage = ticket.clamp_leverage(ticket.default_leverage);
        let loading = instrument.is_some();
        Self {
            draft: OrderDraft::new(&account, leverage, ticket.feedback_clear_after()),
            account,
            market: MarketSnapshot {
                instrument,
                quote: None,
                loading,
            },
            transactions: TransactionPage {
                page: 1,
                total_pages: 1,
                rows: Vec::new(),
            },
            current_page: 1,
            max_leverage: ticket.max_leverage,
            focus: InputFocus::None,
            quantity_input: String::new(),
            log_messages: Vec::new(),
        }
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.remove(0);
        }
    }

    pub fn submit_enabled(&self) -> bool {
        self.draft.submit_enabled(&self.account, &self.market)
    }

    pub fn is_editing(&self) -> bool {
        self.focus != InputFocus::None
    }

    pub fn apply(&mut self, event: AppEvent) -> Vec<Effect> {
        match event {
            AppEvent::AccountUpdate(account) => {
                self.account = account;
                Vec::new()
            }
            AppEvent::QuoteUpdate { pair, quote } => {
                let matches = self
                    .market
                    .instrument
                    .as_ref()
                    .is_some_and(|i| i.symbol == pair || wire_pair(i) == pair);
                if matches {
                    self.market.quote = Some(quote);
                    self.market.loading = false;
                }
                Vec::new()
            }
            AppEvent::TransactionsUpdate(page) => {
                self.transactions = page;
                Vec::new()
            }
            AppEvent::SubmissionFinished {
                submission_id,
                result,
            } => match self.draft.complete_submission(submission_id, result) {
                SubmissionOutcome::Succeeded { side, .. } => {
                    self.push_log(format!("{} order accepted", side));
                    vec![Effect::Refresh {
                        page: self.current_page,
                    }]
                }
                SubmissionOutcome::Failed { side, error, .. } => {
                    self.push_log(format!("[ERR] {} order failed: {}", side, error));
                    Vec::new()
                }
                SubmissionOutcome::Rejected(_) | SubmissionOutcome::Stale { .. } => Vec::new(),
            },
            AppEvent::FeedbackExpired { generation } => {
                self.draft.expire_feedback(generation);
                Vec::new()
            }
            AppEvent::LogMessage(msg) => {
                self.push_log(msg);
                Vec::new()
            }
            AppEvent::Error(msg) => {
                self.push_log(format!("[ERR] {}", msg));
                Vec::new()
            }
        }
    }
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(18),   // ticket + history
            Constraint::Length(1), // keybinds
        ])
        .split(frame.area());

    frame.render_widget(
        StatusBar {
            market: &state.market,
            account: &state.account,
        },
        outer[0],
    );

    let main_area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(46), Constraint::Min(30)])
        .split(outer[1]);

    frame.render_widget(
        TicketPanel {
            draft: &state.draft,
            account: &state.account,
            market: &state.market,
            focus: state.focus,
            quantity_input: &state.quantity_input,
            submit_enabled: state.submit_enabled(),
        },
        main_area[0],
    );

    let side_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(7)])
        .split(main_area[1]);

    frame.render_widget(TransactionsPanel::new(&state.transactions), side_area[0]);
    frame.render_widget(LogPanel::new(&state.log_messages), side_area[1]);

    frame.render_widget(KeybindBar { editing: state.is_editing() }, outer[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubmitError;
    use crate::model::order::OrderSide;
    use crate::model::quote::{FeedCategory, PricedPair};

    fn ticket() -> TicketConfig {
        TicketConfig {
            default_leverage: 30,
            max_leverage: 100,
            feedback_clear_ms: 3000,
        }
    }

    fn state() -> AppState {
        AppState::new(
            AccountSnapshot::new(1000.0, 0.0),
            Some(Instrument::new("XAU/USD", FeedCategory::Commodity)),
            &ticket(),
        )
    }

    #[test]
    fn first_quote_ends_loading() {
        let mut s = state();
        assert!(s.market.loading);
        s.apply(AppEvent::QuoteUpdate {
            pair: "XAUUSD".to_string(),
            quote: PricedPair::new(2400.0, 2400.5),
        });
        assert!(!s.market.loading);
        assert!(s.submit_enabled());
    }

    #[test]
    fn quotes_for_other_pairs_are_ignored() {
        let mut s = state();
        s.apply(AppEvent::QuoteUpdate {
            pair: "EUR/USD".to_string(),
            quote: PricedPair::new(1.08, 1.09),
        });
        assert!(s.market.quote.is_none());
        assert!(s.market.loading);
    }

    #[test]
    fn failed_submission_logs_without_refresh() {
        let mut s = state();
        s.market.loading = false;
        s.market.quote = Some(PricedPair::new(2400.0, 2400.5));
        let pending = s
            .draft
            .begin_submission(OrderSide::Sell, &s.account, &s.market)
            .expect("valid order");
        let effects = s.apply(AppEvent::SubmissionFinished {
            submission_id: pending.submission_id,
            result: Err(SubmitError::Transport("connection reset".to_string())),
        });
        assert!(effects.is_empty());
        assert!(!s.draft.is_submitting());
        assert!(s.log_messages.last().is_some_and(|m| m.starts_with("[ERR]")));
    }

    #[test]
    fn log_is_bounded() {
        let mut s = state();
        for i in 0..(MAX_LOG_MESSAGES + 5) {
            s.push_log(format!("line {}", i));
        }
        assert_eq!(s.log_messages.len(), MAX_LOG_MESSAGES);
        assert_eq!(s.log_messages[0], "line 5");
    }

    #[test]
    fn feed_recovery_message_lands_in_log() {
        let mut s = state();
        let effects = s.apply(AppEvent::LogMessage("Quote feed for XAUUSD recovered".to_string()));
        assert!(effects.is_empty());
        assert_eq!(
            s.log_messages.last().map(String::as_str),
            Some("Quote feed for XAUUSD recovered")
        );
    }
}
