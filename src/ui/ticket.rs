use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::draft::{OrderDraft, SubmissionState};
use crate::feedback::FeedbackKind;
use crate::model::account::AccountSnapshot;
use crate::model::order::{OrderSide, OrderType};
use crate::model::quote::MarketSnapshot;
use crate::model::transaction::{format_transaction_row, TransactionPage};
use crate::solvency::funding_advisory;

use super::InputFocus;

pub fn format_usd(value: f64) -> String {
    format!("${:.2}", value)
}

/// Spread readout: signed percentage with four decimals, `--` without a quote.
pub fn format_spread(market: &MarketSnapshot) -> String {
    market
        .quote
        .as_ref()
        .and_then(|q| q.spread_pct())
        .map(|pct| format!("{:+.4}%", pct))
        .unwrap_or_else(|| "--".to_string())
}

pub struct TicketPanel<'a> {
    pub draft: &'a OrderDraft,
    pub account: &'a AccountSnapshot,
    pub market: &'a MarketSnapshot,
    pub focus: InputFocus,
    pub quantity_input: &'a str,
    pub submit_enabled: bool,
}

impl TicketPanel<'_> {
    fn tabs_line(&self) -> Line<'static> {
        let mut spans = Vec::new();
        for order_type in [OrderType::Market, OrderType::Limit] {
            let style = if order_type == self.draft.order_type() {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!(" {} ", order_type.tab_label()), style));
            spans.push(Span::raw(" "));
        }
        Line::from(spans)
    }

    fn label_line(label: &str, value: String, value_style: Style) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:<17}", label), Style::default().fg(Color::DarkGray)),
            Span::styled(value, value_style),
        ])
    }

    fn side_line(&self, side: OrderSide) -> Line<'static> {
        let submitting_this = matches!(
            self.draft.submission(),
            SubmissionState::Submitting { side: s, .. } if s == side
        );
        let label = if submitting_this {
            "SUBMITTING...".to_string()
        } else {
            side.to_string()
        };
        let price = match (&self.market.quote, self.market.loading) {
            (Some(q), false) => match side {
                OrderSide::Buy => format!("{}", q.ask),
                OrderSide::Sell => format!("{}", q.bid),
            },
            _ => "Loading...".to_string(),
        };
        let color = match side {
            OrderSide::Buy => Color::Green,
            OrderSide::Sell => Color::Red,
        };
        let style = if self.submit_enabled {
            Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Line::from(vec![
            Span::styled(format!(" {:<14}", label), style),
            Span::styled(format!(" {:>14} ", price), style),
        ])
    }
}

impl Widget for TicketPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Order Ticket ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        let Some(instrument) = self.market.instrument.as_ref() else {
            Paragraph::new(Line::from(Span::styled(
                "No pair selected",
                Style::default().fg(Color::Yellow),
            )))
            .block(block)
            .render(area, buf);
            return;
        };

        let white = Style::default().fg(Color::White);
        let mut lines = vec![
            self.tabs_line(),
            Line::from(""),
            Line::from(Span::styled(
                instrument.symbol.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Self::label_line("Balance", format_usd(self.account.balance), white),
            Self::label_line("Leverage", format!("1:{}", self.draft.leverage()), white),
            Self::label_line("Spread", format_spread(self.market), white),
            Self::label_line("Margin required", format_usd(self.draft.margin()), white),
        ];

        let quantity = if self.focus == InputFocus::Quantity {
            Span::styled(
                format!("{}_", self.quantity_input),
                Style::default().fg(Color::Yellow),
            )
        } else {
            Span::styled(format!("{:.2} USD", self.draft.quantity()), white)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<17}", "Quantity"), Style::default().fg(Color::DarkGray)),
            Span::styled("[-] ", Style::default().fg(Color::Yellow)),
            quantity,
            Span::styled(" [+]", Style::default().fg(Color::Yellow)),
        ]));

        if self.draft.order_type() == OrderType::Limit {
            let text = if self.focus == InputFocus::LimitPrice {
                Span::styled(
                    format!("{}_", self.draft.limit_price()),
                    Style::default().fg(Color::Yellow),
                )
            } else if self.draft.limit_price().is_empty() {
                Span::styled("Set Limit Price", Style::default().fg(Color::DarkGray))
            } else {
                Span::styled(self.draft.limit_price().to_string(), white)
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{:<17}", "Limit price"), Style::default().fg(Color::DarkGray)),
                text,
            ]));
        }

        lines.push(Line::from(""));
        if let Some(feedback) = self.draft.feedback() {
            let color = match feedback.kind {
                FeedbackKind::Error => Color::Red,
                FeedbackKind::Success => Color::Green,
            };
            lines.push(Line::from(Span::styled(
                feedback.text.clone(),
                Style::default().fg(color),
            )));
        }

        lines.push(self.side_line(OrderSide::Buy));
        lines.push(self.side_line(OrderSide::Sell));

        if let Some(advisory) = funding_advisory(self.account) {
            lines.push(Line::from(Span::styled(
                advisory,
                Style::default().fg(Color::Yellow),
            )));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

pub struct TransactionsPanel<'a> {
    page: &'a TransactionPage,
}

impl<'a> TransactionsPanel<'a> {
    pub fn new(page: &'a TransactionPage) -> Self {
        Self { page }
    }
}

impl Widget for TransactionsPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_height = area.height.saturating_sub(2) as usize;
        let lines: Vec<Line> = if self.page.rows.is_empty() {
            vec![Line::from(Span::styled(
                "No transactions",
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            self.page
                .rows
                .iter()
                .take(inner_height)
                .map(|row| {
                    let color = match row.side {
                        Some(OrderSide::Buy) => Color::Green,
                        Some(OrderSide::Sell) => Color::Red,
                        None => Color::White,
                    };
                    Line::from(Span::styled(
                        format_transaction_row(row),
                        Style::default().fg(color),
                    ))
                })
                .collect()
        };

        let block = Block::default()
            .title(format!(
                " Transactions {}/{} ",
                self.page.page,
                self.page.total_pages.max(1)
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_height = area.height.saturating_sub(2) as usize;
        let start = self.messages.len().saturating_sub(inner_height);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|msg| {
                let color = if msg.starts_with("[ERR]") {
                    Color::Red
                } else if msg.starts_with("[WARN]") {
                    Color::Yellow
                } else {
                    Color::White
                };
                Line::from(Span::styled(msg.as_str(), Style::default().fg(color)))
            })
            .collect();

        let block = Block::default()
            .title(" Log ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

pub struct StatusBar<'a> {
    pub market: &'a MarketSnapshot,
    pub account: &'a AccountSnapshot,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let symbol = self
            .market
            .instrument
            .as_ref()
            .map(|i| i.symbol.as_str())
            .unwrap_or("---");
        let feed = if self.market.loading || self.market.quote.is_none() {
            Span::styled("FEED LOADING", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("FEED LIVE", Style::default().fg(Color::Green))
        };

        let line = Line::from(vec![
            Span::styled(
                " order-ticket ",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled("| ", Style::default().fg(Color::DarkGray)),
            Span::styled(symbol, Style::default().fg(Color::Cyan)),
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            feed,
            Span::styled(" | ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!(
                    "bal {} cr {}",
                    format_usd(self.account.balance),
                    format_usd(self.account.credit)
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}

pub struct KeybindBar {
    pub editing: bool,
}

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key = Style::default().fg(Color::Yellow);
        let text = Style::default().fg(Color::DarkGray);
        let line = if self.editing {
            Line::from(vec![
                Span::styled(" [Enter]", key),
                Span::styled(" apply  ", text),
                Span::styled("[Esc]", key),
                Span::styled(" cancel  ", text),
                Span::styled("[Bksp]", key),
                Span::styled(" delete", text),
            ])
        } else {
            Line::from(vec![
                Span::styled(" [Q]", key),
                Span::styled("uit  ", text),
                Span::styled("[O]", key),
                Span::styled("pen/", text),
                Span::styled("[L]", key),
                Span::styled("imit  ", text),
                Span::styled("[+/-]", key),
                Span::styled(" qty  ", text),
                Span::styled("[Up/Dn]", key),
                Span::styled(" lev  ", text),
                Span::styled("[E]", key),
                Span::styled("dit  ", text),
                Span::styled("[P]", key),
                Span::styled("rice  ", text),
                Span::styled("[B]", key),
                Span::styled("uy  ", text),
                Span::styled("[S]", key),
                Span::styled("ell  ", text),
                Span::styled("[R]", key),
                Span::styled("efresh", text),
            ])
        };

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
