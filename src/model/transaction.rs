use chrono::{DateTime, Utc};

use super::order::OrderSide;

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub id: String,
    pub pair: String,
    pub side: Option<OrderSide>,
    pub order_type: String,
    pub quantity: f64,
    pub margin: f64,
    pub leverage: u32,
    pub entry_price: Option<f64>,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of the trader's transaction history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPage {
    pub page: u32,
    pub total_pages: u32,
    pub rows: Vec<TransactionRow>,
}

impl TransactionPage {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

pub fn format_transaction_time(created_at: Option<DateTime<Utc>>) -> String {
    created_at
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "--:--".to_string())
}

pub fn format_transaction_row(row: &TransactionRow) -> String {
    let side = row.side.map(|s| s.to_string()).unwrap_or_else(|| "?".to_string());
    let price = row
        .entry_price
        .map(|p| format!("{}", p))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{} {:<4} {:<10} {:>10.2} 1:{:<3} @ {:<10} {}",
        format_transaction_time(row.created_at),
        side,
        row.pair,
        row.quantity,
        row.leverage,
        price,
        row.status
    )
}
