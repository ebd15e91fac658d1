use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::model::account::AccountSnapshot;
use crate::model::order::OrderSide;
use crate::model::quote::PricedPair;
use crate::model::transaction::{TransactionPage, TransactionRow};

/// Accept a JSON number, a numeric string, or null (read as 0).
pub fn string_or_number_to_f64_default<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    match v {
        serde_json::Value::Null => Ok(0.0),
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("invalid number")),
        _ => Err(serde::de::Error::custom("invalid numeric value")),
    }
}

/// Accept a JSON string or number as an identifier.
pub fn string_or_number_to_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    match v {
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => Err(serde::de::Error::custom("invalid identifier")),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileBody {
    #[serde(default, deserialize_with = "string_or_number_to_f64_default")]
    pub balance: f64,
    #[serde(default, deserialize_with = "string_or_number_to_f64_default")]
    pub credit: f64,
    #[serde(default)]
    pub access: bool,
}

/// Profile endpoint payload, either `{"user": {...}}` or the bare object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProfileResponse {
    Wrapped { user: ProfileBody },
    Flat(ProfileBody),
}

impl ProfileResponse {
    pub fn into_snapshot(self) -> AccountSnapshot {
        let body = match self {
            ProfileResponse::Wrapped { user } => user,
            ProfileResponse::Flat(body) => body,
        };
        AccountSnapshot {
            balance: body.balance,
            credit: body.credit,
            access: body.access,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionMeta {
    #[serde(default)]
    pub pair: String,
    #[serde(default, deserialize_with = "string_or_number_to_f64_default")]
    pub leverage: f64,
    #[serde(default, deserialize_with = "string_or_number_to_f64_default")]
    pub margin: f64,
    #[serde(default, deserialize_with = "string_or_number_to_f64_default")]
    pub quantity: f64,
    #[serde(default)]
    pub order_type: Option<String>,
    #[serde(
        default,
        rename = "boughtAt",
        deserialize_with = "string_or_number_to_f64_default"
    )]
    pub bought_at: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRecord {
    #[serde(default, alias = "_id", deserialize_with = "string_or_number_to_string")]
    pub id: String,
    #[serde(default, rename = "type", alias = "action")]
    pub action: Option<String>,
    #[serde(default)]
    pub meta_data: TransactionMeta,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "createdAt", alias = "created_at")]
    pub created_at: Option<String>,
}

impl TransactionRecord {
    pub fn into_row(self) -> TransactionRow {
        let side = match self.action.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("buy") => Some(OrderSide::Buy),
            Some("sell") => Some(OrderSide::Sell),
            _ => None,
        };
        let created_at = self
            .created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        let meta = self.meta_data;
        TransactionRow {
            id: self.id,
            pair: meta.pair,
            side,
            order_type: meta.order_type.unwrap_or_else(|| "market".to_string()),
            quantity: meta.quantity,
            margin: meta.margin,
            leverage: meta.leverage.max(0.0).round() as u32,
            entry_price: (meta.bought_at > 0.0).then_some(meta.bought_at),
            status: self.status.unwrap_or_else(|| "open".to_string()),
            created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionsResponse {
    #[serde(default, alias = "trades", alias = "data")]
    pub transactions: Vec<TransactionRecord>,
    #[serde(default, alias = "currentPage")]
    pub page: Option<u32>,
    #[serde(default, alias = "totalPages")]
    pub total_pages: Option<u32>,
}

impl TransactionsResponse {
    pub fn into_page(self, requested_page: u32) -> TransactionPage {
        let page = self.page.unwrap_or(requested_page);
        TransactionPage {
            page,
            total_pages: self.total_pages.unwrap_or(page).max(page),
            rows: self
                .transactions
                .into_iter()
                .map(TransactionRecord::into_row)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuoteResponse {
    #[serde(deserialize_with = "string_or_number_to_f64_default")]
    pub bid: f64,
    #[serde(deserialize_with = "string_or_number_to_f64_default")]
    pub ask: f64,
}

impl From<QuoteResponse> for PricedPair {
    fn from(q: QuoteResponse) -> Self {
        PricedPair::new(q.bid, q.ask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_accepts_wrapped_and_string_numbers() {
        let wrapped: ProfileResponse =
            serde_json::from_str(r#"{"user":{"balance":"250.5","credit":100,"access":true}}"#)
                .unwrap();
        let snap = wrapped.into_snapshot();
        assert!((snap.balance - 250.5).abs() < f64::EPSILON);
        assert!((snap.credit - 100.0).abs() < f64::EPSILON);
        assert!(snap.access);

        let flat: ProfileResponse = serde_json::from_str(r#"{"balance":10}"#).unwrap();
        let snap = flat.into_snapshot();
        assert_eq!(snap.credit, 0.0);
        assert!(!snap.access);
    }

    #[test]
    fn transaction_record_maps_to_row() {
        let json = r#"{
            "transactions": [{
                "_id": "66a1",
                "type": "SELL",
                "meta_data": {"pair": "XAUUSD", "leverage": 30, "margin": 50, "quantity": "1500", "order_type": "limit", "boughtAt": "2400.5"},
                "status": "open",
                "createdAt": "2025-03-01T10:15:00Z"
            }],
            "totalPages": 3
        }"#;
        let resp: TransactionsResponse = serde_json::from_str(json).unwrap();
        let page = resp.into_page(2);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);
        let row = &page.rows[0];
        assert_eq!(row.id, "66a1");
        assert_eq!(row.side, Some(OrderSide::Sell));
        assert_eq!(row.leverage, 30);
        assert_eq!(row.order_type, "limit");
        assert_eq!(row.entry_price, Some(2400.5));
        assert!(row.created_at.is_some());
    }
}
