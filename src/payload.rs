use serde::Serialize;

use crate::error::ValidationError;
use crate::model::order::{OrderSide, OrderType};
use crate::model::quote::{FeedCategory, Instrument, PricedPair};
use crate::sizing::parse_amount;

/// Body of `POST /trade/{action}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRequest {
    pub meta_data: TradeMetaData,
    /// Order quantity in account currency.
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeMetaData {
    pub pair: String,
    pub leverage: u32,
    pub margin: f64,
    pub quantity: f64,
    pub order_type: OrderType,
    /// Entry price as text.
    #[serde(rename = "boughtAt")]
    pub bought_at: String,
    /// Filled in by the server.
    #[serde(rename = "profitLoss")]
    pub profit_loss: i64,
    #[serde(rename = "profitLossPercentage")]
    pub profit_loss_percentage: i64,
}

/// Successful response of the trade endpoint. Only its `message` is shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeAck {
    pub message: Option<String>,
}

/// Symbol as the trade endpoint expects it. Commodity symbols drop the
/// separator (`XAU/USD` -> `XAUUSD`); all others pass through.
pub fn wire_pair(instrument: &Instrument) -> String {
    match instrument.feed {
        FeedCategory::Commodity => instrument.symbol.replace('/', ""),
        _ => instrument.symbol.clone(),
    }
}

/// Entry price for the order: live ask/bid for market orders, the typed
/// limit price for limit orders.
pub fn resolve_entry_price(
    order_type: OrderType,
    side: OrderSide,
    quote: Option<&PricedPair>,
    limit_price: &str,
) -> Result<f64, ValidationError> {
    match order_type {
        OrderType::Market => {
            let quote = quote.ok_or(ValidationError::PriceUnavailable)?;
            let price = match side {
                OrderSide::Buy => quote.ask,
                OrderSide::Sell => quote.bid,
            };
            if !price.is_finite() || price <= 0.0 {
                return Err(ValidationError::PriceUnavailable);
            }
            Ok(price)
        }
        OrderType::Limit => {
            let price = parse_amount(limit_price);
            if price <= 0.0 {
                return Err(ValidationError::MissingLimitPrice);
            }
            Ok(price)
        }
    }
}

/// Shortest text that round-trips the price (`1.0850`, `2400`).
pub fn format_price(price: f64) -> String {
    format!("{}", price)
}

pub fn build_trade_request(
    instrument: &Instrument,
    order_type: OrderType,
    leverage: u32,
    quantity: f64,
    margin: f64,
    entry_price: f64,
) -> TradeRequest {
    TradeRequest {
        meta_data: TradeMetaData {
            pair: wire_pair(instrument),
            leverage,
            margin,
            quantity,
            order_type,
            bought_at: format_price(entry_price),
            profit_loss: 0,
            profit_loss_percentage: 0,
        },
        price: quantity,
    }
}
