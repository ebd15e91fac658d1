use std::fmt;
use std::str::FromStr;

use anyhow::bail;

/// Price feed the selected instrument belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedCategory {
    Forex,
    Crypto,
    Commodity,
    Stocks,
    Indices,
}

impl FeedCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedCategory::Forex => "forex",
            FeedCategory::Crypto => "crypto",
            FeedCategory::Commodity => "commodity",
            FeedCategory::Stocks => "stocks",
            FeedCategory::Indices => "indices",
        }
    }
}

impl FromStr for FeedCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forex" | "fx" => Ok(FeedCategory::Forex),
            "crypto" => Ok(FeedCategory::Crypto),
            "commodity" | "commodities" => Ok(FeedCategory::Commodity),
            "stocks" | "stock" => Ok(FeedCategory::Stocks),
            "indices" | "index" => Ok(FeedCategory::Indices),
            other => bail!(
                "unknown feed category '{}', expected one of forex/crypto/commodity/stocks/indices",
                other
            ),
        }
    }
}

impl fmt::Display for FeedCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instrument {
    /// Display symbol, e.g. `EUR/USD` or `XAU/USD`.
    pub symbol: String,
    pub feed: FeedCategory,
}

impl Instrument {
    pub fn new(symbol: &str, feed: FeedCategory) -> Self {
        Self {
            symbol: symbol.trim().to_string(),
            feed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricedPair {
    pub bid: f64,
    pub ask: f64,
}

impl PricedPair {
    pub fn new(bid: f64, ask: f64) -> Self {
        Self { bid, ask }
    }

    pub fn mid(&self) -> f64 {
        (self.bid + self.ask) / 2.0
    }

    /// Bid/ask spread as a percentage of mid. `None` until both sides are quoted.
    pub fn spread_pct(&self) -> Option<f64> {
        if self.bid <= 0.0 || self.ask <= 0.0 {
            return None;
        }
        Some((self.ask - self.bid) / self.mid() * 100.0)
    }
}

/// Everything the ticket reads from the market side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketSnapshot {
    pub instrument: Option<Instrument>,
    pub quote: Option<PricedPair>,
    /// Instrument feed is still warming up.
    pub loading: bool,
}

impl MarketSnapshot {
    pub fn new(instrument: Instrument, quote: Option<PricedPair>) -> Self {
        Self {
            instrument: Some(instrument),
            quote,
            loading: false,
        }
    }

    pub fn has_pair(&self) -> bool {
        self.instrument.is_some()
    }
}
