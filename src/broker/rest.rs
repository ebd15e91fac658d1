use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::BrokerConfig;
use crate::coordinator::{SubmitResult, TradeGateway};
use crate::error::{AppError, SubmitError};
use crate::model::account::AccountSnapshot;
use crate::model::order::OrderSide;
use crate::model::quote::PricedPair;
use crate::model::transaction::TransactionPage;
use crate::payload::{TradeAck, TradeRequest};

use super::types::{ProfileResponse, QuoteResponse, TransactionsResponse};

pub struct BrokerRestClient {
    http: reqwest::Client,
    base_url: String,
    profile_path: String,
    transactions_path: String,
    quote_path: String,
}

fn message_field(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

impl BrokerRestClient {
    pub fn new(config: &BrokerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = config.auth_token.as_deref() {
            headers.insert(
                COOKIE,
                HeaderValue::from_str(&format!("auth_token={}", token))
                    .context("auth token contains characters not allowed in a header")?,
            );
        }
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()
            .context("failed to build broker HTTP client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            profile_path: config.profile_path.clone(),
            transactions_path: config.transactions_path.clone(),
            quote_path: config.quote_path.clone(),
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn compact_error_body(body: &str) -> String {
        let normalized = body.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.chars().count() > 180 {
            format!("{}...", normalized.chars().take(180).collect::<String>())
        } else {
            normalized
        }
    }

    /// `POST /trade/{buy|sell}`.
    ///
    /// Non-2xx responses become [`SubmitError::Backend`] carrying the body's
    /// `message`; connection failures and unreadable bodies become
    /// [`SubmitError::Transport`].
    pub async fn post_trade(&self, side: OrderSide, request: &TradeRequest) -> SubmitResult {
        let url = self.endpoint(&format!("trade/{}", side.as_path_str()));

        tracing::info!(
            url = %url,
            side = %side,
            pair = %request.meta_data.pair,
            quantity = request.meta_data.quantity,
            order_type = %request.meta_data.order_type,
            "Placing trade"
        );

        let resp = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(side = %side, error = %e, "Trade request transport failure");
                SubmitError::Transport(e.to_string())
            })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SubmitError::Transport(format!("failed to read trade response: {}", e)))?;
        let parsed = serde_json::from_str::<Value>(&body);

        if !status.is_success() {
            let message = parsed.as_ref().ok().and_then(message_field);
            tracing::warn!(
                side = %side,
                status = status.as_u16(),
                body = %Self::compact_error_body(&body),
                "Trade rejected by broker"
            );
            return Err(SubmitError::Backend {
                side,
                status: status.as_u16(),
                message,
            });
        }

        let body = parsed.map_err(|e| {
            tracing::warn!(side = %side, error = %e, "Trade response is not JSON");
            SubmitError::Transport(format!("invalid trade response: {}", e))
        })?;
        let ack = TradeAck {
            message: message_field(&body),
        };
        tracing::info!(side = %side, message = ?ack.message, "Trade response received");
        Ok(ack)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let resp = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let msg = serde_json::from_str::<Value>(&body)
                .ok()
                .as_ref()
                .and_then(message_field)
                .unwrap_or_else(|| Self::compact_error_body(&body));
            return Err(AppError::BrokerApi {
                status: status.as_u16(),
                msg,
            }
            .into());
        }

        let body = resp.text().await.map_err(AppError::from)?;
        let parsed = serde_json::from_str::<T>(&body).map_err(AppError::from)?;
        Ok(parsed)
    }

    pub async fn fetch_profile(&self) -> Result<AccountSnapshot> {
        let url = self.endpoint(&self.profile_path);
        let profile: ProfileResponse = self
            .get_json(&url, &[])
            .await
            .context("profile fetch failed")?;
        let snapshot = profile.into_snapshot();
        tracing::info!(
            balance = snapshot.balance,
            credit = snapshot.credit,
            access = snapshot.access,
            "Profile refreshed"
        );
        Ok(snapshot)
    }

    pub async fn fetch_transactions(&self, page: u32) -> Result<TransactionPage> {
        let url = self.endpoint(&self.transactions_path);
        let resp: TransactionsResponse = self
            .get_json(&url, &[("page", page.to_string())])
            .await
            .with_context(|| format!("transaction page {} fetch failed", page))?;
        let page = resp.into_page(page);
        tracing::debug!(page = page.page, rows = page.rows.len(), "Transactions refreshed");
        Ok(page)
    }

    pub async fn fetch_quote(&self, pair: &str) -> Result<PricedPair> {
        let url = self.endpoint(&self.quote_path);
        let quote: QuoteResponse = self
            .get_json(&url, &[("pair", pair.to_string())])
            .await
            .with_context(|| format!("quote fetch for {} failed", pair))?;
        Ok(quote.into())
    }
}

impl TradeGateway for BrokerRestClient {
    async fn place_trade(&self, side: OrderSide, request: &TradeRequest) -> SubmitResult {
        self.post_trade(side, request).await
    }
}
