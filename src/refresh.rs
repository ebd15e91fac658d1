use std::sync::Arc;

use tokio::sync::mpsc;

use crate::broker::rest::BrokerRestClient;
use crate::coordinator::RefreshHooks;
use crate::event::AppEvent;

/// Refresh hooks backed by the broker REST client. Each request runs on its
/// own task and reports through the app event channel.
#[derive(Clone)]
pub struct BrokerRefreshHooks {
    client: Arc<BrokerRestClient>,
    app_tx: mpsc::Sender<AppEvent>,
}

impl BrokerRefreshHooks {
    pub fn new(client: Arc<BrokerRestClient>, app_tx: mpsc::Sender<AppEvent>) -> Self {
        Self { client, app_tx }
    }
}

impl RefreshHooks for BrokerRefreshHooks {
    fn refresh_profile(&self) {
        let client = self.client.clone();
        let tx = self.app_tx.clone();
        tokio::spawn(async move {
            let event = match client.fetch_profile().await {
                Ok(account) => AppEvent::AccountUpdate(account),
                Err(e) => {
                    tracing::warn!(error = %e, "Profile refresh failed");
                    AppEvent::Error(format!("Profile refresh failed: {:#}", e))
                }
            };
            let _ = tx.send(event).await;
        });
    }

    fn refresh_transactions(&self, page: u32) {
        let client = self.client.clone();
        let tx = self.app_tx.clone();
        tokio::spawn(async move {
            let event = match client.fetch_transactions(page).await {
                Ok(page) => AppEvent::TransactionsUpdate(page),
                Err(e) => {
                    tracing::warn!(page, error = %e, "Transaction refresh failed");
                    AppEvent::Error(format!("Transaction refresh failed: {:#}", e))
                }
            };
            let _ = tx.send(event).await;
        });
    }
}
