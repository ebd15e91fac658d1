use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use tokio::sync::{mpsc, watch};

use order_ticket::broker::rest::BrokerRestClient;
use order_ticket::config::Config;
use order_ticket::coordinator::SubmissionCoordinator;
use order_ticket::event::{event_channels, AppEvent};
use order_ticket::input::{parse_edit_command, parse_main_command};
use order_ticket::model::account::AccountSnapshot;
use order_ticket::model::quote::Instrument;
use order_ticket::payload::wire_pair;
use order_ticket::refresh::BrokerRefreshHooks;
use order_ticket::ui::{self, AppState};
use order_ticket::ui_handlers::{dispatch_effect, handle_edit_command, handle_main_command, Effect};

fn spawn_quote_poller(
    client: Arc<BrokerRestClient>,
    instrument: Instrument,
    poll_every: Duration,
    app_tx: mpsc::Sender<AppEvent>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let pair = wire_pair(&instrument);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(poll_every);
        let mut last_error: Option<String> = None;
        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown_rx.changed() => break,
            }
            match client.fetch_quote(&pair).await {
                Ok(quote) => {
                    if last_error.take().is_some() {
                        tracing::info!(pair = %pair, "Quote feed recovered");
                        let _ = app_tx
                            .send(AppEvent::LogMessage(format!("Quote feed for {} recovered", pair)))
                            .await;
                    }
                    if app_tx
                        .send(AppEvent::QuoteUpdate {
                            pair: pair.clone(),
                            quote,
                        })
                        .await
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    let msg = format!("{:#}", e);
                    // Only surface a repeated failure once.
                    if last_error.as_deref() != Some(msg.as_str()) {
                        tracing::warn!(pair = %pair, error = %msg, "Quote poll failed");
                        let _ = app_tx.send(AppEvent::Error(format!("Quote: {}", msg))).await;
                        last_error = Some(msg);
                    }
                }
            }
        }
        tracing::debug!(pair = %pair, "Quote poller stopped");
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("failed to install rustls crypto provider"))?;

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Set ORDER_TICKET_CONFIG or provide config/default.toml");
            std::process::exit(1);
        }
    };

    // Log to a file so it doesn't interfere with the TUI
    let log_file = std::fs::File::create("order-ticket.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    let instrument = config.instrument.instrument()?;
    tracing::info!(
        base_url = %config.broker.base_url,
        symbol = %instrument.symbol,
        feed = %instrument.feed,
        "Starting order-ticket"
    );
    if config.broker.auth_token.is_none() {
        tracing::warn!("ORDER_TICKET_AUTH_TOKEN not set; broker requests are unauthenticated");
    }

    let client = Arc::new(
        BrokerRestClient::new(&config.broker).context("failed to create broker client")?,
    );
    let (senders, mut receivers) = event_channels(256);
    let app_tx = senders.app_tx.clone();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let account = match client.fetch_profile().await {
        Ok(account) => account,
        Err(e) => {
            tracing::warn!(error = %format!("{:#}", e), "Initial profile fetch failed");
            let _ = app_tx
                .send(AppEvent::Error(format!("Profile: {:#}", e)))
                .await;
            AccountSnapshot::default()
        }
    };

    let hooks = BrokerRefreshHooks::new(client.clone(), app_tx.clone());
    let coordinator = SubmissionCoordinator::new(client.clone(), hooks);
    dispatch_effect(Effect::FetchTransactions { page: 1 }, &coordinator, &senders);

    spawn_quote_poller(
        client.clone(),
        instrument.clone(),
        Duration::from_millis(config.ui.quote_poll_ms.max(1)),
        app_tx.clone(),
        shutdown_rx.clone(),
    );

    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = ctrl_c_shutdown.send(true);
    });

    let mut app_state = AppState::new(account, Some(instrument.clone()), &config.ticket);
    app_state.push_log(format!("order-ticket started | {}", instrument.symbol));

    let mut terminal = ratatui::init();
    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| ui::render(frame, &app_state)) {
            break Err(e.into());
        }

        match crossterm::event::poll(Duration::from_millis(config.ui.refresh_rate_ms)) {
            Ok(true) => match crossterm::event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    let effects = if app_state.is_editing() {
                        parse_edit_command(&key.code)
                            .map(|cmd| handle_edit_command(cmd, &mut app_state))
                            .unwrap_or_default()
                    } else if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q')) {
                        tracing::info!("User quit");
                        let _ = shutdown_tx.send(true);
                        break Ok(());
                    } else {
                        parse_main_command(&key.code)
                            .map(|cmd| handle_main_command(cmd, &mut app_state))
                            .unwrap_or_default()
                    };
                    for effect in effects {
                        dispatch_effect(effect, &coordinator, &senders);
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }

        while let Some(event) = receivers.try_next() {
            for effect in app_state.apply(event) {
                dispatch_effect(effect, &coordinator, &senders);
            }
        }

        if *shutdown_rx.borrow() {
            break Ok(());
        }
    };

    ratatui::restore();
    tracing::info!("Shutdown complete");
    println!("Goodbye! Check order-ticket.log for details.");
    result
}
