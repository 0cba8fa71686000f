mod api;
mod clock;
mod mdns;
mod scene;
mod state;
mod watchdog;
mod worker;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::{net::TcpListener, sync::Mutex};
use tracing::{info, warn};

use scenekick_common::{Journal, RequestMailbox, RuntimeConfig, SceneDirectory, ScheduleTable};

use crate::{
    clock::Clock,
    scene::VendorSceneClient,
    state::{AppState, AppStore},
    watchdog::Watchdog,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let store = AppStore::new();
    let mut config = store.load_config().await.unwrap_or_else(|err| {
        warn!("failed to load config from store: {err:#}");
        RuntimeConfig::default()
    });
    config.sanitize();

    let clock = Arc::new(Clock::new(&config.network));
    let mut journal = Journal::default();

    // The device is not time-valid until the first resync succeeds; nothing
    // else starts before then.
    let now = clock.sync_until_valid().await;
    journal.record(now, "Clock adjusted from NTP.");
    journal.record(
        clock.now(),
        format!("Boot complete, hostname {}", config.network.hostname),
    );

    let directory = match store.load_directory().await {
        Ok(Some(directory)) => {
            journal.record(clock.now(), "Scene directory loaded.");
            directory
        }
        Ok(None) => {
            journal.record(clock.now(), "No scene directory");
            SceneDirectory::default()
        }
        Err(err) => {
            warn!("scene directory unreadable, starting empty: {err:#}");
            journal.record(clock.now(), "No scene directory");
            SceneDirectory::default()
        }
    };

    let table = match store.load_schedule().await {
        Ok(Some(table)) => {
            journal.record(clock.now(), "Configuration loaded.");
            table
        }
        Ok(None) => {
            journal.record(clock.now(), "No configuration");
            ScheduleTable::default()
        }
        Err(err) => {
            warn!("schedule table unreadable, starting empty: {err:#}");
            journal.record(clock.now(), "No configuration");
            ScheduleTable::default()
        }
    };

    let executor = Arc::new(VendorSceneClient::new(&config.vendor)?);

    let state = AppState {
        config: Arc::new(config),
        table: Arc::new(Mutex::new(table)),
        directory: Arc::new(Mutex::new(directory)),
        journal: Arc::new(Mutex::new(journal)),
        mailbox: Arc::new(Mutex::new(RequestMailbox::default())),
        clock,
        executor,
        store,
    };

    let watchdog = Watchdog::new();
    watchdog.feed();
    watchdog.spawn_monitor();

    worker::spawn(state.clone(), watchdog);
    mdns::spawn(state.clone());

    let port = std::env::var("SCENEKICK_HTTP_PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(state.config.network.http_port);
    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind configuration server at {addr}"))?;

    state.journal_record("Start web server").await;
    info!("configuration interface on http://{addr}");
    axum::serve(listener, api::router(state)).await?;
    Ok(())
}
