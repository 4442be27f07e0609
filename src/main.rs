use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

mod collector;
mod config;
mod handlers;
mod models;
mod routes;
mod scheduler;
mod snmp;
mod storage;

use collector::SnmpCollector;
use config::{AppConfig, StoreKind};
use snmp::SnmpConnector;
use storage::{JsonLinesStore, MemoryStore, ReadStore, Sink};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Конфигурация читается один раз и дальше только передается
    let config = AppConfig::load()?;
    config.debug_config();

    let (sink, reader) = open_store(&config)?;
    let shutdown = CancellationToken::new();

    let http = match &config.http_addr {
        Some(addr) => Some(serve_http(addr, reader, shutdown.clone()).await?),
        None => None,
    };

    let connector = Arc::new(SnmpConnector::new(
        config.community.as_bytes().to_vec(),
        config.port,
        config.timeout,
    ));
    let collector = Arc::new(SnmpCollector::new(
        config.targets.clone(),
        connector,
        sink,
        config.walk_page,
    ));

    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("получен сигнал остановки");
        }
        signal.cancel();
    });

    let polled = match scheduler::start(&config, collector, shutdown.clone()) {
        Some(handle) => handle.await.context("задача планировщика упала")?,
        None => {
            shutdown.cancelled().await;
            Ok(())
        }
    };

    shutdown.cancel();
    if let Some(http) = http {
        http.await.context("HTTP сервер упал")??;
    }

    // Зависший цикл опроса завершает процесс с ошибкой
    polled?;
    Ok(())
}

fn open_store(config: &AppConfig) -> Result<(Arc<dyn Sink>, Arc<dyn ReadStore>)> {
    match config.store {
        StoreKind::Jsonl => {
            let store = Arc::new(
                JsonLinesStore::open(config.data_dir.clone()).context(format!(
                    "Не удалось открыть хранилище {}",
                    config.data_dir.display()
                ))?,
            );
            tracing::info!(dir = %store.dir().display(), "JSON-lines хранилище");

            let sink: Arc<dyn Sink> = store.clone();
            let reader: Arc<dyn ReadStore> = store;
            Ok((sink, reader))
        }
        StoreKind::Memory => {
            let store = Arc::new(MemoryStore::new());
            let sink: Arc<dyn Sink> = store.clone();
            let reader: Arc<dyn ReadStore> = store;
            Ok((sink, reader))
        }
    }
}

async fn serve_http(
    addr: &str,
    store: Arc<dyn ReadStore>,
    shutdown: CancellationToken,
) -> Result<tokio::task::JoinHandle<Result<()>>> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Не удалось занять адрес {}", addr))?;
    tracing::info!(addr = %addr, "HTTP API запущен");

    let app = routes::create_router(store);
    Ok(tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .context("HTTP сервер завершился с ошибкой")
    }))
}
