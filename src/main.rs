// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::Context;
use clap::{Parser, Subcommand};
use media_discovery::app::{create_router, AppState, VERSION};
use media_discovery::error::DiscoveryError;
use media_discovery::models::settings::Settings;
use media_discovery::services::backend::{connect_backend, SearchBackend};
use media_discovery::services::event_worker::{event_queue, EventWorker};
use media_discovery::services::logging::init_tracing;
use media_discovery::services::metadata_client::CmsClient;
use media_discovery::services::reindex::{ReindexOptions, ReindexOrchestrator};
use media_discovery::services::search_service::SearchService;
use media_discovery::services::synchronizer::IndexSynchronizer;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "media-discovery", version = VERSION, about = "Full-text search over CMS media metadata")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    settings: Settings,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API and the media event worker (default)
    Serve,
    /// Rebuild the search index from the CMS once and exit
    Reindex,
    /// Create the search index schema or settings on the configured backend
    Migrate,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.settings.log_level);

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cli.settings).await,
        Command::Reindex => reindex_once(cli.settings).await,
        Command::Migrate => migrate(cli.settings).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "media-discovery failed");
            ExitCode::FAILURE
        }
    }
}

/// Wire the search service around `backend`
fn build_service(
    settings: &Settings,
    backend: Arc<dyn SearchBackend>,
) -> anyhow::Result<SearchService> {
    let cms = CmsClient::new(&settings.cms_base_url, settings.cms_timeout())
        .context("invalid CMS_BASE_URL")?;

    let reindexer = ReindexOrchestrator::new(
        Arc::new(cms),
        backend.clone(),
        ReindexOptions {
            batch_size: settings.reindex_batch_size,
            scan_timeout: settings.reindex_timeout(),
        },
    );

    Ok(SearchService::new(backend, reindexer))
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let backend = connect_backend(&settings).await?;
    backend
        .prepare()
        .await
        .context("failed to prepare search backend")?;

    let search_service = Arc::new(build_service(&settings, backend.clone())?);

    let (publisher, receiver) = event_queue(settings.event_queue_capacity);
    let worker = EventWorker::new(receiver, IndexSynchronizer::new(backend.clone()));
    let worker_handle = tokio::spawn(worker.start());

    let app = create_router(AppState {
        search_service,
        publisher,
    });

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;

    tracing::info!(
        version = VERSION,
        addr = %settings.bind_addr,
        backend = backend.name(),
        "media-discovery listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    // The router held the last publisher, so the worker drains what is queued and stops
    if let Err(e) = worker_handle.await {
        tracing::warn!(error = %e, "media event worker ended abnormally");
    }
    backend.shutdown().await;
    Ok(())
}

async fn reindex_once(settings: Settings) -> anyhow::Result<()> {
    let backend = connect_backend(&settings).await?;
    backend
        .prepare()
        .await
        .context("failed to prepare search backend")?;

    let service = build_service(&settings, backend.clone())?;
    let outcome = service.reindex().await;
    backend.shutdown().await;

    match outcome {
        Ok(report) => {
            tracing::info!(
                indexed = report.indexed,
                skipped = report.skipped,
                pages = report.pages,
                duration_ms = report.duration_ms,
                "reindex finished"
            );
            Ok(())
        }
        Err(e @ DiscoveryError::PartialIndexInconsistency { .. }) => {
            tracing::error!(error = %e, "search index is EMPTY after a failed bulk replace, run `media-discovery reindex` again");
            Err(e.into())
        }
        Err(e) => Err(anyhow::Error::new(e).context("reindex failed, search index unchanged")),
    }
}

async fn migrate(settings: Settings) -> anyhow::Result<()> {
    let backend = connect_backend(&settings).await?;
    let prepared = backend.prepare().await;
    backend.shutdown().await;

    prepared.with_context(|| format!("failed to prepare {} backend", backend.name()))?;
    tracing::info!(backend = backend.name(), "search backend prepared");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
