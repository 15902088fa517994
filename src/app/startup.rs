//! Process startup
//!
//! Resolve settings, start logging and the service, then either serve HTTP
//! until a shutdown signal or, with `--no-server`, wait for the repositories
//! given on the command line and exit.

use super::cli::Args;
use super::server;
use super::settings::Settings;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::{init_logging, LogSettings};
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::version::long_version;
use crate::fetcher::{FetchOutcome, FetchTicket};
use crate::service::Service;
use std::io::IsTerminal;
use std::process::ExitCode;
use tokio::net::TcpListener;

pub async fn run() -> ExitCode {
    let stdout_is_tty = std::io::stdout().is_terminal();
    let mut args = Args::parse_with_styles(stdout_is_tty);

    let loaded = args.apply_config_file().await;
    let settings = match loaded.and_then(|path| Ok((path, Settings::resolve(args, stdout_is_tty)?)))
    {
        Ok((path, settings)) => {
            if let Err(e) = init_logging(&settings.log) {
                eprintln!("depweight: failed to start logging: {}", e);
                return ExitCode::FAILURE;
            }
            if let Some(path) = path {
                log::debug!("loaded configuration from {}", path.display());
            }
            settings
        }
        Err(e) => {
            let _ = init_logging(&LogSettings::default());
            log_error_with_context(&e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    log::info!("depweight {} ({} environment)", long_version(), settings.environment);

    let reporters = match settings.reporters() {
        Ok(reporters) => reporters,
        Err(e) => {
            log::error!("FATAL: Could not set up reporters: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let service = match Service::start(
        settings.service.clone(),
        settings.clone_backend.build(),
        reporters,
    ) {
        Ok(service) => service,
        Err(e) => {
            log_error_with_context(&e, "Could not start the scan service");
            return ExitCode::FAILURE;
        }
    };

    let mut healthy = true;
    let mut tickets = Vec::new();
    for url in &settings.repos {
        match service.fetcher().retrieve_project(url) {
            Ok(ticket) => tickets.push(ticket),
            Err(e) => {
                log_error_with_context(&e, "Rejected repository URL");
                healthy = false;
            }
        }
    }

    if settings.serve {
        healthy &= serve(&settings, &service).await;
    } else {
        healthy &= await_fetches(tickets).await;
    }

    match service.stop(settings.environment.shutdown_grace()).await {
        Some(stats) if settings.serve => {
            log::info!("stopped after {} scans", stats.completed + stats.failed);
        }
        Some(stats) => healthy &= stats.failed == 0,
        None => healthy = false,
    }

    if healthy {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

async fn serve(settings: &Settings, service: &Service) -> bool {
    let shutdown = ShutdownCoordinator::new();
    shutdown.install_signal_handlers();

    let listener = match TcpListener::bind(settings.listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            log::error!("FATAL: Cannot listen on {}: {}", settings.listen_addr, e);
            return false;
        }
    };
    log::info!("listening on {}", settings.listen_addr);

    let router = server::router(service.fetcher().clone());
    match server::serve(listener, router, shutdown).await {
        Ok(()) => true,
        Err(e) => {
            log::error!("HTTP server failed: {}", e);
            false
        }
    }
}

/// One-shot mode: every submitted repository must reach the queue
async fn await_fetches(tickets: Vec<FetchTicket>) -> bool {
    let mut all_queued = true;
    for ticket in tickets {
        let folder = ticket.folder().to_string();
        match ticket.outcome().await {
            FetchOutcome::Queued(job) => log::debug!("'{}' queued as job {}", folder, job),
            FetchOutcome::Failed(e) => {
                log_error_with_context(&e, &format!("Could not fetch '{}'", folder));
                all_queued = false;
            }
            FetchOutcome::NotQueued(e) => {
                log::error!("'{}' was cloned but not queued: {}", folder, e);
                all_queued = false;
            }
        }
    }
    all_queued
}
