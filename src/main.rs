//! # Main Entry Point
//!
//! Wires the bot together:
//! - Domain: Configuration and Types
//! - Infrastructure: Matrix transport, HTTP webhooks
//! - Application: Access tables, Membership store, Invite/Message handlers, Event loop
//!

mod application;
mod domain;
mod infrastructure;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_sdk::config::SyncSettings;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;

use crate::application::access;
use crate::application::dispatcher::MessageDispatcher;
use crate::application::event_loop::{self, EventLoop};
use crate::application::invite::InviteHandler;
use crate::application::membership::MembershipStore;
use crate::domain::config::AppConfig;
use crate::domain::paths;
use crate::domain::traits::ChatTransport;
use crate::infrastructure::matrix::MatrixTransport;
use crate::infrastructure::webhook::HttpWebhookInvoker;
use crate::strings::logs;

/// Relays whitelisted Matrix chat commands to webhooks.
#[derive(Parser, Debug)]
#[command(name = "webhook-b0t", version)]
struct Cli {
    /// Path to config.yaml. joined-rooms.txt is kept in the same directory.
    #[arg(short, long, env = "CONFIG_PATH", default_value = paths::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Validate the configuration and membership file, then exit without connecting.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config = AppConfig::load(&cli.config)?;

    // 2. Logging Setup
    let _guard = application::logging::init(&config.logging)?;
    tracing::info!("{}", logs::config_loaded(&cli.config.display().to_string()));

    // 3. Static tables and persisted membership
    let tables = access::build(&config);
    tracing::info!("{}", logs::tables_built(tables.0.len(), tables.1.len()));

    let membership = MembershipStore::load(&paths::joined_rooms_path(&cli.config))?;
    tracing::info!(
        "{}",
        logs::membership_loaded(
            membership.rooms().len(),
            &membership.path().display().to_string()
        )
    );

    if cli.check {
        return Ok(());
    }

    // 4. Matrix Setup
    let transport = Arc::new(MatrixTransport::connect(&config).await?);

    for room_id in membership.rooms() {
        tracing::info!("{}", logs::rejoining(room_id));
        transport
            .join_room(room_id)
            .await
            .with_context(|| format!("Failed to rejoin room {room_id}"))?;
    }

    // 5. Handlers and Event Loop
    let webhooks = Arc::new(HttpWebhookInvoker::new(Duration::from_secs(
        config.webhook.timeout_secs,
    ))?);
    let dispatcher = MessageDispatcher::new(
        config.matrix.command_prefix.clone(),
        config.acknowledgement().map(str::to_string),
        tables,
        transport.clone(),
        webhooks,
    );
    let invites = InviteHandler::new(transport.clone(), membership);

    let (tx, rx) = mpsc::unbounded_channel();
    let handlers = transport.forward_events(tx, SystemTime::now());
    let events_task = tokio::spawn(EventLoop::new(invites, dispatcher).run(rx));

    // 6. Sync until the transport gives up or we are told to stop
    tracing::info!("{}", logs::SYNC_LOOP_START);
    let client = transport.client().clone();
    let result = tokio::select! {
        res = client.sync(SyncSettings::default()) => match res {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::error!("{}", logs::sync_loop_fail(&e.to_string()));
                Err(e).context("Matrix sync loop stopped")
            }
        },
        _ = shutdown_signal() => {
            tracing::info!("{}", logs::SHUTDOWN);
            Ok(())
        }
    };

    // 7. Close the event stream and let a running webhook call finish
    transport.stop_forwarding(handlers);
    let grace = Duration::from_secs(config.webhook.timeout_secs) + SHUTDOWN_SEND_GRACE;
    event_loop::drain(events_task, grace).await;

    result
}

/// Time left for the acknowledgement after the webhook timeout has been spent.
const SHUTDOWN_SEND_GRACE: Duration = Duration::from_secs(5);

/// Resolves on ctrl-c. If the signal cannot be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("{}", logs::shutdown_fail(&e.to_string()));
        std::future::pending::<()>().await;
    }
}
