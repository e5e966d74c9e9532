//! Slackernetes: a Slack bot answering read-only Kubernetes questions.
//!
//! Connects to Slack via outbound WebSocket (Socket Mode), listens for
//! messages that start with a mention of the bot, and answers them with pod,
//! namespace, log and description queries against the cluster it runs in.

mod config;
mod dispatch;
mod error;
mod handlers;
mod slack_client;
mod socket;
mod telemetry;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::Context;
use slackernetes_core::{BotIdentity, KubeCluster, Router, builtin_commands};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::slack_client::SlackClient;
use crate::telemetry::ProcessState;

/// Capacity of the queue between the socket reader and the command consumer.
const ENVELOPE_QUEUE_CAPACITY: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(telemetry::env_filter(&config.log_level)?)
        .init();

    info!(?config, "Configuration loaded successfully");
    telemetry::record_lifecycle(ProcessState::Start);

    let result = run(config).await;

    telemetry::record_lifecycle(ProcessState::Stop);
    result
}

/// Resolves the bot identity, connects to the cluster and serves Slack
/// until a shutdown signal arrives.
async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let slack = SlackClient::new(config.slack.bot_token.clone());
    let bot_user_id = slack
        .auth_test()
        .await
        .context("Failed to resolve bot identity")?;
    let identity = BotIdentity::new(bot_user_id);
    info!(bot_user_id = identity.user_id(), "Bot identity resolved");

    let cluster = KubeCluster::connect()
        .await
        .context("Failed to connect to the Kubernetes cluster")?;
    info!(?cluster, "Kubernetes client ready");

    let table = builtin_commands().context("Failed to build command table")?;
    info!(command_count = table.len(), "Command table registered");

    let router = Arc::new(Router::new(identity, table, cluster, slack.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        let _ = shutdown_tx.send(true);
    });

    let (queue_tx, queue_rx) = mpsc::channel(ENVELOPE_QUEUE_CAPACITY);
    let consumer = tokio::spawn(dispatch::consume(router, queue_rx));

    info!("Starting Socket Mode connection...");
    let socket = socket::SocketClient::new(config.slack.app_token.clone(), slack);
    let outcome = socket.run(queue_tx, shutdown_rx).await;

    // `run` dropped the sender; the consumer works through every envelope
    // still queued, then returns.
    if let Err(e) = consumer.await {
        warn!(error = %e, "Envelope consumer task failed");
    }

    outcome.context("Socket Mode event loop failed")?;
    info!("Server shut down cleanly");
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on Unix.
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received SIGINT, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
                return;
            }
            Err(e) => warn!(error = %e, "Could not register SIGTERM handler"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for SIGINT");
        std::future::pending::<()>().await;
    }
    info!("Received SIGINT, shutting down...");
}
