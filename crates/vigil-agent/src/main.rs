mod config;
mod runner;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use vigil_collector::Orchestrator;
use vigil_sender::{HttpSender, MockSender, MockSenderConfig, Sender};

use config::{AgentConfig, Mode, DEFAULT_CONFIG_PATH};
use runner::AgentLoop;

/// Installs the process-wide subscriber. Happens once, before any
/// concurrent component starts; the logger is read-only afterwards.
fn init_tracing(config: &AgentConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));
    let result = if config.log.pretty {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    };
    result.map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AgentConfig::load(&config_path)?;
    init_tracing(&config)?;

    tracing::info!(
        agent_id = %config.agent_id,
        mode = ?config.mode,
        interval_secs = config.interval_secs,
        "vigil-agent starting"
    );

    let sender: Box<dyn Sender> = match config.mode {
        Mode::Production => Box::new(HttpSender::new(
            &config.endpoint,
            &config.token,
            config.http_sender_config(),
        )?),
        Mode::Development => {
            tracing::info!("development mode: snapshots go to the local log");
            Box::new(MockSender::new(MockSenderConfig::default()))
        }
    };

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            tracing::info!("shutdown signal received");
            cancel.cancel();
        });
    }

    let mut agent = AgentLoop::new(
        config.agent_id.clone(),
        config.interval(),
        Orchestrator::new(),
        sender,
    );
    agent.run(cancel).await;

    tracing::info!("shutdown complete");
    Ok(())
}
