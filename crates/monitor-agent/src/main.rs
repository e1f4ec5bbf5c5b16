//! Monitor agent CLI
//!
//! Reads one JSON message per line (from `--input` or stdin), runs each
//! through the monitor, and prints every status update and artifact as a
//! JSON line on stdout. Once input ends the task is closed with a single
//! final `completed` update. Logs go to stderr.
//!
//! ```bash
//! GEMINI_API_KEY=... monitor-agent --input turns.jsonl
//! RUST_LOG=debug monitor-agent --threshold 70 --peer http://localhost:9009/ < turns.jsonl
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use coordination::{ChannelStatusSink, Message, StatusSink, StatusUpdate};
use monitor_agent::{MonitorAgent, MonitorConfig, TurnOutcome};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file (overrides environment defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON-lines file of messages (defaults to stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Model id (overrides MONITOR_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Win threshold percentage
    #[arg(long)]
    threshold: Option<f64>,

    /// Peer URL to poll for messages without a sender (repeatable)
    #[arg(long = "peer")]
    peers: Vec<String>,

    /// Do not emit the raw evaluator text
    #[arg(long, default_value_t = false)]
    no_raw: bool,
}

impl Args {
    fn into_config(self) -> Result<(MonitorConfig, Option<PathBuf>)> {
        let mut config = match self.config {
            Some(ref path) => MonitorConfig::from_file(path)?,
            None => MonitorConfig::from_env(),
        };
        if let Some(model) = self.model {
            config.model = model;
        }
        if let Some(threshold) = self.threshold {
            config.win_threshold = threshold;
        }
        if !self.peers.is_empty() {
            config.peer_urls = self.peers;
        }
        if self.no_raw {
            config.emit_raw_evaluation = false;
        }
        Ok((config, self.input))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, input) = args.into_config()?;
    info!(
        model = %config.model,
        peers = config.peer_urls.len(),
        threshold = config.win_threshold,
        "Monitor agent starting"
    );

    let mut agent = MonitorAgent::from_config(&config)?;

    let sink = ChannelStatusSink::new().shared();
    let mut rx = sink.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => warn!("Failed to serialize status event: {e}"),
                },
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "Status printer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let reader: Box<dyn AsyncRead + Unpin + Send> = match input {
        Some(path) => Box::new(
            tokio::fs::File::open(&path)
                .await
                .context(format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(tokio::io::stdin()),
    };

    let mut lines = BufReader::new(reader).lines();
    let mut turns = 0usize;
    let mut wins = 0usize;
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        if line.trim().is_empty() {
            continue;
        }
        let message: Message = match serde_json::from_str(&line) {
            Ok(m) => m,
            Err(e) => {
                warn!("Skipping malformed message: {e}");
                continue;
            }
        };

        let outcome = agent.run(message, sink.as_ref()).await?;
        turns += 1;
        if let TurnOutcome::Evaluated {
            verdict: Some(ref v),
            ..
        } = outcome
        {
            if v.game_won {
                wins += 1;
            }
        }
    }

    sink.update_status(StatusUpdate::completed(format!(
        "Monitored {turns} turns, {wins} won"
    )))
    .await
    .context("Failed to close the monitor task")?;
    drop(sink);
    printer.await.context("Status printer panicked")?;

    let snapshot = agent.snapshot();
    info!(
        turns,
        wins,
        history = snapshot.history_entries,
        senders = snapshot.senders,
        "Monitor agent finished"
    );
    Ok(())
}
