//! castline - console host for castline-core.
//!
//! Reads lines from stdin. Slash-commands play the role of the session
//! manager (`/start s1`, `/end s1`, ...); every other line is treated as a
//! finalized voice transcript and sent to the receiver, or shown locally
//! when no channel is open.

mod commands;
mod host;

use castline_core::event_bus::BroadcastEvent;
use castline_core::fallback::FallbackDisplay;
use castline_core::{CastConfig, CastContext, ChannelNamespace};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::host::{Flow, Host};

#[derive(Parser, Debug)]
#[command(name = "castline", about = "Send text messages to a cast receiver")]
struct Args {
    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Channel namespace (overrides the config file)
    #[arg(long)]
    namespace: Option<String>,

    /// Directory for per-session transcripts (overrides the config file)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Have the simulated receiver echo every message back
    #[arg(long)]
    echo: bool,
}

/// Prints unsendable messages on the console.
struct ConsoleFallback;

impl FallbackDisplay for ConsoleFallback {
    fn show(&self, text: &str) {
        println!("(not connected) {}", text);
    }
}

fn load_config(args: &Args) -> Result<CastConfig, String> {
    let mut config = match &args.config {
        Some(path) => CastConfig::load(path).map_err(|e| e.to_string())?,
        None => CastConfig::default(),
    };
    if let Some(namespace) = &args.namespace {
        config.namespace = ChannelNamespace::new(namespace.as_str()).map_err(|e| e.to_string())?;
    }
    if let Some(dir) = &args.log_dir {
        config.log_dir = Some(dir.clone());
    }
    Ok(config)
}

async fn log_events(mut events: broadcast::Receiver<BroadcastEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => log::info!("{} {}", event.event_type, event.payload),
            Err(RecvError::Lagged(missed)) => log::warn!("Event log lagged, missed {}", missed),
            Err(RecvError::Closed) => break,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;
    log::info!("Using namespace {}", config.namespace);

    let ctx = CastContext::builder()
        .config(config)
        .fallback(Arc::new(ConsoleFallback))
        .build();
    tokio::spawn(log_events(ctx.event_bus.subscribe()));

    let mut host = Host::new(args.echo);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", commands::HELP);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };
        match commands::parse_line(&line) {
            Ok(Some(command)) => {
                if host.apply(&ctx, command) == Flow::Quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => println!("{}", e),
        }
    }

    ctx.teardown();
    Ok(())
}
