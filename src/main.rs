// src/main.rs

//! The main entry point for the gridwire client binary.
//!
//! The binary is a thin, headless presentation shim around the library: it
//! renders decoded snapshots as log lines and forwards stdin lines to the
//! server as input events. A graphical front end would consume the same two
//! boundaries (the snapshot receiver and the input sink).

use anyhow::Result;
use gridwire::GameClient;
use gridwire::config::Config;
use gridwire::core::snapshot::{GamePhase, InputEvent, Snapshot};
use std::env;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::filter::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    run_app().await
}

async fn run_app() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    // Collect command-line arguments to decide the execution mode.
    let args: Vec<String> = env::args().collect();

    // Handle the --version flag.
    if args.contains(&"--version".to_string()) {
        println!("gridwire version {VERSION}");
        return Ok(());
    }

    // Load the configuration if a path was given; otherwise run on defaults.
    // If loading fails, print the error and exit, since the client cannot
    // run with a half-read configuration.
    let config_path = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str());

    let mut config = match config_path {
        Some(path) => match Config::from_file(path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Failed to load configuration from \"{path}\": {e}");
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    // Override the endpoint if provided as command-line arguments.
    if let Some(host_index) = args.iter().position(|arg| arg == "--host") {
        match args.get(host_index + 1) {
            Some(host) => config.host = host.clone(),
            None => {
                eprintln!("--host flag requires a value");
                std::process::exit(1);
            }
        }
    }
    if let Some(port_index) = args.iter().position(|arg| arg == "--port") {
        if let Some(port_str) = args.get(port_index + 1) {
            match port_str.parse::<u16>() {
                Ok(port) => config.port = port,
                Err(_) => {
                    eprintln!("Invalid port number: {port_str}");
                    std::process::exit(1);
                }
            }
        } else {
            eprintln!("--port flag requires a value");
            std::process::exit(1);
        }
    }

    // Setup logging. RUST_LOG wins over the configured level.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level))
        .compact()
        .with_ansi(true)
        .init();

    info!(
        "gridwire {VERSION} connecting to {}:{}...",
        config.host, config.port
    );
    let (client, mut snapshots) = GameClient::connect(&config).await?;

    // Forward stdin lines to the server as input events. Each line is one
    // key name, matching the outbound wire contract.
    let input = client.input();
    let stdin_task = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let key = line.trim();
            if key.is_empty() {
                continue;
            }
            if let Err(e) = input.send(InputEvent::new(key)).await {
                warn!("Input event not delivered: {e}");
            }
        }
    });

    loop {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupt received, shutting down.");
                break;
            }
            snapshot = snapshots.recv() => {
                match snapshot {
                    Some(snapshot) => render(&snapshot),
                    None => {
                        info!("Snapshot stream ended; the connection is gone.");
                        break;
                    }
                }
            }
        }
    }

    stdin_task.abort();
    client.shutdown().await;
    Ok(())
}

/// The headless renderer: one log line per snapshot.
fn render(snapshot: &Snapshot) {
    match snapshot.phase {
        GamePhase::Win => info!("You won! Press enter to go again."),
        GamePhase::Lose => info!("You lost! Press enter to try again."),
        GamePhase::Playing => {
            info!(
                "{}x{} map, {} entities | {}",
                snapshot.width(),
                snapshot.height(),
                snapshot.entities.len(),
                snapshot.status
            );
            for message in &snapshot.messages {
                info!("> {message}");
            }
        }
    }
}
