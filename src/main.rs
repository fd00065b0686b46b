// pichat - terminal client for the coding-assistant chatbot
//
// Talks to the chatbot REST API: asks questions, browses sessions and
// history, shows analytics and manages bookmarks.
//
// Architecture:
// - API (reqwest): typed client and wire models
// - State: pure store; actions in, commands out
// - Runtime (tokio): runs commands and reports back as actions
// - TUI (ratatui): renders the store and turns keys into actions
// - CLI (clap): one-shot subcommands for scripting
// - Demo (axum): in-memory backend for trying the client offline

mod api;
mod auth;
mod cli;
mod config;
mod demo;
mod format;
mod logging;
mod runtime;
mod state;
mod tui;

use anyhow::{Context, Result};
use auth::{CredentialStore, Credentials};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use logging::{LogBuffer, LogTarget};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands must work even when the file does not parse
    if let Some(Commands::Config {
        show,
        path,
        reset,
        edit,
    }) = cli.command
    {
        return cli::handle_config(show, path, reset, edit);
    }

    Config::ensure_config_exists();
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let log_buffer = LogBuffer::new();

    match cli.command {
        None => {
            // Keep the guard alive so the file writer flushes on exit
            let _guard = logging::init(&config.logging, LogTarget::Buffer, &log_buffer);
            run_tui(&config, log_buffer).await
        }
        Some(Commands::Demo { port }) => {
            let _guard = logging::init(&config.logging, LogTarget::Buffer, &log_buffer);
            run_demo(config, port, log_buffer).await
        }
        Some(command) => {
            let _guard = logging::init(&config.logging, LogTarget::Stderr, &log_buffer);
            cli::run(command, &config).await
        }
    }
}

async fn run_tui(config: &Config, log_buffer: LogBuffer) -> Result<()> {
    let credentials = CredentialStore::new(&config.credentials_path);
    let client = cli::build_client(config, &credentials)?;
    if !client.has_token() {
        tracing::warn!("No stored access token; run `pichat login` first");
    }
    tui::run(config, Arc::new(client), credentials, log_buffer).await
}

/// TUI against the built-in backend, with throwaway credentials
async fn run_demo(mut config: Config, port: u16, log_buffer: LogBuffer) -> Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let server = demo::serve(addr, demo::DemoConfig::default()).await?;
    tracing::info!(addr = %server.addr(), "Demo backend listening");

    config.api_url = server.api_url();
    config.credentials_path =
        std::env::temp_dir().join(format!("pichat-demo-{}.json", std::process::id()));

    let credentials = CredentialStore::new(&config.credentials_path);
    credentials
        .save(&Credentials {
            access: Some(demo::DEMO_ACCESS_TOKEN.to_string()),
            refresh: Some(demo::DEMO_REFRESH_TOKEN.to_string()),
        })
        .context("Failed to write demo credentials")?;

    let result = run_tui(&config, log_buffer).await;

    if let Err(e) = credentials.clear() {
        tracing::warn!("Failed to remove demo credentials: {:#}", e);
    }
    server.shutdown().await;
    result
}
