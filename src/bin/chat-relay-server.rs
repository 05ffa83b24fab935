// ABOUTME: Server binary for the streaming chat relay
// ABOUTME: Loads configuration from the environment and serves the relay until shutdown
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Chat Relay Server Binary
//!
//! Starts the HTTP relay between the chat UI and the completions provider.

use anyhow::Result;
use chat_relay::{
    config::ServerConfig,
    constants::routes,
    logging,
    server::run_server,
};
use clap::Parser;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "chat-relay-server")]
#[command(about = "Streaming chat relay between a chat UI and a hosted completions API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override bind host
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }

    info!("Starting chat relay");
    info!("{}", config.summary());
    display_available_endpoints(&config);

    if let Err(e) = run_server(config).await {
        error!("Server error: {e}");
        return Err(e);
    }

    Ok(())
}

fn display_available_endpoints(config: &ServerConfig) {
    let base = format!("http://{}", config.bind_address());
    info!("Available endpoints:");
    info!("  POST {base}{}", routes::CHAT);
    info!("  GET  {base}{}", routes::MODELS);
    info!("  GET  {base}{}", routes::HEALTH);
}
