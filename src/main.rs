//! Agent Gateway (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                  AGENT GATEWAY                   │
//!                        │                                                  │
//!   HTTP   :http_port ───┼─▶┌─────────┐                                      │
//!   TLS    :tls_port  ───┼─▶│  http   │──▶┌─────────┐   ┌──────────┐        │
//!   HTTP/3 :h3_port   ───┼─▶│ servers │   │ routing │──▶│ upstream │────────┼──▶ Agent
//!                        │  └─────────┘   └────┬────┘   │  client  │        │    Provider
//!                        │                     │ chat   └──────────┘        │
//!                        │                     ▼ upgrade                    │
//!   WebTransport :wt_port┼──────────────▶┌──────────┐   ┌──────────┐        │
//!                        │               │ session  │──▶│ registry │        │
//!                        │               │  (chat)  │   └──────────┘        │
//!                        │               └──────────┘                       │
//!                        │                                                  │
//!                        │  config · lifecycle · observability · models     │
//!                        └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use agent_gateway::config::load_config;
use agent_gateway::lifecycle;
use agent_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "agent-gateway")]
#[command(about = "Multi-transport gateway for an AI-agent provider", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "AGENT_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("agent-gateway: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        http_port = config.server.http_port,
        tls_port = config.server.tls_port,
        h3_port = config.server.h3_port,
        webtransport_port = config.server.webtransport_port,
        upstream = %config.upstream.base_url,
        "agent-gateway starting"
    );

    match lifecycle::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "agent-gateway stopped with an error");
            ExitCode::FAILURE
        }
    }
}
