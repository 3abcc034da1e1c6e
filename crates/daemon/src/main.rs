// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! tada: deployment webhook agent.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use tada_core::Config;
use tada_daemon::{env, lifecycle, Options};
use tracing_subscriber::EnvFilter;

/// Run actions and update containers on authenticated HTTP requests
#[derive(Parser, Debug)]
#[command(name = "tada")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "TADA_PORT", default_value_t = 3000)]
    port: u16,

    /// Address to bind
    #[arg(long, env = "TADA_BIND", default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Config file (TOML, or JSON with a .json extension)
    #[arg(long, env = "TADA_CONFIG", default_value = "./config.toml")]
    config: PathBuf,

    /// Validate the config and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(env::log_filter()))
        .with_target(false)
        .init();

    if cli.check {
        let config = Config::load(&cli.config)?;
        println!(
            "{}: ok ({} actions, {} containers)",
            cli.config.display(),
            config.actions.len(),
            config.containers().len()
        );
        return Ok(());
    }

    lifecycle::run(Options { bind: cli.bind, port: cli.port, config: cli.config }).await
}
