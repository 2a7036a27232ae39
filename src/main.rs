mod app;
mod cli;
mod config;
mod db;
mod paths;

use std::env;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.is_interactive());
    app::run(cli)
}

fn init_tracing(interactive: bool) {
    let filter = EnvFilter::try_from_env("FEEDMARK_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if interactive {
            "off"
        } else if env::var("DEBUG").is_ok() {
            "feedmark=debug,info"
        } else {
            "feedmark=info,warn"
        })
    });

    let format = env::var("FEEDMARK_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}
