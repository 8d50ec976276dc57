//! Courier daemon - wires the broker, reaper, and HTTP server together.
//!
//! The privileged session key comes from the `COURIER_PRIVILEGED_KEY`
//! environment variable; refusing to start without it is deliberate,
//! since that key is the only thing separating the anonymous queue from
//! keyed sessions.

use clap::Parser;
use courier_core::{Broker, BrokerConfig, Reaper};
use courier_http::SharedState;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "courier-daemon", about = "Command/result rendezvous broker")]
struct Args {
    /// Host to bind the HTTP server to.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind the HTTP server to.
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Override the submitter wait timeout, in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Override the session idle threshold, in seconds.
    #[arg(long)]
    idle_secs: Option<u64>,

    /// Override the reaper sweep period, in seconds.
    #[arg(long)]
    reap_secs: Option<u64>,
}

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let args = Args::parse();

    let mut config = match BrokerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    if let Some(secs) = args.timeout_secs {
        config.wait_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = args.idle_secs {
        config.idle_threshold = Duration::from_secs(secs);
    }
    if let Some(secs) = args.reap_secs {
        config.reap_interval = Duration::from_secs(secs);
    }

    let broker = Arc::new(Broker::new());
    let mut reaper = Reaper::start(
        Arc::clone(&broker),
        config.reap_interval,
        config.idle_threshold,
    );

    let state = Arc::new(SharedState::new(broker, &config));
    let mut server = match courier_http::start(state, &args.host, args.port).await {
        Ok(handle) => handle,
        Err(e) => {
            log::error!("Failed to start HTTP server: {}", e);
            std::process::exit(1);
        }
    };

    tokio::signal::ctrl_c().await.ok();
    log::info!("Shutting down");

    server.stop().await;
    reaper.stop().await;
}
