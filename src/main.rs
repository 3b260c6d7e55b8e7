//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Entry point of the review service. Loads the configuration, connects the event publisher to
// RabbitMQ (or runs without a broker when it cannot be reached) and serves the HTTP API until
// Ctrl-C.
//--------------------------------------------------------------------------------------------------

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, error, info, warn};

use stall_reviews::{
    Api, AppState, BrokerClient, Config, DisconnectedBroker, EventPublisher, InMemoryReviewStore,
    RabbitBroker,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Stall review service")]
struct Args {
    /// Address to listen on; overrides API_ADDR
    #[arg(short, long)]
    addr: Option<SocketAddr>,

    /// RabbitMQ URL; overrides RABBIT_URL
    #[arg(short, long)]
    rabbit_url: Option<String>,

    /// Maximum log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt().with_max_level(args.log_level).init();

    let mut config = Config::try_from_env_with(args.rabbit_url).context("invalid configuration")?;
    if let Some(addr) = args.addr {
        config.api_addr = addr;
    }

    let (broker, connection) = match RabbitBroker::connect(
        &config.rabbit_url,
        &config.app_id,
        &config.exchange,
        config.publish_timeout,
    )
    .await
    {
        Ok((broker, connection)) => (Arc::new(broker) as Arc<dyn BrokerClient>, Some(connection)),
        Err(err) => {
            warn!("RabbitMQ unreachable, statistics events will be dropped: {}", err);
            (Arc::new(DisconnectedBroker::new(err.to_string())) as Arc<dyn BrokerClient>, None)
        }
    };

    let publisher = Arc::new(EventPublisher::new(broker, config.event_routes(), config.publish_timeout));
    let store = Arc::new(InMemoryReviewStore::new());
    let state = Arc::new(AppState::with_store(store, publisher));

    let api = Api::new(config.api_addr, state);
    info!("starting review service on {}", api.addr());
    let served = api
        .serve(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                error!("failed to listen for shutdown signal: {}", err);
            }
            info!("shutdown requested");
        })
        .await;

    if let Some(connection) = connection {
        connection.shutdown().await;
    }
    served.context("API server failed")?;
    Ok(())
}
