//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Reference consumer of the stall statistics events. Binds one durable queue per statistic to
// the review exchange, applies every snapshot to a last-writer-wins cache and acks it. Payloads
// that cannot be handled are rejected without requeue.
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use rabbitmq::{Delivery, RabbitMQBuilder, Subscription};
use tracing::{Level, error, info, warn};

use stall_reviews::inbounds::handlers::handle_stats_event;
use stall_reviews::{Config, EventRoutes, StallStatsCache};

#[derive(Parser, Debug)]
#[command(author, version, about = "Consumes stall rating and price snapshots")]
struct Args {
    /// RabbitMQ URL; overrides RABBIT_URL
    #[arg(short, long)]
    rabbit_url: Option<String>,

    /// Maximum log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

async fn consume(mut subscription: Subscription, routes: Arc<EventRoutes>, cache: Arc<StallStatsCache>) {
    info!("consuming from {}", subscription.queue_name());
    while let Some(delivery) = subscription.receive().await {
        settle(&subscription, &delivery, &routes, &cache).await;
    }
    warn!("subscription {} closed", subscription.queue_name());
    if let Err(err) = subscription.close().await {
        warn!("error closing subscription: {}", err);
    }
}

async fn settle(subscription: &Subscription, delivery: &Delivery, routes: &EventRoutes, cache: &StallStatsCache) {
    let result = match handle_stats_event(&delivery.routing_key, &delivery.content, routes, cache) {
        Ok(_) => subscription.ack(delivery).await,
        Err(err) => {
            error!("dropping message: {}", err);
            subscription.nack(delivery, false).await
        }
    };
    if let Err(err) = result {
        error!("failed to settle delivery {}: {}", delivery.delivery_tag(), err);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt().with_max_level(args.log_level).init();

    let config = Config::try_from_env_with(args.rabbit_url).context("invalid configuration")?;
    let routes = Arc::new(config.event_routes());

    let mut rabbit = RabbitMQBuilder::new(&config.rabbit_url, &config.app_id)
        .topic_subscriber(&routes.exchange, &config.rating_queue, vec![routes.rating_changed_key.clone()])
        .topic_subscriber(&routes.exchange, &config.price_queue, vec![routes.price_changed_key.clone()])
        .build()
        .await
        .context("failed to connect to RabbitMQ")?;

    let cache = Arc::new(StallStatsCache::new());
    let ratings = rabbit.take_subscription(&config.rating_queue)?;
    let prices = rabbit.take_subscription(&config.price_queue)?;

    let rating_task = tokio::spawn(consume(ratings, routes.clone(), cache.clone()));
    let price_task = tokio::spawn(consume(prices, routes.clone(), cache.clone()));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("shutdown requested"),
        _ = rating_task => warn!("rating consumer stopped"),
        _ = price_task => warn!("price consumer stopped"),
    }

    info!("{} stalls tracked at shutdown", cache.len());
    rabbit.close().await?;
    Ok(())
}
