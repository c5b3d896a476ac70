//! market-live server entry point.

use std::future::IntoFuture;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use market_live::adapters::http::{build_router, AppState, RefreshCookie};
use market_live::adapters::postgres::PostgresSessionStore;
use market_live::adapters::redis::{
    RedisMembershipRegistry, RedisMessageBroker, RedisViewCounterCache,
};
use market_live::adapters::token::HmacTokenCodec;
use market_live::adapters::websocket::{PubSubBridge, TopicHub};
use market_live::application::{AuthGate, CredentialService, CredentialSettings, ViewCountService};
use market_live::config::{AppConfig, ConfigError, ValidationError};
use market_live::domain::auth::TokenError;
use market_live::domain::catalog::ChannelSet;
use market_live::ports::{CacheError, MessageBroker};

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("signing key rejected: {0}")]
    SigningKey(#[from] TokenError),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("redis: connection timed out after {0:?}")]
    RedisTimeout(std::time::Duration),

    #[error("pub/sub bridge: {0}")]
    Bridge(#[from] CacheError),

    #[error("pub/sub bridge stopped: {0}")]
    BridgeStopped(String),

    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = AppConfig::load()?;
    init_tracing(&config);
    config.validate()?;

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;
    tracing::info!("Connected to database");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations completed");
    }

    let redis_client = redis::Client::open(config.redis.url.as_str())?;
    let redis_timeout = config.redis.timeout();
    let redis_conn =
        tokio::time::timeout(redis_timeout, redis_client.get_multiplexed_tokio_connection())
            .await
            .map_err(|_| StartupError::RedisTimeout(redis_timeout))??;
    tracing::info!("Connected to redis");

    let codec = Arc::new(HmacTokenCodec::from_config(&config.auth)?);
    let credentials = Arc::new(CredentialService::new(
        codec,
        Arc::new(PostgresSessionStore::new(pool)),
        CredentialSettings::from(&config.auth),
    ));

    let broker: Arc<dyn MessageBroker> =
        Arc::new(RedisMessageBroker::new(redis_client, redis_conn.clone(), redis_timeout));
    let topics = Arc::new(TopicHub::default());

    let channels = ChannelSet::new(config.redis.channel_names());
    let bridge = PubSubBridge::new(broker.clone(), topics.clone())
        .start(&channels.to_vec())
        .await?;

    let state = AppState {
        gate: Arc::new(AuthGate::new(credentials)),
        view_counts: Arc::new(ViewCountService::new(
            Arc::new(RedisViewCounterCache::new(redis_conn.clone())),
            broker,
        )),
        membership: Arc::new(RedisMembershipRegistry::new(redis_conn)),
        topics,
        channels: Arc::new(channels),
        refresh_cookie: RefreshCookie::from_config(&config.auth),
    };

    let app = build_router(state, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(environment = ?config.server.environment, "Listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    // live fan-out is gone if the bridge task ever finishes
    tokio::select! {
        served = server.into_future() => served?,
        stopped = bridge => {
            let reason = match stopped {
                Ok(()) => "task exited".to_string(),
                Err(e) => e.to_string(),
            };
            tracing::error!(reason = %reason, "Pub/sub bridge stopped; shutting down");
            return Err(StartupError::BridgeStopped(reason));
        }
    }

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.as_str()));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
