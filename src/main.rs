#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;
use anyhow::anyhow;
use anyhow::bail;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::prelude::*;

use datebook::JwtKeys;
use datebook::QuestCache;
use datebook::coupon_expiry;
use datebook::create_router;
use datebook::graceful_shutdown;
use datebook::storage::Memory;
use datebook::storage::Postgres;
use datebook::storage::Storage;
use datebook::utils::env_var;
use datebook::utils::env_var_or_else;

const DEFAULT_RUST_LOG: &str = "datebook=debug,tower_http=debug";
const DEFAULT_ADDRESS: &str = "0.0.0.0:6000";
const DEFAULT_COUPON_EXPIRY_INTERVAL_SECONDS: u64 = 60;

/// Where the data lives
enum StorageKind {
    Postgres,
    Memory,
}

/// Everything needed to run the server, read from the environment
struct Config {
    address: SocketAddr,
    jwt_keys: JwtKeys,
    coupon_expiry_interval: Duration,
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let config = Config {
        address: setup_address()?,
        jwt_keys: setup_jwt_keys()?,
        coupon_expiry_interval: setup_coupon_expiry_interval()?,
    };

    match setup_storage_kind()? {
        StorageKind::Postgres => {
            let database_url =
                env_var("DATABASE_URL").context("`DATABASE_URL` is required for Postgres")?;

            let storage = Postgres::connect(&database_url).await?;

            serve(storage, config).await
        }
        StorageKind::Memory => {
            tracing::warn!("Using memory storage, all data is lost on shutdown");

            serve(Memory::new(), config).await
        }
    }
}

/// Run the server and its background tasks until shutdown
async fn serve<S: Storage>(storage: S, config: Config) -> Result<()> {
    let shutdown = CancellationToken::new();

    let coupon_expiry = tokio::spawn(coupon_expiry::run(
        storage.clone(),
        config.coupon_expiry_interval,
        shutdown.clone(),
    ));

    let app = create_router(storage, config.jwt_keys, QuestCache::new());

    let listener = TcpListener::bind(config.address).await?;
    tracing::info!("Listening on {}", config.address);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler(shutdown.clone()))
        .await;

    // also stops the background tasks when the server fails
    shutdown.cancel();
    coupon_expiry.await?;

    served?;

    Ok(())
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(env_var_or_else("RUST_LOG", || {
            DEFAULT_RUST_LOG.into()
        })))
        .with(fmt::layer())
        .init();
}

fn setup_storage_kind() -> Result<StorageKind> {
    match env_var_or_else("STORAGE", || "postgres".into()).as_str() {
        "postgres" => Ok(StorageKind::Postgres),
        "memory" => Ok(StorageKind::Memory),
        other => bail!("Unknown storage `{other}`, use `postgres` or `memory`"),
    }
}

fn setup_jwt_keys() -> Result<JwtKeys> {
    use datebook::password::generate;

    let jwt_secret = match env_var("JWT_SECRET") {
        Some(jwt_secret) => jwt_secret,
        None => {
            let jwt_secret =
                generate().map_err(|err| anyhow!("Could not generate a JWT secret: {err}"))?;
            tracing::info!("`JWT_SECRET` is not set, generating temporary one: {jwt_secret}");
            jwt_secret
        }
    };

    Ok(JwtKeys::new(jwt_secret.as_bytes()))
}

fn setup_coupon_expiry_interval() -> Result<Duration> {
    let seconds = match env_var("COUPON_EXPIRY_INTERVAL_SECONDS") {
        Some(seconds) => seconds
            .parse::<u64>()
            .context("`COUPON_EXPIRY_INTERVAL_SECONDS` must be a number of seconds")?,
        None => DEFAULT_COUPON_EXPIRY_INTERVAL_SECONDS,
    };

    if seconds == 0 {
        bail!("`COUPON_EXPIRY_INTERVAL_SECONDS` must be at least 1");
    }

    Ok(Duration::from_secs(seconds))
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Some(port) = env_var("PORT") {
        let port = port.parse::<u16>()?;

        address.set_port(port);
    }

    Ok(address)
}
