use std::error::Error;

use searcher::telemetry;
use tracing::{Level, debug};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // A missing .env is fine; the environment may already be set.
    let dotenv = dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", Level::INFO))
        .with(telemetry::layer())
        .try_init()?;

    if let Some(path) = dotenv {
        debug!(path = %path.display(), "loaded .env");
    }

    api::start().await?;

    Ok(())
}
