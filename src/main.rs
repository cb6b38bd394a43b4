use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use tweetgrab::config;
use tweetgrab::extractor::ResolutionChain;
use tweetgrab::server::{self, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = config::get_config()?;

    // Resolver client: bounded total timeout so one stalled source cannot
    // hold the chain open.
    let resolver_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.resolver.request_timeout_secs))
        .build()?;

    // Proxy client: connect/read bounds only. A total timeout would abort
    // large downloads mid-stream.
    let proxy_client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .read_timeout(Duration::from_secs(30))
        .build()?;

    let chain = Arc::new(ResolutionChain::new(resolver_client));
    let state = AppState::new(chain, proxy_client);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("tweetgrab listening on http://{}", addr);

    axum::serve(listener, server::router(state)).await?;
    Ok(())
}
