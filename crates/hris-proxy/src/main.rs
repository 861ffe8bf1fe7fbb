use hris_proxy::{start_server, ProxyConfig};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let result = match ProxyConfig::load() {
        Ok(config) => start_server(config).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        error!("{e:#}");
        std::process::exit(1);
    }
}
