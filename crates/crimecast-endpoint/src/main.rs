use crimecast_endpoint::runtime::ErrorReport;
use crimecast_endpoint::{FunctionConfig, Handler, RuntimeApi, RuntimeClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // The platform timestamps log lines itself.
    tracing_subscriber::fmt().with_ansi(false).without_time().init();
    tracing::info!("crimecast-endpoint v{}", env!("CARGO_PKG_VERSION"));

    let api = RuntimeApi::from_env()?;
    let config = match FunctionConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration fault");
            api.post_init_error(&ErrorReport::new("ConfigError", &e)).await?;
            return Err(e.into());
        }
    };

    let handler = Handler::new(
        config.endpoint_name,
        RuntimeClient::new(config.runtime_url),
    );
    api.run(&handler).await
}
