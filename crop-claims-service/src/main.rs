use crop_claims_service::telemetry::{LogFormat, init_tracing};
use crop_claims_service::{ServiceConfig, create_app};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_format = std::env::var("LOG_FORMAT")
        .map(|value| value.parse::<LogFormat>())
        .unwrap_or(Ok(LogFormat::default()));
    init_tracing(log_format.clone().unwrap_or_default());
    if let Err(e) = log_format {
        warn!(error = %e, "Falling back to JSON logs");
    }

    let config = match ServiceConfig::from_env().await {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    info!(
        model = %config.llm_model,
        insured_area = %config.locations.insured_area,
        "Configuration loaded"
    );

    let port = config.port;
    let app = create_app(config);
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    let addr = listener.local_addr()?;

    info!("Crop Claims Service running on http://{}", addr);
    info!("Claim endpoint: POST http://{}/claims", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
