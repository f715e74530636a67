use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use dvcm::{ApiConfig, Error};

#[actix_web::main]
async fn main() -> Result<(), Error> {
    let config = ApiConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_span_events(FmtSpan::NEW)
        .compact()
        .init();

    dvcm::run(config).await
}
