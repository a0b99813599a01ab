mod config;
mod routes;

use config::{ServerConfig, StartupError};

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, "ignoring unreadable .env");
        }
    }

    let config = ServerConfig::from_env()?;
    let app = routes::app()?;
    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .map_err(StartupError::Bind)?;

    tracing::info!(port = config.port, "blog front end listening");
    axum::serve(listener, app).await.map_err(StartupError::Serve)
}
