use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;

    // Any bearer token is accepted unless MOCK_API_KEY pins one.
    let router = match std::env::var("MOCK_API_KEY") {
        Ok(key) if !key.is_empty() => {
            tracing::info!(%addr, "listening, bearer token pinned");
            mock_server::app_with_api_key(&key)
        }
        _ => {
            tracing::info!(%addr, "listening");
            mock_server::app()
        }
    };
    axum::serve(listener, router).await
}
