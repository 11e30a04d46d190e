use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mock_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");

    let router = match std::env::var("MOCK_BANK_TOKEN") {
        Ok(token) if !token.is_empty() => mock_server::app_with_token(&token),
        _ => mock_server::app(),
    };
    let router = router.layer(tower_http::trace::TraceLayer::new_for_http());

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "mock bank service listening");
    mock_server::run(listener, router).await
}
