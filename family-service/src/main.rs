use lambda_http::Error;
use log::info;

mod authz;
mod error;
mod handlers;
mod models;
mod notifications;
mod routes;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize env_logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting Family Gather service");

    let app = routes::create_router().await;

    // In Lambda the adapter drives the router; anywhere else bind a local
    // listener
    if std::env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
        lambda_http::run(app).await
    } else {
        let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Listening on {}", addr);
        axum::serve(listener, app).await?;
        Ok(())
    }
}
