use std::env;
use std::process::exit;
use std::sync::Arc;

use keyfold::{BrowseHandler, EnvironmentConfig};
use log::{error, info};

mod routes;
mod views;

const DEFAULT_PORT: &str = "8080";

#[tokio::main]
async fn main() {
    env_logger::init();

    let port = env::var("PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());

    let config = EnvironmentConfig::default();
    let handler = match BrowseHandler::new(config) {
        Ok(handler) => Arc::new(handler),
        Err(e) => {
            error!(
                "{}. Set your credentials before starting the server: \
                 export AWS_ACCESS_KEY_ID=<key> \
                 AWS_SECRET_ACCESS_KEY=<secret>",
                e
            );
            exit(1);
        }
    };

    let app = routes::router(handler);

    let addr = format!("0.0.0.0:{}", port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("failed to bind {}: {}", addr, e);
            exit(1);
        }
    };

    info!("listening on {}", port);
    if let Err(e) = axum::serve(listener, app).await {
        error!("server error: {}", e);
        exit(1);
    }
}
