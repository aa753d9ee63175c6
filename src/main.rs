use axum::middleware;
use axum::Router;
use log::{error, info};
use tower_http::cors::CorsLayer;

use book_market_service::integration::Config;
use book_market_service::state::AppState;
use book_market_service::{auth, book, conversation, media, message, user};

#[tokio::main]
async fn main() {
    let config = Config::default();

    let state = match AppState::get(&config).await {
        Ok(state) => state,
        Err(e) => {
            error!("failed to initialize application state: {e}");
            return;
        }
    };

    let protected = Router::new()
        .merge(user::api(state.clone()))
        .merge(book::api(state.clone()))
        .merge(conversation::api(state.clone()))
        .merge(message::api(state.clone()))
        .merge(media::api(state.clone()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::authenticate,
        ));

    let router = Router::new()
        .merge(auth::api(state.clone()))
        .merge(protected)
        .layer(
            CorsLayer::new()
                .allow_origin(config.env.allow_origin())
                .allow_methods(config.env.allow_methods())
                .allow_headers(config.env.allow_headers()),
        );

    let addr = config.env.addr();
    info!("listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind address");

    if let Err(e) = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server stopped with error: {e}");
    }

    state.shutdown().await;
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
}
