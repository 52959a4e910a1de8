use std::net::SocketAddr;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{auth, cart, catalog, config::AppConfig, orders, reservations, session, state::AppState};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(catalog::router())
        .merge(cart::router())
        .merge(orders::router())
        .merge(reservations::router())
        .merge(auth::router())
        .route("/health", get(|| async { "ok" }))
        .layer(middleware::from_fn_with_state(state.clone(), session::session_layer))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms = latency.as_millis() as u64, "response");
                        } else {
                            tracing::info!(%status, latency_ms = latency.as_millis() as u64, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
