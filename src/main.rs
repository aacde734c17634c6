use axum::http::{HeaderName, Request, Response};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::{net::SocketAddr, time::Duration};

use crm_graphql_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    graphql::build_schema,
    routes::create_router,
    state::{AppState, HttpState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,crm_graphql_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;

    if config.auto_migrate {
        run_migrations(&orm).await?;
        tracing::info!("migrations applied");
    }

    let app_state = AppState { orm };
    let schema = build_schema(app_state.clone(), config.graphql_depth_limit);
    let state = HttpState {
        app: app_state,
        schema,
    };

    let concurrency_limit_layer = ConcurrencyLimitLayer::new(100);

    let request_id_header = HeaderName::from_static("x-request-id");
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get("x-request-id")
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "request started"
            );
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    let app = create_router()
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(RequestBodyLimitLayer::new(1024 * 1024))
        .layer(concurrency_limit_layer)
        .with_state(state);

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    tracing::info!("listening on {}, GraphiQL at http://{}/graphql", addr, addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
