use crm_graphql_api::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;
    tracing::info!("migrations applied");
    Ok(())
}
