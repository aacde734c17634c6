use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Apply pending migrations when the server starts.
    pub auto_migrate: bool,
    pub graphql_depth_limit: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let auto_migrate = env::var("APP_AUTO_MIGRATE")
            .ok()
            .map(|v| parse_flag(&v))
            .unwrap_or(true);
        let graphql_depth_limit = env::var("GRAPHQL_DEPTH_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10);
        Ok(Self {
            port,
            database_url,
            host,
            auto_migrate,
            graphql_depth_limit,
        })
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
