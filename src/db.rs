use anyhow::Result;
use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::migration::Migrator;

/// Create a SeaORM connection.
pub async fn create_orm_conn(database_url: &str) -> Result<DatabaseConnection> {
    let conn = Database::connect(database_url).await?;
    Ok(conn)
}

/// Apply every pending migration from [`Migrator`].
pub async fn run_migrations(conn: &DatabaseConnection) -> Result<()> {
    Migrator::up(conn, None).await?;
    Ok(())
}
