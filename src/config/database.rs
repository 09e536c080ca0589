use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::env;
use std::time::Duration;

pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let max_connections: u32 = env::var("DB_MAX_CONNECTIONS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(10);

    let min_connections: u32 = env::var("DB_MIN_CONNECTIONS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(2);

    let mut opt = ConnectOptions::new(database_url.to_string());

    // Every connection to `sqlite::memory:` opens its own empty database.
    if database_url.starts_with("sqlite::memory:") {
        opt.max_connections(1).min_connections(1);
    } else {
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .idle_timeout(Duration::from_secs(300));
    }

    opt.connect_timeout(Duration::from_secs(5)).sqlx_logging(true);

    Database::connect(opt).await
}
