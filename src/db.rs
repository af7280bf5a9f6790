// src/db.rs
use crate::{config::Config, error::AppResult};
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Transaction;
use std::str::FromStr;
use std::time::Duration;

pub async fn create_db_pool(config: &Config) -> AppResult<SqlitePool> {
    tracing::info!("Ligando à base de dados: {}", config.database_url);

    // Criar se não existir, chaves estrangeiras ligadas (necessário para o CASCADE)
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Executa os ficheiros SQL em ./migrations (embutidos no binário).
pub async fn run_migrations(pool: &SqlitePool) -> AppResult<()> {
    tracing::info!("Executando migrações da base de dados...");
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Migrações concluídas.");
    Ok(())
}

/// Transação que reserva a escrita logo no BEGIN.
/// Um `BEGIN` diferido que lê e depois escreve falha com SQLITE_BUSY se outra
/// conexão escreveu entretanto; com IMMEDIATE a espera usa o `busy_timeout`.
pub async fn begin_escrita(db_pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    db_pool.begin_with("BEGIN IMMEDIATE").await
}
