// src/config.rs
use std::{env, net::SocketAddr};

const DATABASE_URL_PADRAO: &str = "sqlite://controle_presenca.db";
const SERVER_ADDR_PADRAO: &str = "0.0.0.0:8080";
const CORS_ORIGIN_PADRAO: &str = "http://localhost:5173";
const DB_MAX_CONNECTIONS_PADRAO: u32 = 5;

/// Configuração lida das variáveis de ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: SocketAddr,
    pub cors_origin: String,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok(); // Carrega .env

        let server_addr = env::var("SERVER_ADDR")
            .unwrap_or_else(|_| SERVER_ADDR_PADRAO.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| anyhow::anyhow!("SERVER_ADDR inválido: {}", e))?;

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DATABASE_URL_PADRAO.to_string()),
            server_addr,
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| CORS_ORIGIN_PADRAO.to_string()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DB_MAX_CONNECTIONS_PADRAO),
        })
    }
}
