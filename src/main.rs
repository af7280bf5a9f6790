// src/main.rs

// --- Declaração dos Módulos ---
mod config;
mod db;
mod error;
mod models;
mod services;
mod state;
mod web;

#[cfg(test)]
mod test_support;

// --- Imports ---
use crate::{config::Config, state::AppState};
use axum::{
    http::{HeaderValue, Method},
    serve,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // --- Configuração (variáveis de ambiente + .env) ---
    let config = Config::from_env()?;

    // --- Configuração do Logging (Tracing) ---
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "controle_presenca=debug,tower_http=info,sqlx=warn".into()
        }))
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Iniciando servidor de controlo de presenças...");

    // --- Configuração da Base de Dados ---
    let db_pool = match db::create_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Falha crítica ao inicializar a base de dados: {}", e);
            return Err(anyhow::anyhow!("Falha ao conectar/migrar DB: {}", e));
        }
    };

    let app_state = AppState { db_pool };

    // --- CORS para o frontend ---
    let origem = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| anyhow::anyhow!("CORS_ORIGIN inválido: {}", e))?;
    let cors = CorsLayer::new()
        .allow_origin(origem)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);
    tracing::info!("🌐 CORS permitido para {}", config.cors_origin);

    // --- Listener ---
    let listener = match TcpListener::bind(config.server_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Falha ao iniciar listener em {}: {}", config.server_addr, e);
            return Err(e.into());
        }
    };
    tracing::info!("📡 Servidor escutando em http://{}", config.server_addr);

    // --- Router e camadas ---
    let app = web::routes::create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("❌ Erro fatal no servidor: {}", e);
        return Err(e.into());
    }

    Ok(())
}
