// src/test_support.rs
// Utilitários partilhados pelos testes: DB em memória já migrada e dados base.
use crate::{
    config::Config,
    db,
    models::{aluno::AlunoPayload, mentor::MentorPayload, turma::TurmaPayload},
    services::{aluno_service, mentor_service, turma_service},
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};

static PROXIMA_BASE: AtomicU32 = AtomicU32::new(0);

/// Pool com UMA conexão: cada conexão `sqlite::memory:` tem a sua própria DB,
/// e a conexão não pode expirar senão os dados perdem-se.
pub async fn pool_de_teste() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("URL sqlite inválida")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("falha ao abrir sqlite em memória");
    db::run_migrations(&pool).await.expect("falha nas migrações");
    pool
}

/// Base SQLite em ficheiro temporário, aberta como em produção (várias
/// conexões, `busy_timeout`). O ficheiro é apagado no drop.
pub struct BaseEmFicheiro {
    pub pool: SqlitePool,
    caminho: PathBuf,
}

impl BaseEmFicheiro {
    pub async fn abrir(max_conexoes: u32) -> Self {
        let caminho = std::env::temp_dir().join(format!(
            "controle-presenca-teste-{}-{}.db",
            std::process::id(),
            PROXIMA_BASE.fetch_add(1, Ordering::SeqCst)
        ));
        let _ = std::fs::remove_file(&caminho);
        let config = Config {
            database_url: format!("sqlite://{}", caminho.display()),
            server_addr: "127.0.0.1:0".parse().expect("endereço inválido"),
            cors_origin: "http://localhost".to_string(),
            db_max_connections: max_conexoes,
        };
        let pool = db::create_db_pool(&config)
            .await
            .expect("falha ao abrir sqlite em ficheiro");
        Self { pool, caminho }
    }
}

impl Drop for BaseEmFicheiro {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.caminho);
        let _ = std::fs::remove_file(self.caminho.with_extension("db-journal"));
    }
}

pub async fn nova_turma(pool: &SqlitePool, codigo: &str) -> i64 {
    let payload = TurmaPayload {
        nome: format!("Turma {}", codigo),
        codigo: codigo.to_string(),
        descricao: None,
        ativa: None,
    };
    turma_service::criar_turma(pool, &payload)
        .await
        .expect("falha ao criar turma")
        .id
}

pub async fn novo_aluno(pool: &SqlitePool, turma_id: i64, matricula: &str, nome: &str) -> i64 {
    let payload = AlunoPayload {
        nome: nome.to_string(),
        matricula: matricula.to_string(),
        email: format!("{}@escola.pt", matricula.to_lowercase()),
        turma_id: Some(turma_id),
        ativo: None,
    };
    aluno_service::criar_aluno(pool, &payload)
        .await
        .expect("falha ao criar aluno")
        .id
}

pub async fn novo_mentor(pool: &SqlitePool, nome: &str, tipo: &str) -> i64 {
    let payload = MentorPayload {
        nome: nome.to_string(),
        email: format!("{}@mentoria.pt", nome.to_lowercase().replace(' ', ".")),
        tipo_mentor: tipo.to_string(),
        ativo: None,
    };
    mentor_service::criar(pool, &payload)
        .await
        .expect("falha ao criar mentor")
        .id
}
