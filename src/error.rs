// src/error.rs
use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na base de dados: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Erro de migração da base de dados: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro ao gerar CSV: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Erro ao gerar Excel: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    // Entidade referenciada não existe
    #[error("{0}")]
    NotFound(String),

    // Violação de unicidade (chamada duplicada, matrícula, email, código...)
    #[error("{0}")]
    Conflict(String),

    // Regra entre entidades violada (ex: aluno fora da turma) ou corpo inválido
    #[error("{0}")]
    Validation(String),

    #[error("Erro interno inesperado")]
    InternalServerError,
}

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    fn codigo(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NAO_ENCONTRADO",
            AppError::Conflict(_) => "CONFLITO",
            AppError::Validation(_) => "VALIDACAO",
            _ => "ERRO_INTERNO",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Mensagem mostrada ao cliente. Erros internos nunca expõem detalhes.
    fn mensagem(&self) -> String {
        match self {
            AppError::NotFound(msg) | AppError::Conflict(msg) | AppError::Validation(msg) => {
                msg.clone()
            }
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => {
                "Erro ao aceder aos dados.".to_string()
            }
            _ => "Ocorreu um erro inesperado.".to_string(),
        }
    }
}

// Query string ou segmento de caminho que não desserializa
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::validation(rejection.body_text())
    }
}

/// Verifica se o erro do sqlx é uma violação de UNIQUE.
/// Usado pelos serviços para converter corridas de inserção em `Conflict`.
pub fn violacao_unicidade(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[derive(Debug, Serialize)]
struct ErroResposta {
    erro: ErroCorpo,
}

#[derive(Debug, Serialize)]
struct ErroCorpo {
    codigo: &'static str,
    mensagem: String,
}

// Como converter AppError numa resposta HTTP
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Erro processado: {:?}", self);
        } else {
            tracing::warn!("Pedido rejeitado ({}): {}", status.as_u16(), self);
        }

        let corpo = ErroResposta {
            erro: ErroCorpo {
                codigo: self.codigo(),
                mensagem: self.mensagem(),
            },
        };
        (status, Json(corpo)).into_response()
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;
