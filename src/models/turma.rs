// src/models/turma.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Colunas de `turmas` usadas nas verificações de escrita.
#[derive(Debug, Clone, FromRow)]
pub struct Turma {
    pub id: i64,
    pub nome: String,
    pub ativa: bool,
}

/// Turma com as estatísticas calculadas no momento da leitura.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurmaResumo {
    pub id: i64,
    pub nome: String,
    pub codigo: String,
    pub descricao: Option<String>,
    pub ativa: bool,
    pub data_criacao: NaiveDateTime,
    pub total_alunos: i64,   // apenas alunos ativos
    pub total_presencas: i64,
}

/// Corpo de POST/PUT /turmas
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TurmaPayload {
    #[validate(length(min = 1, max = 100, message = "Nome da turma é obrigatório (máx. 100 caracteres)"))]
    pub nome: String,
    #[validate(length(min = 1, max = 20, message = "Código da turma é obrigatório (máx. 20 caracteres)"))]
    pub codigo: String,
    pub descricao: Option<String>,
    pub ativa: Option<bool>,
}
