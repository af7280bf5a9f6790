// src/models/aluno.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Colunas de `alunos` usadas nas verificações de escrita (turma, estado).
#[derive(Debug, Clone, FromRow)]
pub struct Aluno {
    pub id: i64,
    pub nome: String,
    pub turma_id: i64,
    pub ativo: bool,
}

/// Aluno com os dados da turma e o total de presenças avulsas.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlunoResumo {
    pub id: i64,
    pub nome: String,
    pub matricula: String,
    pub email: String,
    pub turma_id: i64,
    pub turma_nome: String,
    pub turma_codigo: String,
    pub ativo: bool,
    pub data_cadastro: NaiveDateTime,
    pub total_presencas: i64,
}

/// Corpo de POST/PUT /alunos
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AlunoPayload {
    #[validate(length(min = 1, max = 150, message = "Nome do aluno é obrigatório (máx. 150 caracteres)"))]
    pub nome: String,
    #[validate(length(min = 1, max = 20, message = "Matrícula é obrigatória (máx. 20 caracteres)"))]
    pub matricula: String,
    #[validate(
        email(message = "Email deve ter um formato válido"),
        length(max = 100, message = "Email deve ter no máximo 100 caracteres")
    )]
    pub email: String,
    #[validate(required(message = "ID da turma é obrigatório"))]
    pub turma_id: Option<i64>,
    pub ativo: Option<bool>,
}
