// src/models/presenca.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Presença avulsa já com os nomes de aluno e turma (é a projeção usada
/// pela API e pelo relatório CSV).
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresencaDetalhe {
    pub id: i64,
    pub aluno_id: i64,
    pub turma_id: i64,
    pub aluno_nome: String,
    pub aluno_matricula: String,
    pub turma_nome: String,
    pub turma_codigo: String,
    pub data_presenca: NaiveDate,
    pub hora_presenca: NaiveTime,
    pub data_hora_registro: NaiveDateTime,
    pub observacoes: Option<String>,
}

/// Corpo de POST/PUT /presencas. Data e hora são opcionais no registo
/// (assumem hoje/agora).
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PresencaPayload {
    #[validate(required(message = "ID do aluno é obrigatório"))]
    pub aluno_id: Option<i64>,
    #[validate(required(message = "ID da turma é obrigatório"))]
    pub turma_id: Option<i64>,
    pub data_presenca: Option<NaiveDate>,
    pub hora_presenca: Option<NaiveTime>,
    pub observacoes: Option<String>,
}

/// Corpo de POST /presencas/rapida
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PresencaRapidaPayload {
    #[validate(required(message = "ID do aluno é obrigatório"))]
    pub aluno_id: Option<i64>,
    #[validate(required(message = "ID da turma é obrigatório"))]
    pub turma_id: Option<i64>,
}

/// Filtros opcionais do relatório (`?turmaId=&dataInicio=&dataFim=`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatorioParams {
    pub turma_id: Option<i64>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}
