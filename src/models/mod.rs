// src/models/mod.rs
pub mod aluno;
pub mod chamada;
pub mod chamada_mentor;
pub mod mentor;
pub mod presenca;
pub mod turma;

use chrono::NaiveDate;
use serde::Deserialize;

/// Parâmetros `?dataInicio=...&dataFim=...` das consultas por período.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodoParams {
    pub data_inicio: NaiveDate,
    pub data_fim: NaiveDate,
}

/// Parâmetro `?nome=...` das pesquisas por nome.
#[derive(Debug, Deserialize)]
pub struct BuscaNomeParams {
    pub nome: String,
}
