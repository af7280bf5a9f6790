// src/models/chamada.rs
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Cabeçalho da chamada (tabela `chamadas`) já com os dados da turma e os contadores agregados.
#[derive(Debug, Clone, FromRow)]
pub struct ChamadaCabecalho {
    pub id: i64,
    pub turma_id: i64,
    pub turma_nome: String,
    pub turma_codigo: String,
    pub data_chamada: NaiveDate,
    pub observacoes: Option<String>,
    pub data_criacao: NaiveDateTime,
    pub total_presentes: i64,
    pub total_faltas: i64,
}

/// Registo de presença/falta de um aluno dentro da chamada, com os dados do aluno.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamadaAlunoItem {
    pub id: i64,
    pub chamada_id: i64,
    pub aluno_id: i64,
    pub aluno_nome: String,
    pub aluno_matricula: String,
    pub aluno_email: String,
    pub presente: bool,
    pub data_registro: NaiveDateTime,
}

/// Resultado devolvido pela API. `alunos` só vem preenchido no detalhe.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamadaDetalhe {
    pub id: i64,
    pub turma_id: i64,
    pub turma_nome: String,
    pub turma_codigo: String,
    pub data_chamada: NaiveDate,
    pub observacoes: Option<String>,
    pub data_criacao: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alunos: Option<Vec<ChamadaAlunoItem>>,
    pub total_alunos: i64,
    pub total_presentes: i64,
    pub total_faltas: i64,
}

impl ChamadaDetalhe {
    /// Resumo de listagem: contadores vindos do SQL, sem a lista de alunos.
    pub fn resumo(cab: ChamadaCabecalho) -> Self {
        Self {
            id: cab.id,
            turma_id: cab.turma_id,
            turma_nome: cab.turma_nome,
            turma_codigo: cab.turma_codigo,
            data_chamada: cab.data_chamada,
            observacoes: cab.observacoes,
            data_criacao: cab.data_criacao,
            alunos: None,
            total_alunos: cab.total_presentes + cab.total_faltas,
            total_presentes: cab.total_presentes,
            total_faltas: cab.total_faltas,
        }
    }

    /// Detalhe completo: os totais são recalculados a partir dos registos.
    pub fn completo(cab: ChamadaCabecalho, alunos: Vec<ChamadaAlunoItem>) -> Self {
        let total_alunos = alunos.len() as i64;
        let total_presentes = alunos.iter().filter(|a| a.presente).count() as i64;
        Self {
            alunos: Some(alunos),
            total_alunos,
            total_presentes,
            total_faltas: total_alunos - total_presentes,
            ..Self::resumo(cab)
        }
    }
}

/// Estado de um aluno no pedido de criação/atualização.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusAluno {
    pub aluno_id: i64,
    pub presente: Option<bool>,
}

/// Corpo de POST /api/chamadas
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CriarChamadaPayload {
    #[validate(required(message = "ID da turma é obrigatório"))]
    pub turma_id: Option<i64>,
    #[validate(required(message = "Data da chamada é obrigatória"))]
    pub data_chamada: Option<NaiveDate>,
    pub observacoes: Option<String>,
    #[serde(default)]
    pub alunos: Vec<StatusAluno>,
}

/// Corpo de PUT /api/chamadas/{id}. Turma e data não podem ser alteradas.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AtualizarChamadaPayload {
    pub observacoes: Option<String>,
    #[serde(default)]
    pub alunos: Vec<StatusAluno>,
}
