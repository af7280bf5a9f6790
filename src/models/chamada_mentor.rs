// src/models/chamada_mentor.rs
use super::mentor::TipoMentor;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Chamada global de mentores (tabela `chamadas_mentores`, uma por dia) com os contadores.
#[derive(Debug, Clone, FromRow)]
pub struct ChamadaMentorCabecalho {
    pub id: i64,
    pub data_chamada: NaiveDate,
    pub observacoes: Option<String>,
    pub data_criacao: NaiveDateTime,
    pub total_presentes: i64,
    pub total_ausentes: i64,
}

/// Participante da chamada com os dados do mentor.
#[derive(Debug, Clone, FromRow)]
pub struct ParticipanteLinha {
    pub id: i64,
    pub chamada_mentor_id: i64,
    pub mentor_id: i64,
    pub mentor_nome: String,
    pub mentor_email: String,
    pub mentor_tipo: TipoMentor,
    pub presente: bool,
    pub data_registro: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipanteItem {
    pub id: i64,
    pub chamada_mentor_id: i64,
    pub mentor_id: i64,
    pub mentor_nome: String,
    pub mentor_email: String,
    pub mentor_tipo: TipoMentor,
    pub mentor_tipo_descricao: &'static str,
    pub presente: bool,
    pub data_registro: NaiveDateTime,
}

impl From<ParticipanteLinha> for ParticipanteItem {
    fn from(l: ParticipanteLinha) -> Self {
        Self {
            id: l.id,
            chamada_mentor_id: l.chamada_mentor_id,
            mentor_id: l.mentor_id,
            mentor_nome: l.mentor_nome,
            mentor_email: l.mentor_email,
            mentor_tipo_descricao: l.mentor_tipo.label(),
            mentor_tipo: l.mentor_tipo,
            presente: l.presente,
            data_registro: l.data_registro,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChamadaMentorDetalhe {
    pub id: i64,
    pub data_chamada: NaiveDate,
    pub observacoes: Option<String>,
    pub data_criacao: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participantes: Option<Vec<ParticipanteItem>>,
    pub total_mentores: i64,
    pub total_presentes: i64,
    pub total_ausentes: i64,
}

impl ChamadaMentorDetalhe {
    pub fn resumo(cab: ChamadaMentorCabecalho) -> Self {
        Self {
            id: cab.id,
            data_chamada: cab.data_chamada,
            observacoes: cab.observacoes,
            data_criacao: cab.data_criacao,
            participantes: None,
            total_mentores: cab.total_presentes + cab.total_ausentes,
            total_presentes: cab.total_presentes,
            total_ausentes: cab.total_ausentes,
        }
    }

    pub fn completo(cab: ChamadaMentorCabecalho, participantes: Vec<ParticipanteItem>) -> Self {
        let total_mentores = participantes.len() as i64;
        let total_presentes = participantes.iter().filter(|p| p.presente).count() as i64;
        Self {
            participantes: Some(participantes),
            total_mentores,
            total_presentes,
            total_ausentes: total_mentores - total_presentes,
            ..Self::resumo(cab)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantePayload {
    pub mentor_id: i64,
    pub presente: Option<bool>,
}

/// Corpo de POST e PUT /api/chamadas-mentores
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChamadaMentorPayload {
    #[validate(required(message = "Data da chamada é obrigatória"))]
    pub data_chamada: Option<NaiveDate>,
    pub observacoes: Option<String>,
    #[serde(default)]
    pub participantes: Vec<ParticipantePayload>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChamadaMentorEstatisticas {
    pub total_chamadas: i64,
    pub total_chamadas_mes_atual: i64,
    pub total_presentes_hoje: i64,
    pub total_ausentes_hoje: i64,
}
