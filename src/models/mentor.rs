// src/models/mentor.rs
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use validator::Validate;

/// Tipo de mentor. Guardado na DB como TEXT ("MENTOR", "MENTOR_TRAINEE", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoMentor {
    Mentor,
    MentorTrainee,
    MentorCoordenador,
}

impl TipoMentor {
    pub const TODOS: [TipoMentor; 3] = [
        TipoMentor::Mentor,
        TipoMentor::MentorTrainee,
        TipoMentor::MentorCoordenador,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TipoMentor::Mentor => "MENTOR",
            TipoMentor::MentorTrainee => "MENTOR_TRAINEE",
            TipoMentor::MentorCoordenador => "MENTOR_COORDENADOR",
        }
    }

    /// Descrição para exibição.
    pub fn label(&self) -> &'static str {
        match self {
            TipoMentor::Mentor => "Mentor",
            TipoMentor::MentorTrainee => "Mentor-trainee",
            TipoMentor::MentorCoordenador => "Mentor Coordenador",
        }
    }
}

impl fmt::Display for TipoMentor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipoMentorInvalido(pub String);

impl fmt::Display for TipoMentorInvalido {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tipo de mentor inválido: {}", self.0)
    }
}

// Aceita qualquer capitalização ("mentor_trainee" == "MENTOR_TRAINEE")
impl FromStr for TipoMentor {
    type Err = TipoMentorInvalido;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalizado = s.trim().to_uppercase();
        TipoMentor::TODOS
            .into_iter()
            .find(|t| t.as_str() == normalizado)
            .ok_or_else(|| TipoMentorInvalido(s.to_string()))
    }
}

/// Linha da tabela `mentores`.
#[derive(Debug, Clone, FromRow)]
pub struct Mentor {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub tipo_mentor: TipoMentor,
    pub ativo: bool,
    pub data_cadastro: NaiveDateTime,
}

/// Linha lida com o total de presenças em chamadas de mentores.
#[derive(Debug, Clone, FromRow)]
pub struct MentorComPresencas {
    #[sqlx(flatten)]
    pub mentor: Mentor,
    pub total_presencas: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorResumo {
    pub id: i64,
    pub nome: String,
    pub email: String,
    pub tipo_mentor: TipoMentor,
    pub tipo_mentor_descricao: &'static str,
    pub data_cadastro: NaiveDateTime,
    pub ativo: bool,
    pub total_presencas: i64,
}

impl From<MentorComPresencas> for MentorResumo {
    fn from(row: MentorComPresencas) -> Self {
        let m = row.mentor;
        Self {
            id: m.id,
            nome: m.nome,
            email: m.email,
            tipo_mentor: m.tipo_mentor,
            tipo_mentor_descricao: m.tipo_mentor.label(),
            data_cadastro: m.data_cadastro,
            ativo: m.ativo,
            total_presencas: row.total_presencas,
        }
    }
}

/// Corpo de POST/PUT /api/mentores. O tipo chega como texto e é validado no serviço.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MentorPayload {
    #[validate(length(min = 1, max = 150, message = "Nome do mentor é obrigatório (máx. 150 caracteres)"))]
    pub nome: String,
    #[validate(
        email(message = "Email deve ter um formato válido"),
        length(max = 100, message = "Email deve ter no máximo 100 caracteres")
    )]
    pub email: String,
    #[validate(length(min = 1, message = "Tipo de mentor é obrigatório"))]
    pub tipo_mentor: String,
    pub ativo: Option<bool>,
}

/// Totais de mentores ativos por tipo.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MentorEstatisticas {
    pub total_ativos: i64,
    pub total_mentores: i64,
    pub total_mentor_trainees: i64,
    pub total_mentor_coordenadores: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tipo_mentor_aceita_qualquer_capitalizacao() {
        assert_eq!("mentor_trainee".parse::<TipoMentor>(), Ok(TipoMentor::MentorTrainee));
        assert_eq!(" MENTOR ".parse::<TipoMentor>(), Ok(TipoMentor::Mentor));
        assert_eq!(
            "Mentor_Coordenador".parse::<TipoMentor>(),
            Ok(TipoMentor::MentorCoordenador)
        );
    }

    #[test]
    fn tipo_mentor_invalido_gera_mensagem() {
        let err = "coach".parse::<TipoMentor>().unwrap_err();
        assert_eq!(err.to_string(), "Tipo de mentor inválido: coach");
    }

    #[test]
    fn labels_de_exibicao() {
        assert_eq!(TipoMentor::Mentor.label(), "Mentor");
        assert_eq!(TipoMentor::MentorTrainee.label(), "Mentor-trainee");
        assert_eq!(TipoMentor::MentorCoordenador.label(), "Mentor Coordenador");
    }

    #[test]
    fn serializa_no_formato_da_db() {
        let json = serde_json::to_string(&TipoMentor::MentorCoordenador).unwrap();
        assert_eq!(json, "\"MENTOR_COORDENADOR\"");
    }
}
