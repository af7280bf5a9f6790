// src/services/mentor_service.rs
use crate::{
    error::{violacao_unicidade, AppError, AppResult},
    models::mentor::{
        Mentor, MentorComPresencas, MentorEstatisticas, MentorPayload, MentorResumo, TipoMentor,
    },
};
use chrono::Local;
use sqlx::{SqliteExecutor, SqlitePool};

const SELECT_MENTOR: &str = r#"
    SELECT
        m.id, m.nome, m.email, m.tipo_mentor, m.ativo, m.data_cadastro,
        (SELECT COUNT(*) FROM chamada_mentor_participantes cp
          WHERE cp.mentor_id = m.id AND cp.presente = 1) AS total_presencas
    FROM mentores m
"#;

pub async fn find_mentor<'e>(db: impl SqliteExecutor<'e>, mentor_id: i64) -> AppResult<Option<Mentor>> {
    let mentor = sqlx::query_as::<_, Mentor>(
        "SELECT id, nome, email, tipo_mentor, ativo, data_cadastro FROM mentores WHERE id = ?",
    )
    .bind(mentor_id)
    .fetch_optional(db)
    .await?;
    Ok(mentor)
}

async fn consultar(
    db_pool: &SqlitePool,
    filtro: &str,
    bind: Option<&str>,
) -> AppResult<Vec<MentorResumo>> {
    let sql = format!("{SELECT_MENTOR} {filtro} ORDER BY m.nome ASC");
    let mut query = sqlx::query_as::<_, MentorComPresencas>(&sql);
    if let Some(valor) = bind {
        query = query.bind(valor);
    }
    let linhas = query.fetch_all(db_pool).await?;
    Ok(linhas.into_iter().map(MentorResumo::from).collect())
}

fn parse_tipo(tipo: &str) -> AppResult<TipoMentor> {
    tipo.parse::<TipoMentor>()
        .map_err(|e| AppError::validation(e.to_string()))
}

/// Todos os mentores, ordenados por nome
pub async fn listar_todos(db_pool: &SqlitePool) -> AppResult<Vec<MentorResumo>> {
    tracing::debug!("Buscando todos os mentores...");
    consultar(db_pool, "", None).await
}

pub async fn listar_ativos(db_pool: &SqlitePool) -> AppResult<Vec<MentorResumo>> {
    tracing::debug!("Buscando mentores ativos...");
    consultar(db_pool, "WHERE m.ativo = 1", None).await
}

/// Mentores ativos de um tipo. O tipo vem da URL e pode ter qualquer capitalização.
pub async fn listar_por_tipo(db_pool: &SqlitePool, tipo: &str) -> AppResult<Vec<MentorResumo>> {
    let tipo = parse_tipo(tipo)?;
    consultar(
        db_pool,
        "WHERE m.tipo_mentor = ? AND m.ativo = 1",
        Some(tipo.as_str()),
    )
    .await
}

pub async fn buscar_por_id(db_pool: &SqlitePool, id: i64) -> AppResult<MentorResumo> {
    let sql = format!("{SELECT_MENTOR} WHERE m.id = ?");
    sqlx::query_as::<_, MentorComPresencas>(&sql)
        .bind(id)
        .fetch_optional(db_pool)
        .await?
        .map(MentorResumo::from)
        .ok_or_else(|| AppError::not_found("Mentor não encontrado"))
}

pub async fn buscar_por_email(db_pool: &SqlitePool, email: &str) -> AppResult<MentorResumo> {
    consultar(db_pool, "WHERE m.email = ?", Some(email))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found("Mentor não encontrado"))
}

/// Pesquisa apenas entre os ativos
pub async fn buscar_por_nome(db_pool: &SqlitePool, nome: &str) -> AppResult<Vec<MentorResumo>> {
    consultar(
        db_pool,
        "WHERE LOWER(m.nome) LIKE '%' || LOWER(?) || '%' AND m.ativo = 1",
        Some(nome.trim()),
    )
    .await
}

async fn email_em_uso(db_pool: &SqlitePool, email: &str) -> AppResult<bool> {
    let em_uso: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM mentores WHERE email = ?)")
        .bind(email)
        .fetch_one(db_pool)
        .await?;
    Ok(em_uso)
}

fn conflito_email(email: &str) -> AppError {
    AppError::conflict(format!("Já existe um mentor com o email: {}", email))
}

pub async fn criar(db_pool: &SqlitePool, payload: &MentorPayload) -> AppResult<MentorResumo> {
    tracing::info!("Criando mentor '{}'", payload.email);

    if email_em_uso(db_pool, &payload.email).await? {
        return Err(conflito_email(&payload.email));
    }
    let tipo = parse_tipo(&payload.tipo_mentor)?;

    let id = sqlx::query(
        r#"
        INSERT INTO mentores (nome, email, tipo_mentor, ativo, data_cadastro)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&payload.nome)
    .bind(&payload.email)
    .bind(tipo)
    .bind(payload.ativo.unwrap_or(true))
    .bind(Local::now().naive_local())
    .execute(db_pool)
    .await
    .map_err(|e| {
        if violacao_unicidade(&e) {
            conflito_email(&payload.email)
        } else {
            e.into()
        }
    })?
    .last_insert_rowid();

    tracing::info!("✅ Mentor '{}' criado (id {}).", payload.email, id);
    buscar_por_id(db_pool, id).await
}

pub async fn atualizar(db_pool: &SqlitePool, id: i64, payload: &MentorPayload) -> AppResult<MentorResumo> {
    tracing::info!("Atualizando mentor {}", id);

    let atual = find_mentor(db_pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Mentor não encontrado"))?;

    // Só há conflito se o email mudou para um que já pertence a outro mentor
    if atual.email != payload.email && email_em_uso(db_pool, &payload.email).await? {
        return Err(conflito_email(&payload.email));
    }
    let tipo = parse_tipo(&payload.tipo_mentor)?;

    sqlx::query(
        r#"
        UPDATE mentores SET nome = ?1, email = ?2, tipo_mentor = ?3, ativo = ?4
        WHERE id = ?5
        "#,
    )
    .bind(&payload.nome)
    .bind(&payload.email)
    .bind(tipo)
    .bind(payload.ativo.unwrap_or(atual.ativo))
    .bind(id)
    .execute(db_pool)
    .await?;

    buscar_por_id(db_pool, id).await
}

async fn definir_ativo(db_pool: &SqlitePool, id: i64, ativo: bool) -> AppResult<()> {
    let rows_affected = sqlx::query("UPDATE mentores SET ativo = ? WHERE id = ?")
        .bind(ativo)
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Mentor '{}' não encontrado.", id);
        return Err(AppError::not_found("Mentor não encontrado"));
    }
    Ok(())
}

/// Remoção lógica
pub async fn remover(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    definir_ativo(db_pool, id, false).await?;
    tracing::info!("Mentor {} desativado.", id);
    Ok(())
}

pub async fn reativar(db_pool: &SqlitePool, id: i64) -> AppResult<MentorResumo> {
    definir_ativo(db_pool, id, true).await?;
    tracing::info!("Mentor {} reativado.", id);
    buscar_por_id(db_pool, id).await
}

/// Totais de mentores ativos, por tipo.
pub async fn obter_estatisticas(db_pool: &SqlitePool) -> AppResult<MentorEstatisticas> {
    let por_tipo: Vec<(TipoMentor, i64)> = sqlx::query_as(
        "SELECT tipo_mentor, COUNT(*) FROM mentores WHERE ativo = 1 GROUP BY tipo_mentor",
    )
    .fetch_all(db_pool)
    .await?;

    let mut stats = MentorEstatisticas::default();
    for (tipo, total) in por_tipo {
        stats.total_ativos += total;
        match tipo {
            TipoMentor::Mentor => stats.total_mentores = total,
            TipoMentor::MentorTrainee => stats.total_mentor_trainees = total,
            TipoMentor::MentorCoordenador => stats.total_mentor_coordenadores = total,
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{novo_mentor, pool_de_teste};

    fn payload(email: &str, tipo: &str) -> MentorPayload {
        MentorPayload {
            nome: "Rita Alves".to_string(),
            email: email.to_string(),
            tipo_mentor: tipo.to_string(),
            ativo: None,
        }
    }

    #[tokio::test]
    async fn criar_aceita_tipo_em_minusculas() {
        let pool = pool_de_teste().await;
        let m = criar(&pool, &payload("rita@x.pt", "mentor_trainee")).await.unwrap();
        assert_eq!(m.tipo_mentor, TipoMentor::MentorTrainee);
        assert_eq!(m.tipo_mentor_descricao, "Mentor-trainee");
        assert!(m.ativo);
    }

    #[tokio::test]
    async fn tipo_invalido_e_erro_de_validacao() {
        let pool = pool_de_teste().await;
        let err = criar(&pool, &payload("rita@x.pt", "chefe")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Tipo de mentor inválido: chefe"));

        let err = listar_por_tipo(&pool, "chefe").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn email_duplicado_da_conflito() {
        let pool = pool_de_teste().await;
        criar(&pool, &payload("rita@x.pt", "MENTOR")).await.unwrap();
        let err = criar(&pool, &payload("rita@x.pt", "MENTOR")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn atualizar_para_email_de_outro_da_conflito() {
        let pool = pool_de_teste().await;
        let a = criar(&pool, &payload("a@x.pt", "MENTOR")).await.unwrap();
        criar(&pool, &payload("b@x.pt", "MENTOR")).await.unwrap();

        let mesmo = atualizar(&pool, a.id, &payload("a@x.pt", "MENTOR_COORDENADOR"))
            .await
            .unwrap();
        assert_eq!(mesmo.tipo_mentor, TipoMentor::MentorCoordenador);

        let err = atualizar(&pool, a.id, &payload("b@x.pt", "MENTOR")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn remover_e_reativar() {
        let pool = pool_de_teste().await;
        let id = novo_mentor(&pool, "Joana", "MENTOR").await;

        remover(&pool, id).await.unwrap();
        assert!(listar_ativos(&pool).await.unwrap().is_empty());
        assert_eq!(listar_todos(&pool).await.unwrap().len(), 1);

        let m = reativar(&pool, id).await.unwrap();
        assert!(m.ativo);
        assert!(matches!(reativar(&pool, 77).await.unwrap_err(), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn estatisticas_contam_ativos_por_tipo() {
        let pool = pool_de_teste().await;
        novo_mentor(&pool, "Ana", "MENTOR").await;
        novo_mentor(&pool, "Bea", "MENTOR").await;
        novo_mentor(&pool, "Caio", "MENTOR_TRAINEE").await;
        let inativo = novo_mentor(&pool, "Duda", "MENTOR_COORDENADOR").await;
        remover(&pool, inativo).await.unwrap();

        let stats = obter_estatisticas(&pool).await.unwrap();
        assert_eq!(
            stats,
            MentorEstatisticas {
                total_ativos: 3,
                total_mentores: 2,
                total_mentor_trainees: 1,
                total_mentor_coordenadores: 0,
            }
        );
    }

    #[tokio::test]
    async fn listar_por_tipo_e_busca_por_nome() {
        let pool = pool_de_teste().await;
        novo_mentor(&pool, "Ana Reis", "MENTOR").await;
        novo_mentor(&pool, "Caio Reis", "MENTOR_TRAINEE").await;

        assert_eq!(listar_por_tipo(&pool, "mentor").await.unwrap().len(), 1);
        assert_eq!(buscar_por_nome(&pool, "reis").await.unwrap().len(), 2);
        assert!(buscar_por_email(&pool, "ana.reis@mentoria.pt").await.is_ok());
    }
}
